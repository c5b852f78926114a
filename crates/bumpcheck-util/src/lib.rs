#![forbid(unsafe_code)]
//! Filesystem, hashing, download, archive, and process helpers for bumpcheck.

pub mod archive;
pub mod artifact;
pub mod download;
pub mod error;
pub mod fs;
pub mod hash;
pub mod maven;
pub mod process;
