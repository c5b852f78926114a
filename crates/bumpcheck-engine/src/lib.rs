#![forbid(unsafe_code)]
//! Experiment orchestration and reporting for bumpcheck.

pub mod client;
pub mod error;
pub mod experiment;
pub mod report;

pub use client::{ClientRef, ResolvedClient};
pub use error::EngineError;
pub use experiment::{run_experiment, ExperimentOptions, ExperimentResult};
