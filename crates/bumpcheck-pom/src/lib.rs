#![forbid(unsafe_code)]
//! Maven build descriptor (POM) model: read, locate, mutate, and write back.

pub mod error;
pub mod locate;
pub mod model;
pub mod mutate;
pub mod plugin;
pub mod xml;

pub use error::PomError;
pub use locate::promote_descriptor;
pub use model::{Dependency, DependencyUpdate, Plugin, PluginExecution, Pom, DESCRIPTOR_FILE};
pub use mutate::{upgrade_descriptor, MissingDependencyPolicy, MutationReport, Upgrade};
