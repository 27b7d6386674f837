//! Configuration and dependency initialization for the subjects admin binary.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{AdminConfig, Backend};
