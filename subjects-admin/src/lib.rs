//! # Subjects Admin
//!
//! Administrative CLI for the subject knowledge graph. Wires one backend from
//! environment variables and runs a single command against it.
//!
//! ## Modules
//!
//! - [`config`]: Environment settings and dependency initialization
//! - [`commands`]: Command parsing and execution
//! - [`errors`]: Error types for the binary

pub mod commands;
pub mod config;
pub mod errors;

pub use commands::{Command, execute};
pub use config::{AdminConfig, Backend, Dependencies};
pub use errors::AdminError;
