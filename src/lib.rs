pub mod cli;
pub mod commands;
pub mod config;
pub mod devices;
pub mod error;
pub mod exec;
pub mod host;
pub mod launch;
pub mod runtime;
pub mod types;

// Re-export core types for convenience
pub use error::{DeviceFailure, LaunchError};
pub use types::{ExecMode, Mode};
