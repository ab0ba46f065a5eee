pub mod start;

// Re-export command functions
pub use start::{cmd_start, Launcher};
