use std::fmt;

/// A declared device that could not be resolved to a host node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFailure {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for DeviceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.reason)
    }
}

/// Errors surfaced by a launch
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("configuration error: {0:#}")]
    Configuration(anyhow::Error),

    #[error("{} required device(s) not found", failures.len())]
    DeviceResolution { failures: Vec<DeviceFailure> },

    #[error("{operation} failed: {message}")]
    RuntimeInvocation { operation: String, message: String },

    #[error("{operation} interrupted by user")]
    Interrupted { operation: String },
}

impl LaunchError {
    pub fn configuration(message: impl fmt::Display) -> Self {
        LaunchError::Configuration(anyhow::anyhow!("{}", message))
    }

    pub fn runtime(operation: impl Into<String>, message: impl Into<String>) -> Self {
        LaunchError::RuntimeInvocation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Process exit status for this error
    ///
    /// Interrupts exit with 130 so wrappers can tell them apart from failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Interrupted { .. } => 130,
            _ => 1,
        }
    }
}

/// Errors from running an external process
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },

    #[error("{program} interrupted")]
    Interrupted { program: String },
}

impl ExecError {
    /// Convert into a launch error attributed to `operation`
    pub fn into_launch(self, operation: &str) -> LaunchError {
        match self {
            ExecError::Interrupted { .. } => LaunchError::Interrupted {
                operation: operation.to_string(),
            },
            other => LaunchError::runtime(operation, other.to_string()),
        }
    }
}
