//! Process execution for device lookups, container lifecycle and launch.

use std::future::Future;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::ExecError;

/// Result of running an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    /// Empty for interactive runs
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn from_status(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    /// Best message to show for a failed run
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs argument lists and reports exit status and output
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with stdout and stderr captured
    async fn capture(&self, argv: &[String]) -> Result<CommandOutput, ExecError>;

    /// Run attached to the terminal, returning `Interrupted` on Ctrl-C
    async fn interactive(&self, argv: &[String]) -> Result<CommandOutput, ExecError>;
}

/// Runs commands on the host with tokio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

fn split_argv(argv: &[String]) -> Result<(&String, &[String]), ExecError> {
    argv.split_first().ok_or(ExecError::EmptyCommand)
}

#[async_trait::async_trait]
impl CommandRunner for SystemRunner {
    async fn capture(&self, argv: &[String]) -> Result<CommandOutput, ExecError> {
        let (program, args) = split_argv(argv)?;
        debug!(command = %argv.join(" "), "running");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        Ok(CommandOutput::from_status(
            output.status,
            &output.stdout,
            &output.stderr,
        ))
    }

    async fn interactive(&self, argv: &[String]) -> Result<CommandOutput, ExecError> {
        let (program, args) = split_argv(argv)?;
        debug!(command = %argv.join(" "), "running interactively");

        let mut child = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        let exited = until_interrupted(child.wait(), tokio::signal::ctrl_c()).await;
        match exited {
            Some(status) => {
                let status = status.map_err(|source| ExecError::Spawn {
                    program: program.clone(),
                    source,
                })?;
                Ok(CommandOutput::from_status(status, &[], &[]))
            }
            None => {
                info!(program = %program, "received SIGINT, stopping child");
                let _ = child.kill().await;
                Err(ExecError::Interrupted { program: program.clone() })
            }
        }
    }
}

/// Drive `work` to completion unless `interrupt` fires first
///
/// The terminal delivers SIGINT to the child as well, so both can be ready in
/// the same poll; the interrupt is checked first and wins.
async fn until_interrupted<T, I>(work: impl Future<Output = T>, interrupt: I) -> Option<T>
where
    I: Future,
{
    tokio::select! {
        biased;
        _ = interrupt => None,
        out = work => Some(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_capture_stdout() {
        let out = SystemRunner::new()
            .capture(&argv(&["sh", "-c", "echo ID_VENDOR_ID=10c4"]))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout.trim(), "ID_VENDOR_ID=10c4");
    }

    #[tokio::test]
    async fn test_capture_failure_status() {
        let out = SystemRunner::new()
            .capture(&argv(&["sh", "-c", "echo boom >&2; exit 3"]))
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.failure_message(), "boom");
    }

    #[tokio::test]
    async fn test_spawn_error_and_empty_command() {
        let err = SystemRunner::new()
            .capture(&argv(&["/nonexistent/devlaunch-tool"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));

        let err = SystemRunner::new().capture(&[]).await.unwrap_err();
        assert!(matches!(err, ExecError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_interrupt_wins_when_both_ready() {
        assert_eq!(until_interrupted(async { 0 }, async {}).await, None);
        assert_eq!(
            until_interrupted(async { 0 }, std::future::pending::<()>()).await,
            Some(0)
        );
    }

    #[test]
    fn test_failure_message_without_stderr() {
        let out = CommandOutput {
            success: false,
            code: Some(125),
            ..CommandOutput::default()
        };
        assert_eq!(out.failure_message(), "exited with status 125");
    }
}
