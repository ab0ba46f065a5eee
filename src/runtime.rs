//! Container lifecycle operations on top of the container tool CLI.

use tracing::{debug, info, warn};

use crate::config::ContainerIdentity;
use crate::error::LaunchError;
use crate::exec::{CommandOutput, CommandRunner};
use crate::types::ExecMode;

pub const DEFAULT_RUNTIME: &str = "docker";

/// Observed state of a named container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Running,
    Stopped,
    NotExists,
}

/// Drives a docker-compatible container tool
pub struct ContainerRuntime<'a> {
    runner: &'a dyn CommandRunner,
    binary: String,
}

impl<'a> ContainerRuntime<'a> {
    pub fn new(runner: &'a dyn CommandRunner, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn argv(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.binary.clone())
            .chain(args.iter().map(|s| s.to_string()))
            .collect()
    }

    /// Run with captured output; non-zero exit is an error
    async fn capture_ok(&self, operation: &str, args: &[&str]) -> Result<CommandOutput, LaunchError> {
        let output = self
            .runner
            .capture(&self.argv(args))
            .await
            .map_err(|e| e.into_launch(operation))?;
        if !output.success {
            return Err(LaunchError::runtime(operation, output.failure_message()));
        }
        Ok(output)
    }

    /// Run attached to the terminal; non-zero exit is an error
    async fn interactive_ok(&self, operation: &str, argv: &[String]) -> Result<(), LaunchError> {
        let output = self
            .runner
            .interactive(argv)
            .await
            .map_err(|e| e.into_launch(operation))?;
        if !output.success {
            return Err(LaunchError::runtime(operation, output.failure_message()));
        }
        Ok(())
    }

    /// Verify the container tool is installed, returning its version line
    pub async fn check_available(&self) -> Result<String, LaunchError> {
        let output = self
            .runner
            .capture(&self.argv(&["--version"]))
            .await
            .ok()
            .filter(|o| o.success)
            .ok_or_else(|| {
                LaunchError::runtime(
                    "version check",
                    format!("{} is not installed or not on PATH", self.binary),
                )
            })?;
        let version = output.stdout.lines().next().unwrap_or("installed").trim().to_string();
        debug!(runtime = %self.binary, version = %version, "container tool available");
        Ok(version)
    }

    pub async fn status(&self, name: &str) -> Result<ContainerStatus, LaunchError> {
        let all = self
            .capture_ok("list containers", &["ps", "-a", "--format", "{{.Names}}"])
            .await?;
        if !all.stdout.lines().any(|line| line.trim() == name) {
            return Ok(ContainerStatus::NotExists);
        }

        let running = self
            .capture_ok("list containers", &["ps", "--format", "{{.Names}}"])
            .await?;
        if running.stdout.lines().any(|line| line.trim() == name) {
            Ok(ContainerStatus::Running)
        } else {
            Ok(ContainerStatus::Stopped)
        }
    }

    /// Stop (if running) and remove an existing container
    pub async fn stop_and_remove(&self, name: &str) -> Result<(), LaunchError> {
        match self.status(name).await? {
            ContainerStatus::NotExists => {
                info!(container = %name, "container does not exist, nothing to remove");
                return Ok(());
            }
            ContainerStatus::Running => {
                info!(container = %name, "stopping container");
                self.capture_ok("stop container", &["stop", name]).await?;
            }
            ContainerStatus::Stopped => {}
        }

        info!(container = %name, "removing container");
        self.capture_ok("remove container", &["rm", "-f", name]).await?;
        Ok(())
    }

    /// Whether the image is present locally; lookup failures count as absent
    pub async fn image_exists(&self, image: &str) -> bool {
        match self
            .capture_ok(
                "list images",
                &["images", "--format", "{{.Repository}}:{{.Tag}}", image],
            )
            .await
        {
            Ok(output) => output.stdout.lines().any(|line| line.trim() == image),
            Err(e) => {
                warn!(image = %image, error = %e, "image lookup failed");
                false
            }
        }
    }

    pub async fn pull(&self, image: &str) -> Result<(), LaunchError> {
        info!(image = %image, "pulling image");
        self.interactive_ok("pull image", &self.argv(&["pull", image]))
            .await?;
        info!(image = %image, "image pulled");
        Ok(())
    }

    /// Execute an assembled `run` command
    pub async fn launch(&self, argv: &[String]) -> Result<(), LaunchError> {
        self.interactive_ok("start container", argv).await
    }

    /// Attach to the container with its configured command
    pub async fn attach(&self, identity: &ContainerIdentity) -> Result<(), LaunchError> {
        let argv = match identity.exec_mode {
            ExecMode::Command => {
                info!(container = %identity.name, command = %identity.command, "running command in container");
                self.argv(&[
                    "exec",
                    "-it",
                    identity.name.as_str(),
                    "bash",
                    "-c",
                    identity.command.as_str(),
                ])
            }
            ExecMode::Interactive => {
                info!(container = %identity.name, "entering container");
                self.argv(&["exec", "-it", identity.name.as_str(), identity.command.as_str()])
            }
        };
        self.interactive_ok("attach to container", &argv).await
    }

    /// Allow local clients to reach the X server; failure only warns
    pub async fn grant_x11_access(&self) {
        let argv = vec!["xhost".to_string(), "+local:".to_string()];
        match self.runner.capture(&argv).await {
            Ok(output) if output.success => info!("granted X11 access to local clients"),
            Ok(output) => warn!(error = %output.failure_message(), "xhost failed"),
            Err(e) => warn!(error = %e, "xhost unavailable"),
        }
    }
}
