//! One launch: resolve devices, assemble the run command, start and attach.

use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::LaunchConfig;
use crate::devices::{DeviceMapper, DeviceMappings, Inventory, UdevResolver, UsbMatcher};
use crate::error::LaunchError;
use crate::exec::SystemRunner;
use crate::host::{HostEnvironment, SystemHost};
use crate::launch;
use crate::runtime::ContainerRuntime;
use crate::types::Mode;

/// Entry point for the binary
pub async fn cmd_start(cli: &Cli) -> Result<Vec<String>, LaunchError> {
    let config = LaunchConfig::load(&cli.config)?;

    let runner = SystemRunner::new();
    let resolver = UdevResolver::new(&runner);
    let matcher = UsbMatcher::new(Inventory::scan(), &resolver);
    let runtime = ContainerRuntime::new(&runner, cli.runtime.clone());

    Launcher::new(&config, runtime, &matcher, &SystemHost)
        .start(cli.mode(), cli.force)
        .await
}

/// Orchestrates a run against injected host collaborators
pub struct Launcher<'a> {
    config: &'a LaunchConfig,
    runtime: ContainerRuntime<'a>,
    mapper: DeviceMapper<'a>,
    host: &'a dyn HostEnvironment,
}

impl<'a> Launcher<'a> {
    pub fn new(
        config: &'a LaunchConfig,
        runtime: ContainerRuntime<'a>,
        matcher: &'a UsbMatcher<'a>,
        host: &'a dyn HostEnvironment,
    ) -> Self {
        Self {
            config,
            runtime,
            mapper: DeviceMapper::new(matcher),
            host,
        }
    }

    /// Build the `run` command for already-resolved devices
    pub fn assemble(&self, mappings: &DeviceMappings) -> Vec<String> {
        let home = self.host.home();
        launch::assemble(
            self.runtime.binary(),
            &self.config.container,
            &self.config.resources,
            &launch::device_args(mappings),
            &launch::volume_args(&self.config.volumes, home.as_deref()),
            &launch::environment_args(&self.config.environment, self.host),
        )
    }

    /// Run the launch sequence, returning the assembled `run` command
    ///
    /// A dry run only resolves devices and prints the command. A normal run
    /// resolves devices before touching any container, so a missing device
    /// leaves the host exactly as it was.
    pub async fn start(&self, mode: Mode, force: bool) -> Result<Vec<String>, LaunchError> {
        let container = &self.config.container;

        if mode.is_dry_run() {
            let mappings = self.mapper.map_all(&self.config.devices, mode).await?;
            let command = self.assemble(&mappings);
            println!();
            println!("{}", command.join(" "));
            return Ok(command);
        }

        let version = self.runtime.check_available().await?;
        info!(runtime = %self.runtime.binary(), version = %version, "container tool found");

        let mappings = self.mapper.map_all(&self.config.devices, mode).await?;

        let image = container.image_ref();
        if force || !self.runtime.image_exists(&image).await {
            self.runtime.pull(&image).await?;
        }

        self.runtime.stop_and_remove(&container.name).await?;
        self.runtime.grant_x11_access().await;

        let command = self.assemble(&mappings);
        debug!(command = %command.join(" "), restart = %container.restart, "starting container");
        self.runtime.launch(&command).await?;
        info!(container = %container.name, image = %image, "container started");

        self.runtime.attach(container).await?;
        Ok(command)
    }
}
