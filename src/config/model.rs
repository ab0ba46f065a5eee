//! Typed configuration model
//!
//! Built once from the YAML document by [`super::loader`] and read-only for
//! the rest of the run. Nothing downstream looks at raw keys.

use std::path::PathBuf;

use crate::host::HostEnvironment;
use crate::types::ExecMode;

/// Network mode that means "no explicit --network flag"
pub const DEFAULT_NETWORK: &str = "bridge";

/// Default GPU option string, split on whitespace when assembled
pub const DEFAULT_GPU_OPTIONS: &str = "--gpus all";

/// Host directory mounted into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    /// Host path, may start with `~`
    pub source: String,
    pub target: String,
    pub enabled: bool,
    /// Mount mode, e.g. `rw` or `ro`
    pub options: String,
}

impl VolumeSpec {
    /// Source path with a leading `~` replaced by `home`
    ///
    /// When `home` is unknown the source is returned untouched.
    pub fn expanded_source(&self, home: Option<&str>) -> String {
        shellexpand::tilde_with_context(&self.source, || home).into_owned()
    }

    /// Value of the `-v` flag: `SOURCE:TARGET:OPTIONS`
    pub fn mount_arg(&self, home: Option<&str>) -> String {
        format!(
            "{}:{}:{}",
            self.expanded_source(home),
            self.target,
            self.options
        )
    }
}

/// Hardware identity of a USB device, independent of its node path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbIdentity {
    pub vendor_id: String,
    pub product_id: String,
    pub interface: Option<String>,
    pub serial: Option<String>,
}

impl std::fmt::Display for UsbIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.vendor_id, self.product_id)
    }
}

/// Where a declared device comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    /// Located at start time by USB identity
    Usb(UsbIdentity),
    /// Fixed host path
    Static { path: PathBuf },
}

/// A device declared in the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    pub name: String,
    pub enabled: bool,
    pub options: String,
    pub container_path: Option<String>,
    /// `Err` holds the reason a malformed entry cannot be resolved
    pub kind: Result<DeviceKind, String>,
}

impl DeviceSpec {
    /// Path inside the container, `/dev/{name}` unless overridden
    pub fn effective_container_path(&self) -> String {
        self.container_path
            .clone()
            .unwrap_or_else(|| format!("/dev/{}", self.name))
    }

    pub fn usb_identity(&self) -> Option<&UsbIdentity> {
        match &self.kind {
            Ok(DeviceKind::Usb(identity)) => Some(identity),
            _ => None,
        }
    }
}

/// Runtime resource options passed through to the launch command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    pub network: String,
    pub privileged: bool,
    pub gpu_enabled: bool,
    pub gpu_options: String,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            privileged: false,
            gpu_enabled: false,
            gpu_options: DEFAULT_GPU_OPTIONS.to_string(),
        }
    }
}

impl ResourceSpec {
    /// Network mode to pass explicitly, `None` for the default bridge
    pub fn network_flag(&self) -> Option<&str> {
        if self.network == DEFAULT_NETWORK {
            None
        } else {
            Some(&self.network)
        }
    }

    /// GPU option tokens, empty when GPU support is disabled
    pub fn gpu_args(&self) -> Vec<String> {
        if !self.gpu_enabled {
            return Vec::new();
        }
        self.gpu_options
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Environment variables exported into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSpec {
    pub ros_domain_id: u32,
    pub ros_localhost_only: u32,
    /// Display used when auto-detection is off or finds nothing
    pub display: String,
    pub auto_detect_display: bool,
    pub pulse_server: Option<String>,
}

impl Default for EnvironmentSpec {
    fn default() -> Self {
        Self {
            ros_domain_id: 0,
            ros_localhost_only: 0,
            display: ":0".to_string(),
            auto_detect_display: true,
            pulse_server: None,
        }
    }
}

impl EnvironmentSpec {
    /// Effective `DISPLAY` value for this run
    pub fn display(&self, host: &dyn HostEnvironment) -> String {
        if self.auto_detect_display {
            if let Some(display) = host.var("DISPLAY") {
                return display;
            }
        }
        self.display.clone()
    }

    /// Effective `PULSE_SERVER` value, derived from the user id when unset or blank
    pub fn pulse_server(&self, host: &dyn HostEnvironment) -> String {
        match self.pulse_server.as_deref().map(str::trim) {
            Some(server) if !server.is_empty() => server.to_string(),
            _ => format!("unix:/run/user/{}/pulse/native", host.uid()),
        }
    }
}

/// Container name, image and attach command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerIdentity {
    pub name: String,
    pub image_repository: String,
    pub image_tag: String,
    pub command: String,
    pub exec_mode: ExecMode,
    pub restart: String,
}

impl ContainerIdentity {
    /// `repository:tag`
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image_repository, self.image_tag)
    }
}

/// Complete typed configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub container: ContainerIdentity,
    pub resources: ResourceSpec,
    pub environment: EnvironmentSpec,
    pub volumes: Vec<VolumeSpec>,
    pub devices: Vec<DeviceSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixedHost;

    fn volume(source: &str) -> VolumeSpec {
        VolumeSpec {
            source: source.to_string(),
            target: "/ws".to_string(),
            enabled: true,
            options: "rw".to_string(),
        }
    }

    #[test]
    fn test_volume_tilde_expansion() {
        let vol = volume("~/catkin_ws");
        assert_eq!(vol.expanded_source(Some("/home/dev")), "/home/dev/catkin_ws");
        assert_eq!(vol.mount_arg(Some("/home/dev")), "/home/dev/catkin_ws:/ws:rw");

        // Unknown home leaves the shorthand alone
        assert_eq!(vol.expanded_source(None), "~/catkin_ws");

        let abs = volume("/opt/data");
        assert_eq!(abs.expanded_source(Some("/home/dev")), "/opt/data");
    }

    #[test]
    fn test_effective_container_path() {
        let mut dev = DeviceSpec {
            name: "lidar".to_string(),
            enabled: true,
            options: "rw".to_string(),
            container_path: None,
            kind: Ok(DeviceKind::Static {
                path: PathBuf::from("/dev/ttyS0"),
            }),
        };
        assert_eq!(dev.effective_container_path(), "/dev/lidar");
        assert!(dev.usb_identity().is_none());

        dev.container_path = Some("/dev/ttyLIDAR".to_string());
        assert_eq!(dev.effective_container_path(), "/dev/ttyLIDAR");
    }

    #[test]
    fn test_network_flag() {
        let mut res = ResourceSpec::default();
        assert_eq!(res.network_flag(), None);

        res.network = "host".to_string();
        assert_eq!(res.network_flag(), Some("host"));
    }

    #[test]
    fn test_gpu_args() {
        let mut res = ResourceSpec::default();
        assert!(res.gpu_args().is_empty());

        res.gpu_enabled = true;
        assert_eq!(res.gpu_args(), vec!["--gpus", "all"]);

        res.gpu_options = "--runtime nvidia  --gpus  device=0".to_string();
        assert_eq!(
            res.gpu_args(),
            vec!["--runtime", "nvidia", "--gpus", "device=0"]
        );
    }

    #[test]
    fn test_pulse_server_derived_from_uid() {
        let host = FixedHost::new(1000);
        let env = EnvironmentSpec::default();
        assert_eq!(env.pulse_server(&host), "unix:/run/user/1000/pulse/native");

        let env = EnvironmentSpec {
            pulse_server: Some("tcp:localhost:4713".to_string()),
            ..EnvironmentSpec::default()
        };
        assert_eq!(env.pulse_server(&host), "tcp:localhost:4713");
    }

    #[test]
    fn test_blank_pulse_server_falls_back() {
        let host = FixedHost::new(1000);
        for blank in ["", "   "] {
            let env = EnvironmentSpec {
                pulse_server: Some(blank.to_string()),
                ..EnvironmentSpec::default()
            };
            assert_eq!(env.pulse_server(&host), "unix:/run/user/1000/pulse/native");
        }
    }

    #[test]
    fn test_display_detection() {
        let env = EnvironmentSpec::default();

        let host = FixedHost::new(1000);
        assert_eq!(env.display(&host), ":0");

        let host = FixedHost::new(1000).with_var("DISPLAY", ":1");
        assert_eq!(env.display(&host), ":1");

        let env = EnvironmentSpec {
            auto_detect_display: false,
            display: ":99".to_string(),
            ..EnvironmentSpec::default()
        };
        assert_eq!(env.display(&host), ":99");
    }

    #[test]
    fn test_image_ref() {
        let identity = ContainerIdentity {
            name: "dev".to_string(),
            image_repository: "osrf/ros".to_string(),
            image_tag: "humble-desktop".to_string(),
            command: "bash".to_string(),
            exec_mode: ExecMode::Interactive,
            restart: "no".to_string(),
        };
        assert_eq!(identity.image_ref(), "osrf/ros:humble-desktop");
    }
}
