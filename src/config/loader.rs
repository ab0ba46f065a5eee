//! YAML configuration loading
//!
//! The document is deserialized into raw shapes with defaults, then converted
//! in a single pass into [`LaunchConfig`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::model::{
    ContainerIdentity, DeviceKind, DeviceSpec, EnvironmentSpec, LaunchConfig, ResourceSpec,
    UsbIdentity, VolumeSpec, DEFAULT_GPU_OPTIONS, DEFAULT_NETWORK,
};
use crate::error::LaunchError;
use crate::types::ExecMode;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    container: RawContainer,
    resources: RawResources,
    environment: RawEnvironment,
    volumes: Vec<RawVolume>,
    devices: Vec<RawDevice>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawContainer {
    name: Option<String>,
    image: RawImage,
    command: String,
    exec_mode: ExecMode,
    restart: String,
}

impl Default for RawContainer {
    fn default() -> Self {
        Self {
            name: None,
            image: RawImage::default(),
            command: "bash".to_string(),
            exec_mode: ExecMode::default(),
            restart: "no".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawImage {
    repository: Option<String>,
    tag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawResources {
    network: String,
    privileged: bool,
    gpu: RawGpu,
}

impl Default for RawResources {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            privileged: false,
            gpu: RawGpu::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawGpu {
    enabled: bool,
    options: String,
}

impl Default for RawGpu {
    fn default() -> Self {
        Self {
            enabled: false,
            options: DEFAULT_GPU_OPTIONS.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawEnvironment {
    #[serde(rename = "ROS_DOMAIN_ID", alias = "ros_domain_id")]
    ros_domain_id: u32,
    #[serde(rename = "ROS_LOCALHOST_ONLY", alias = "ros_localhost_only")]
    ros_localhost_only: u32,
    #[serde(rename = "DISPLAY", alias = "display")]
    display: String,
    auto_detect_display: bool,
    #[serde(rename = "PULSE_SERVER", alias = "pulse_server")]
    pulse_server: Option<String>,
}

impl Default for RawEnvironment {
    fn default() -> Self {
        let env = EnvironmentSpec::default();
        Self {
            ros_domain_id: env.ros_domain_id,
            ros_localhost_only: env.ros_localhost_only,
            display: env.display,
            auto_detect_display: env.auto_detect_display,
            pulse_server: env.pulse_server,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawVolume {
    #[serde(default)]
    source: String,
    #[serde(default)]
    target: String,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_options")]
    options: String,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    name: String,
    path: Option<PathBuf>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_options")]
    options: String,
    usb_vendor: Option<String>,
    usb_product: Option<String>,
    usb_interface: Option<String>,
    usb_serial: Option<String>,
    container_path: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_options() -> String {
    "rw".to_string()
}

impl RawDevice {
    fn into_spec(self) -> DeviceSpec {
        let kind = match (self.usb_vendor, self.usb_product, self.path) {
            (Some(vendor_id), Some(product_id), path) => {
                if let Some(path) = path {
                    warn!(
                        device = %self.name,
                        path = %path.display(),
                        "device declares both a USB identity and a path, ignoring path"
                    );
                }
                Ok(DeviceKind::Usb(UsbIdentity {
                    vendor_id,
                    product_id,
                    interface: self.usb_interface,
                    serial: self.usb_serial,
                }))
            }
            (_, _, Some(path)) => Ok(DeviceKind::Static { path }),
            (Some(_), None, None) | (None, Some(_), None) => {
                Err("incomplete USB identity: usb_vendor and usb_product are both required".to_string())
            }
            (None, None, None) => Err("neither a path nor a USB identity is declared".to_string()),
        };

        DeviceSpec {
            name: self.name,
            enabled: self.enabled,
            options: self.options,
            container_path: self.container_path,
            kind,
        }
    }
}

fn required(value: Option<String>, key: &str) -> Result<String, LaunchError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LaunchError::configuration(format!(
            "{} is required and must not be empty",
            key
        ))),
    }
}

impl RawConfig {
    fn into_model(self) -> Result<LaunchConfig, LaunchError> {
        let container = ContainerIdentity {
            name: required(self.container.name, "container.name")?,
            image_repository: required(self.container.image.repository, "container.image.repository")?,
            image_tag: required(self.container.image.tag, "container.image.tag")?,
            command: self.container.command,
            exec_mode: self.container.exec_mode,
            restart: self.container.restart,
        };

        let resources = ResourceSpec {
            network: self.resources.network,
            privileged: self.resources.privileged,
            gpu_enabled: self.resources.gpu.enabled,
            gpu_options: self.resources.gpu.options,
        };

        let environment = EnvironmentSpec {
            ros_domain_id: self.environment.ros_domain_id,
            ros_localhost_only: self.environment.ros_localhost_only,
            display: self.environment.display,
            auto_detect_display: self.environment.auto_detect_display,
            pulse_server: self.environment.pulse_server,
        };

        let volumes = self
            .volumes
            .into_iter()
            .map(|v| VolumeSpec {
                source: v.source,
                target: v.target,
                enabled: v.enabled,
                options: v.options,
            })
            .collect();

        let devices: Vec<DeviceSpec> = self.devices.into_iter().map(RawDevice::into_spec).collect();

        // Container paths default to /dev/{name}, so two enabled devices with
        // one name would silently shadow each other.
        let mut seen = HashSet::new();
        for device in devices.iter().filter(|d| d.enabled) {
            if !seen.insert(device.name.as_str()) {
                return Err(LaunchError::configuration(format!(
                    "duplicate device name: {}",
                    device.name
                )));
            }
        }

        Ok(LaunchConfig {
            container,
            resources,
            environment,
            volumes,
            devices,
        })
    }
}

impl LaunchConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LaunchError> {
        let raw: RawConfig = serde_yaml::from_str(yaml)
            .context("parsing configuration YAML")
            .map_err(LaunchError::Configuration)?;
        raw.into_model()
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, LaunchError> {
        let yaml = read_config_file(path).map_err(LaunchError::Configuration)?;
        let config = Self::from_yaml_str(&yaml)?;
        debug!(
            path = %path.display(),
            volumes = config.volumes.len(),
            devices = config.devices.len(),
            "configuration loaded"
        );
        Ok(config)
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration file {}", path.display()))
}
