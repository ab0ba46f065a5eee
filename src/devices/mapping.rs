use std::path::PathBuf;
use tracing::{error, info};

use super::matcher::UsbMatcher;
use crate::config::{DeviceKind, DeviceSpec};
use crate::error::{DeviceFailure, LaunchError};
use crate::types::Mode;

/// Outcome of resolving one declared device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingOutcome {
    Resolved {
        host_node: PathBuf,
        /// Value of the `--device` flag
        device_arg: String,
    },
    Failed {
        reason: String,
    },
}

/// A declared device paired with its resolution outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    pub device: DeviceSpec,
    pub outcome: MappingOutcome,
}

impl ResolvedMapping {
    pub fn device_arg(&self) -> Option<&str> {
        match &self.outcome {
            MappingOutcome::Resolved { device_arg, .. } => Some(device_arg),
            MappingOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<DeviceFailure> {
        match &self.outcome {
            MappingOutcome::Resolved { .. } => None,
            MappingOutcome::Failed { reason } => Some(DeviceFailure {
                name: self.device.name.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Mappings for every enabled device, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMappings(Vec<ResolvedMapping>);

impl DeviceMappings {
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedMapping> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn failures(&self) -> Vec<DeviceFailure> {
        self.0.iter().filter_map(ResolvedMapping::failure).collect()
    }

    /// `--device` flag values of the resolved devices
    pub fn resolved_args(&self) -> Vec<&str> {
        self.0.iter().filter_map(ResolvedMapping::device_arg).collect()
    }
}

/// Resolves declared devices to host nodes and applies the failure policy
pub struct DeviceMapper<'a> {
    matcher: &'a UsbMatcher<'a>,
}

impl<'a> DeviceMapper<'a> {
    pub fn new(matcher: &'a UsbMatcher<'a>) -> Self {
        Self { matcher }
    }

    /// Resolve a single device without applying any policy
    pub async fn resolve(&self, device: &DeviceSpec) -> ResolvedMapping {
        let outcome = match &device.kind {
            Ok(DeviceKind::Usb(identity)) => match self.matcher.find(identity).await {
                Some(node) => MappingOutcome::Resolved {
                    device_arg: format!(
                        "{}:{}:{}",
                        node.display(),
                        device.effective_container_path(),
                        device.options
                    ),
                    host_node: node,
                },
                None => MappingOutcome::Failed {
                    reason: format!("USB device {} not found", identity),
                },
            },
            Ok(DeviceKind::Static { path }) => {
                if tokio::fs::try_exists(path).await.unwrap_or(false) {
                    MappingOutcome::Resolved {
                        device_arg: format!("{}:{}", path.display(), device.options),
                        host_node: path.clone(),
                    }
                } else {
                    MappingOutcome::Failed {
                        reason: format!("device path does not exist: {}", path.display()),
                    }
                }
            }
            Err(reason) => MappingOutcome::Failed {
                reason: format!("invalid device declaration: {}", reason),
            },
        };

        ResolvedMapping {
            device: device.clone(),
            outcome,
        }
    }

    /// Resolve every enabled device
    ///
    /// In dry-run mode every device is reported by name with a tick or cross
    /// and failures are kept out of the returned arguments. In normal mode a
    /// single failure aborts with [`LaunchError::DeviceResolution`].
    pub async fn map_all(
        &self,
        devices: &[DeviceSpec],
        mode: Mode,
    ) -> Result<DeviceMappings, LaunchError> {
        let mut mappings = Vec::new();
        for device in devices.iter().filter(|d| d.enabled) {
            mappings.push(self.resolve(device).await);
        }
        let mappings = DeviceMappings(mappings);

        match mode {
            Mode::DryRun => {
                for mapping in mappings.iter() {
                    let mark = if mapping.device_arg().is_some() { "✓" } else { "✗" };
                    println!("{} {}", mark, mapping.device.name);
                }
            }
            Mode::Normal => {
                let failures = mappings.failures();
                if !failures.is_empty() {
                    error!("not all required devices were found, refusing to start container");
                    for failure in &failures {
                        error!(device = %failure.name, reason = %failure.reason, "missing device");
                    }
                    return Err(LaunchError::DeviceResolution { failures });
                }
                for mapping in mappings.iter() {
                    log_mapping(mapping);
                }
            }
        }

        Ok(mappings)
    }
}

fn log_mapping(mapping: &ResolvedMapping) {
    let MappingOutcome::Resolved { host_node, .. } = &mapping.outcome else {
        return;
    };
    let device = &mapping.device;

    match device.usb_identity() {
        Some(identity) => {
            let mut line = format!(
                "{} -> {} ({})",
                host_node.display(),
                device.effective_container_path(),
                device.name
            );
            if let Some(interface) = &identity.interface {
                line.push_str(&format!(" [interface:{}]", interface));
            }
            if let Some(serial) = &identity.serial {
                let short: String = serial.chars().take(20).collect();
                line.push_str(&format!(" [serial:{}...]", short));
            }
            info!("mapping USB device: {}", line);
        }
        None => info!("mapping device: {}", host_node.display()),
    }
}
