//! Assembly of the container `run` command line.
//!
//! Argument order is fixed: base flags, name, network, privileged, GPU,
//! volumes, devices, environment, image, keep-alive command. Identical input
//! always yields an identical argument list.

use crate::config::{ContainerIdentity, EnvironmentSpec, ResourceSpec, VolumeSpec};
use crate::devices::DeviceMappings;
use crate::host::HostEnvironment;

/// Keeps the container alive so it can be attached to later
pub const KEEP_ALIVE: [&str; 3] = ["tail", "-f", "/dev/null"];

/// `-v` pairs for every enabled volume
pub fn volume_args(volumes: &[VolumeSpec], home: Option<&str>) -> Vec<String> {
    volumes
        .iter()
        .filter(|v| v.enabled)
        .flat_map(|v| ["-v".to_string(), v.mount_arg(home)])
        .collect()
}

/// `--device` pairs for every resolved device, in mapping order
pub fn device_args(mappings: &DeviceMappings) -> Vec<String> {
    mappings
        .resolved_args()
        .into_iter()
        .flat_map(|arg| ["--device".to_string(), arg.to_string()])
        .collect()
}

/// `-e` pairs for ROS, display and audio settings
pub fn environment_args(env: &EnvironmentSpec, host: &dyn HostEnvironment) -> Vec<String> {
    [
        format!("ROS_DOMAIN_ID={}", env.ros_domain_id),
        format!("ROS_LOCALHOST_ONLY={}", env.ros_localhost_only),
        format!("DISPLAY={}", env.display(host)),
        format!("PULSE_SERVER={}", env.pulse_server(host)),
    ]
    .into_iter()
    .flat_map(|var| ["-e".to_string(), var])
    .collect()
}

/// Full argument list for `<runtime> run`
pub fn assemble(
    runtime: &str,
    identity: &ContainerIdentity,
    resources: &ResourceSpec,
    device_args: &[String],
    volume_args: &[String],
    env_args: &[String],
) -> Vec<String> {
    let mut cmd = vec![runtime.to_string(), "run".to_string(), "-d".to_string()];

    cmd.push("--name".to_string());
    cmd.push(identity.name.clone());

    if let Some(network) = resources.network_flag() {
        cmd.push("--network".to_string());
        cmd.push(network.to_string());
    }

    if resources.privileged {
        cmd.push("--privileged".to_string());
    }

    cmd.extend(resources.gpu_args());
    cmd.extend_from_slice(volume_args);
    cmd.extend_from_slice(device_args);
    cmd.extend_from_slice(env_args);

    cmd.push(identity.image_ref());
    cmd.extend(KEEP_ALIVE.iter().map(|s| s.to_string()));

    cmd
}
