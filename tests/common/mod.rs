// Common test utilities for devlaunch integration tests
#![allow(dead_code)]

use devlaunch::error::ExecError;
use devlaunch::exec::{CommandOutput, CommandRunner};
use std::collections::HashMap;
use std::sync::Mutex;

/// Minimal configuration used by most tests
pub const BASE_CONFIG: &str = r#"
container:
  name: dev
  image:
    repository: osrf/ros
    tag: humble
"#;

/// Scripted stand-in for the host: udev, xhost and a docker-compatible CLI.
///
/// Every argument list is recorded so tests can assert on what would have
/// been executed.
#[derive(Default)]
pub struct FakeHost {
    udev: HashMap<String, String>,
    containers: Vec<(String, bool)>,
    images: Vec<String>,
    failing: Vec<Vec<String>>,
    interrupting: Vec<Vec<String>>,
    calls: Mutex<Vec<Vec<String>>>,
}

fn ok(stdout: impl Into<String>) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

fn failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

fn has_prefix(argv: &[String], prefix: &[String]) -> bool {
    argv.len() >= prefix.len() && argv.iter().zip(prefix).all(|(a, p)| a == p)
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a serial node with its USB vendor/product (and optional interface)
    pub fn with_usb(mut self, node: &str, vendor: &str, product: &str, interface: Option<&str>) -> Self {
        let mut text = format!(
            "DEVNAME={}\nID_VENDOR_ID={}\nID_MODEL_ID={}\nID_SERIAL={}_{}_{}\n",
            node,
            vendor,
            product,
            vendor,
            product,
            node.trim_start_matches("/dev/")
        );
        if let Some(interface) = interface {
            text.push_str(&format!("ID_USB_INTERFACE_NUM={}\n", interface));
        }
        self.udev.insert(node.to_string(), text);
        self
    }

    pub fn with_container(mut self, name: &str, running: bool) -> Self {
        self.containers.push((name.to_string(), running));
        self
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.images.push(image.to_string());
        self
    }

    /// Make every command starting with `prefix` exit non-zero
    pub fn failing(mut self, prefix: &[&str]) -> Self {
        self.failing.push(prefix.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Simulate Ctrl-C during every command starting with `prefix`
    pub fn interrupting(mut self, prefix: &[&str]) -> Self {
        self.interrupting.push(prefix.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.join(" ")).collect()
    }

    /// Recorded calls whose program is `program`
    pub fn calls_to(&self, program: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c[0] == program)
            .map(|c| c.join(" "))
            .collect()
    }

    fn answer(&self, argv: &[String]) -> Result<CommandOutput, ExecError> {
        self.calls.lock().unwrap().push(argv.to_vec());

        if self.interrupting.iter().any(|p| has_prefix(argv, p)) {
            return Err(ExecError::Interrupted {
                program: argv[0].clone(),
            });
        }
        if self.failing.iter().any(|p| has_prefix(argv, p)) {
            return Ok(failed("simulated failure"));
        }

        let args: Vec<&str> = argv.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["udevadm", "info", "-q", "property", "-n", node] => Ok(self
                .udev
                .get(*node)
                .map(|text| ok(text.clone()))
                .unwrap_or_else(|| failed("Unknown device: No such device"))),
            ["xhost", ..] => Ok(ok("")),
            [_, "--version"] => Ok(ok("Docker version 27.1.1, build 6312585\n")),
            [_, "ps", "-a", ..] => Ok(ok(self
                .containers
                .iter()
                .map(|(name, _)| format!("{}\n", name))
                .collect::<String>())),
            [_, "ps", ..] => Ok(ok(self
                .containers
                .iter()
                .filter(|(_, running)| *running)
                .map(|(name, _)| format!("{}\n", name))
                .collect::<String>())),
            [_, "images", .., image] => Ok(ok(if self.images.iter().any(|i| i == *image) {
                format!("{}\n", image)
            } else {
                String::new()
            })),
            [_, "pull" | "stop" | "rm" | "run" | "exec", ..] => Ok(ok("")),
            _ => Err(ExecError::Spawn {
                program: argv[0].clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}

#[async_trait::async_trait]
impl CommandRunner for FakeHost {
    async fn capture(&self, argv: &[String]) -> Result<CommandOutput, ExecError> {
        self.answer(argv)
    }

    async fn interactive(&self, argv: &[String]) -> Result<CommandOutput, ExecError> {
        self.answer(argv)
    }
}
