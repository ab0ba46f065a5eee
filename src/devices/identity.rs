//! Hardware identity lookup for device nodes via udev.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::UsbIdentity;
use crate::error::ExecError;
use crate::exec::CommandRunner;

pub const VENDOR_ID: &str = "ID_VENDOR_ID";
pub const PRODUCT_ID: &str = "ID_MODEL_ID";
pub const INTERFACE_NUM: &str = "ID_USB_INTERFACE_NUM";
pub const SERIAL: &str = "ID_SERIAL";

/// Upper bound for a single udev property query
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// udev properties of one device node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProperties(BTreeMap<String, String>);

impl DeviceProperties {
    /// Parse `KEY=VALUE` lines as printed by `udevadm info -q property`
    pub fn parse(text: &str) -> Self {
        let props = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.to_string()))
            .collect();
        Self(props)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether these properties satisfy every filter in `identity`
    ///
    /// Vendor and product must match exactly; interface and serial are only
    /// compared when the identity specifies them.
    pub fn matches(&self, identity: &UsbIdentity) -> bool {
        if self.get(VENDOR_ID) != Some(identity.vendor_id.as_str())
            || self.get(PRODUCT_ID) != Some(identity.product_id.as_str())
        {
            return false;
        }
        if let Some(interface) = &identity.interface {
            if self.get(INTERFACE_NUM) != Some(interface.as_str()) {
                return false;
            }
        }
        if let Some(serial) = &identity.serial {
            if self.get(SERIAL) != Some(serial.as_str()) {
                return false;
            }
        }
        true
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeviceProperties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Why a property lookup produced nothing
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("property query failed: {0}")]
    Failed(String),
}

/// Retrieves stable identity properties for a device node
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Look up properties, reporting why a lookup failed
    async fn try_identify(&self, node: &Path) -> Result<DeviceProperties, LookupError>;

    /// Look up properties, treating any failure as "no properties"
    async fn identify(&self, node: &Path) -> DeviceProperties {
        match self.try_identify(node).await {
            Ok(props) => props,
            Err(e) => {
                debug!(node = %node.display(), error = %e, "device property lookup failed");
                DeviceProperties::default()
            }
        }
    }
}

/// Resolver backed by `udevadm info`
pub struct UdevResolver<'a> {
    runner: &'a dyn CommandRunner,
    timeout: Duration,
}

impl<'a> UdevResolver<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            timeout: LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl IdentityResolver for UdevResolver<'_> {
    async fn try_identify(&self, node: &Path) -> Result<DeviceProperties, LookupError> {
        let argv = vec![
            "udevadm".to_string(),
            "info".to_string(),
            "-q".to_string(),
            "property".to_string(),
            "-n".to_string(),
            node.display().to_string(),
        ];

        let output = tokio::time::timeout(self.timeout, self.runner.capture(&argv))
            .await
            .map_err(|_| ExecError::TimedOut {
                program: "udevadm".to_string(),
                secs: self.timeout.as_secs(),
            })??;

        if !output.success {
            return Err(LookupError::Failed(output.failure_message()));
        }
        Ok(DeviceProperties::parse(&output.stdout))
    }
}
