//! Host device discovery and resolution
//!
//! USB-serial nodes such as `/dev/ttyUSB0` are renumbered across reboots and
//! reconnects, so declared USB devices are located by vendor, product,
//! interface and serial at every start rather than by path.

pub mod identity;
pub mod inventory;
pub mod mapping;
pub mod matcher;

pub use identity::{DeviceProperties, IdentityResolver, LookupError, UdevResolver};
pub use inventory::Inventory;
pub use mapping::{DeviceMapper, DeviceMappings, MappingOutcome, ResolvedMapping};
pub use matcher::UsbMatcher;
