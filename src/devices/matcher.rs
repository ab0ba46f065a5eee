use std::path::PathBuf;
use tracing::debug;

use super::identity::IdentityResolver;
use super::inventory::Inventory;
use crate::config::UsbIdentity;

/// Finds the host node for a declared USB identity
///
/// Nodes are tried in inventory order and the first one whose properties
/// satisfy every supplied filter wins.
pub struct UsbMatcher<'a> {
    inventory: Inventory,
    resolver: &'a dyn IdentityResolver,
}

impl<'a> UsbMatcher<'a> {
    pub fn new(inventory: Inventory, resolver: &'a dyn IdentityResolver) -> Self {
        Self {
            inventory,
            resolver,
        }
    }

    pub async fn find(&self, identity: &UsbIdentity) -> Option<PathBuf> {
        for node in self.inventory.nodes() {
            let props = self.resolver.identify(node).await;
            if props.matches(identity) {
                debug!(node = %node.display(), usb = %identity, "USB device matched");
                return Some(node.clone());
            }
        }
        debug!(
            usb = %identity,
            interface = ?identity.interface,
            serial = ?identity.serial,
            candidates = self.inventory.len(),
            "no USB device matched"
        );
        None
    }
}
