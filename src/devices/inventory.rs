use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Glob patterns for USB-serial device nodes
pub const SERIAL_DEVICE_PATTERNS: [&str; 2] = ["/dev/ttyUSB*", "/dev/ttyACM*"];

/// Snapshot of serial device nodes present on the host
///
/// Nodes are kept in lexicographic order, which is also the order in which
/// USB matching considers them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    nodes: Vec<PathBuf>,
}

impl Inventory {
    /// Scan the standard USB-serial node patterns
    pub fn scan() -> Self {
        Self::scan_patterns(&SERIAL_DEVICE_PATTERNS)
    }

    /// Scan arbitrary glob patterns; unreadable entries are skipped
    pub fn scan_patterns(patterns: &[&str]) -> Self {
        let mut nodes = Vec::new();
        for pattern in patterns {
            match glob::glob(pattern) {
                Ok(paths) => nodes.extend(paths.filter_map(Result::ok)),
                Err(e) => warn!(pattern = %pattern, error = %e, "invalid device pattern"),
            }
        }
        let inventory = Self::from_nodes(nodes);
        debug!(count = inventory.len(), nodes = ?inventory.nodes, "serial devices scanned");
        inventory
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut nodes: Vec<PathBuf> = nodes.into_iter().collect();
        nodes.sort();
        nodes.dedup();
        Self { nodes }
    }

    pub fn nodes(&self) -> &[PathBuf] {
        &self.nodes
    }

    pub fn contains(&self, node: &Path) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
