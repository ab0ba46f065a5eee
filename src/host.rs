//! Access to the launching process's environment.

use std::collections::HashMap;

/// Read-only view of the host process environment
pub trait HostEnvironment: Send + Sync {
    /// Environment variable, `None` when unset or not valid UTF-8
    fn var(&self, key: &str) -> Option<String>;

    /// Real user id of the launching process
    fn uid(&self) -> u32;

    /// Home directory used for `~` expansion
    fn home(&self) -> Option<String> {
        self.var("HOME")
    }
}

/// The actual process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn uid(&self) -> u32 {
        nix::unistd::getuid().as_raw()
    }
}

/// Fixed environment snapshot, for tests and reproducible dry runs
#[derive(Debug, Default, Clone)]
pub struct FixedHost {
    uid: u32,
    vars: HashMap<String, String>,
}

impl FixedHost {
    pub fn new(uid: u32) -> Self {
        Self {
            uid,
            vars: HashMap::new(),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl HostEnvironment for FixedHost {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn uid(&self) -> u32 {
        self.uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_host_uid_matches_nix() {
        assert_eq!(SystemHost.uid(), nix::unistd::getuid().as_raw());
    }

    #[test]
    fn test_fixed_host() {
        let host = FixedHost::new(1000).with_var("HOME", "/home/dev");
        assert_eq!(host.uid(), 1000);
        assert_eq!(host.home().as_deref(), Some("/home/dev"));
        assert_eq!(host.var("DISPLAY"), None);
    }
}
