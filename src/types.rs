use serde::Deserialize;

/// Execution mode for a single run
///
/// Passed explicitly to the components that behave differently when nothing
/// on the host may be mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    DryRun,
}

impl Mode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Mode::DryRun
        } else {
            Mode::Normal
        }
    }

    pub fn is_dry_run(self) -> bool {
        matches!(self, Mode::DryRun)
    }
}

/// How the configured command is started when attaching to the container
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// `exec -it <name> <command>`
    #[default]
    Interactive,
    /// `exec -it <name> bash -c <command>` so login profiles are sourced
    Command,
}
