use super::args::Cli;
use crate::Mode;

impl Cli {
    pub fn mode(&self) -> Mode {
        Mode::from_dry_run(self.dry_run)
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
