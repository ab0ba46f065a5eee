use clap::Parser;
use std::path::PathBuf;

use crate::runtime::DEFAULT_RUNTIME;

#[derive(Parser, Debug)]
#[command(
    name = "devlaunch",
    version,
    about = "Start a development container with X11, audio, GPU and USB serial devices mapped in"
)]
pub struct Cli {
    /// Configuration file
    #[arg(long, short, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Print the container command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Pull the image even when it is already present
    #[arg(long, short)]
    pub force: bool,

    /// Debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Container tool binary (docker or podman)
    #[arg(long, default_value = DEFAULT_RUNTIME)]
    pub runtime: String,
}
