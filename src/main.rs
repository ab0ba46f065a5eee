use anyhow::Result;
use clap::Parser;
use devlaunch::cli::Cli;
use devlaunch::{commands, LaunchError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only use colors when outputting to a TTY
    let use_color = atty::is(atty::Stream::Stdout);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(cli.log_level().into()))
        .with_target(false)
        .with_ansi(use_color)
        .init();

    let result = commands::cmd_start(&cli).await;

    if let Err(e) = &result {
        match e {
            LaunchError::Interrupted { .. } => info!("{}", e),
            LaunchError::DeviceResolution { .. } => {
                error!("Error: {:#}", e);
                pause_before_exit().await;
            }
            _ => error!("Error: {:#}", e),
        }
        std::process::exit(e.exit_code());
    }

    Ok(())
}

/// Keep a launcher terminal window open long enough to read the missing devices
async fn pause_before_exit() {
    if !atty::is(atty::Stream::Stdin) {
        return;
    }
    println!("\nPress Enter to exit...");
    let mut line = String::new();
    let _ = BufReader::new(tokio::io::stdin()).read_line(&mut line).await;
}
