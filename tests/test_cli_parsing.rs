// Focused CLI parsing tests (tests command-line parsing only, not business logic)

use clap::Parser;
use devlaunch::cli::Cli;
use devlaunch::Mode;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let cli = Cli::try_parse_from(["devlaunch"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("config.yaml"));
    assert!(!cli.dry_run);
    assert!(!cli.force);
    assert!(!cli.verbose);
    assert_eq!(cli.runtime, "docker");
    assert_eq!(cli.mode(), Mode::Normal);
}

#[test]
fn test_all_options() {
    let cli = Cli::try_parse_from([
        "devlaunch",
        "--config",
        "/etc/devlaunch/rover.yaml",
        "--dry-run",
        "--force",
        "--verbose",
        "--runtime",
        "podman",
    ])
    .unwrap();

    assert_eq!(cli.config, PathBuf::from("/etc/devlaunch/rover.yaml"));
    assert!(cli.dry_run);
    assert!(cli.force);
    assert!(cli.verbose);
    assert_eq!(cli.runtime, "podman");
    assert_eq!(cli.mode(), Mode::DryRun);
}

#[test]
fn test_short_flags() {
    let cli = Cli::try_parse_from(["devlaunch", "-c", "lab.yaml", "-f", "-v"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("lab.yaml"));
    assert!(cli.force);
    assert!(cli.verbose);
}

#[test]
fn test_unknown_flag_rejected() {
    assert!(Cli::try_parse_from(["devlaunch", "--detach"]).is_err());
}
