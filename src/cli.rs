use std::path::PathBuf;

use clap::Parser;

use crate::profile::Scope;

/// Switches the active SSH key pair and Git identity between named profiles
#[derive(Parser, Debug, Default)]
#[command(version)]
pub struct Cli {
    /// Profile name, or 'auto' to rotate through profiles alphabetically.
    /// If omitted, an interactive selection menu is shown.
    #[arg(short, long)]
    pub profile: Option<String>,
    /// Only switch the SSH key pair, leave Git configuration alone
    #[arg(long)]
    pub no_git: bool,
    /// Override where Git settings are written for this run
    #[arg(long, value_parser = parse_scope)]
    pub scope: Option<Scope>,
    /// Credentials directory [default: ~/.ssh]
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
    /// Profiles file [default: <base-dir>/profiles.json]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// List configured profiles and exit
    #[arg(long, conflicts_with_all = ["profile", "no_git", "scope"])]
    pub list: bool,
    /// Print debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_scope(value: &str) -> Result<Scope, String> {
    value.parse().map_err(|err: crate::error::AppError| err.to_string())
}
