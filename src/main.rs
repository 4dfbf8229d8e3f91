use std::process;

use clap::Parser;
use colored::Colorize;
use env_logger::Env;

use keyswitch::{run, Cli};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(err) = run(&cli) {
        eprintln!("{} {err}", "error:".red());
        process::exit(1);
    }
}
