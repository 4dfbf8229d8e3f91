use colored::Colorize;

use crate::{
    error::Warning,
    profile::Registry,
    reconcile::{IdentityChange, SigningChange},
    select::Request,
    Switch,
};

/// Placeholder for a Git setting with no value
const NOT_SET: &str = "(not set)";

/// Shows what a switch did
pub fn print_switch(switch: &Switch) {
    let activation = &switch.activation;
    if switch.request == Request::Rotate {
        println!("{} {}", "auto-rotate mode, selected profile:".blue(), activation.profile);
    }
    println!(
        "{} {} (folder: {})",
        "active SSH profile:".green(),
        activation.profile,
        activation.folder.display()
    );

    match &switch.reconciliation.identity {
        IdentityChange::Untouched => {}
        IdentityChange::Applied { scope, previous, applied } => {
            println!(
                "{} {} ({scope})",
                "git identity updated for profile:".green(),
                activation.profile
            );
            if let Some(git_name) = &applied.name {
                println!("  user.name:  {} -> {git_name}", or_not_set(&previous.name));
            }
            if let Some(git_email) = &applied.email {
                println!("  user.email: {} -> {git_email}", or_not_set(&previous.email));
            }
        }
        IdentityChange::SkippedOutsideRepository { rerun } => {
            println!(
                "{}",
                "not inside a Git repository, skipping local Git identity update".yellow()
            );
            println!("run this from inside the repository:\n  {rerun}");
        }
    }

    match &switch.reconciliation.signing {
        SigningChange::Enabled { .. } => println!("{}", "commit signing enabled".green()),
        SigningChange::Disabled => println!("{}", "commit signing disabled".green()),
        SigningChange::SkippedOutsideRepository { .. } => {
            println!("{}", "commit signing left unchanged outside a repository".yellow())
        }
        SigningChange::Untouched | SigningChange::SkippedMissingKey => {}
    }
}

/// Prints warnings to stderr
pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{} {warning}", "warning:".yellow());
    }
}

/// Lists all profiles, marking the recorded one
pub fn print_profiles(registry: &Registry, active: Option<&str>) {
    if registry.is_empty() {
        println!("{}", "no profiles configured".red());
        return;
    }

    for (name, profile) in registry {
        let marker = if Some(name.as_str()) == active { "*" } else { " " };
        let folder = profile
            .key_folder()
            .map(|folder| folder.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        let signing = if profile.sign_commits { " [signing]" } else { "" };
        println!(
            "{marker} {}  (folder: {folder})  {} <{}>{signing}",
            name.blue(),
            or_not_set(&profile.git_name),
            or_not_set(&profile.git_email),
        );
    }
}

fn or_not_set(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_SET)
}
