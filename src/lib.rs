//! Switches among named identity profiles, each binding an SSH key pair and a
//! Git author identity.
//!
//! A switch runs strictly in sequence: resolve the profile ([`select`]),
//! record it ([`lock`]), copy its key pair into place ([`keys`]), then bring
//! Git configuration in line ([`reconcile`]). Everything after the key copy is
//! best-effort and reported as [`Warning`]s.

pub mod cli;
pub mod context;
pub mod error;
pub mod git;
pub mod keys;
pub mod lock;
pub mod output;
pub mod profile;
pub mod reconcile;
pub mod select;
pub mod signers;
pub mod storage;
pub mod validation;

use std::path::PathBuf;

pub use crate::{
    cli::Cli,
    context::Context,
    error::{AppError, Warning},
    git::{GitCli, GitConfig},
    keys::Activation,
    lock::LockStore,
    profile::{Profile, Registry, Scope},
    reconcile::{Identity, IdentityChange, Reconciler, Reconciliation, SigningChange},
    select::{InquirePrompt, Prompt, Request},
    signers::SignerRegistry,
};

/// Outcome of one profile switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub request: Request,
    pub activation: Activation,
    pub reconciliation: Reconciliation,
    pub warnings: Vec<Warning>,
}

/// Runs the command line
pub fn run(cli: &Cli) -> Result<(), AppError> {
    let base_dir: PathBuf = match &cli.base_dir {
        Some(dir) => dir.clone(),
        None => storage::default_base_dir()?,
    };
    let config_path: PathBuf = cli
        .config
        .clone()
        .unwrap_or_else(|| base_dir.join(storage::PROFILES_FILE));

    let settings = storage::load_settings(&config_path)?;
    let ctx = Context::from_settings(base_dir, settings, cli.scope);
    log::debug!("credentials directory {}, {} scope", ctx.base_dir().display(), ctx.scope());

    if cli.list {
        let lock = LockStore::new(ctx.lock_path());
        output::print_profiles(ctx.registry(), lock.read().as_deref());
        return Ok(());
    }

    let request = Request::from_arg(cli.profile.as_deref());
    let signers = SignerRegistry::new(ctx.allowed_signers_path());
    let switch = switch_profile(
        &ctx,
        &request,
        !cli.no_git,
        &mut InquirePrompt,
        &GitCli::default(),
        &signers,
    )?;

    output::print_switch(&switch);
    output::print_warnings(&switch.warnings);
    Ok(())
}

/// Resolves, records and activates a profile, then reconciles Git
///
/// The lock is written before the key copy, so a profile whose keys are
/// missing still advances `auto` rotation.
///
/// # Arguments
/// * `ctx` - Run context
/// * `request` - Which profile to switch to
/// * `apply_git` - False to leave Git configuration alone
/// * `prompt` - Answers for interactive selection
/// * `git` - Git configuration backend
/// * `signers` - Allowed signers file
pub fn switch_profile<P, G>(
    ctx: &Context,
    request: &Request,
    apply_git: bool,
    prompt: &mut P,
    git: &G,
    signers: &SignerRegistry,
) -> Result<Switch, AppError>
where
    P: Prompt + ?Sized,
    G: GitConfig + ?Sized,
{
    let lock = LockStore::new(ctx.lock_path());
    let current: Option<String> = lock.read();
    let name: String = select::resolve(request, current.as_deref(), ctx.registry(), prompt)?;
    let profile: &Profile = ctx.profile(&name)?;
    log::info!("selected profile '{name}' (previous: {current:?})");

    lock.write(&name)?;

    let mut warnings: Vec<Warning> = Vec::new();
    let activation = keys::activate(ctx, &name, profile, &mut warnings)?;
    let reconciliation =
        Reconciler::new(ctx, git, signers).reconcile(&name, profile, apply_git, &mut warnings);

    Ok(Switch {
        request: request.clone(),
        activation,
        reconciliation,
        warnings,
    })
}
