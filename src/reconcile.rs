use crate::{
    context::Context,
    error::{AppError, Warning},
    git::{
        GitConfig, CONFIG_COMMIT_GPG_SIGN, CONFIG_GPG_FORMAT, CONFIG_GPG_SSH_ALLOWED_SIGNERS,
        CONFIG_SIGNING_KEY, CONFIG_TAG_GPG_SIGN, CONFIG_USER_EMAIL, CONFIG_USER_NAME,
    },
    profile::{Profile, Scope},
    signers::SignerRegistry,
};

/// Settings written when signing is on and removed when it is off
const SIGNING_KEYS: [&str; 4] = [
    CONFIG_COMMIT_GPG_SIGN,
    CONFIG_TAG_GPG_SIGN,
    CONFIG_GPG_FORMAT,
    CONFIG_SIGNING_KEY,
];

/// Git author identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// What happened to user.name / user.email
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityChange {
    /// Nothing to write
    #[default]
    Untouched,
    /// Written at `scope`; `previous` holds the values found before
    Applied {
        scope: Scope,
        previous: Identity,
        applied: Identity,
    },
    /// Local scope requested outside a repository
    SkippedOutsideRepository {
        /// Commands to run from inside the intended repository
        rerun: String,
    },
}

/// What happened to the signing settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SigningChange {
    /// Nothing to write
    #[default]
    Untouched,
    /// Signing turned on; `signers_updated` tells if the allow-list was rewritten
    Enabled { signers_updated: bool },
    /// Signing settings removed
    Disabled,
    /// Signing requested but no active public key exists
    SkippedMissingKey,
    /// Local scope requested outside a repository
    SkippedOutsideRepository { signers_updated: bool },
}

/// Summary of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub identity: IdentityChange,
    pub signing: SigningChange,
}

/// Brings Git configuration in line with a profile
pub struct Reconciler<'a, G: GitConfig + ?Sized> {
    ctx: &'a Context,
    git: &'a G,
    signers: &'a SignerRegistry,
}

impl<'a, G: GitConfig + ?Sized> Reconciler<'a, G> {
    pub fn new(ctx: &'a Context, git: &'a G, signers: &'a SignerRegistry) -> Self {
        Self { ctx, git, signers }
    }

    /// Applies the profile's identity and signing state at the context scope
    ///
    /// # Arguments
    /// * `name` - Profile name
    /// * `profile` - Profile to apply
    /// * `apply_identity` - False when Git must be left alone
    /// * `warnings` - Sink for non-fatal problems
    pub fn reconcile(
        &self,
        name: &str,
        profile: &Profile,
        apply_identity: bool,
        warnings: &mut Vec<Warning>,
    ) -> Reconciliation {
        if !apply_identity || !profile.has_git_settings() {
            log::debug!("no git settings to apply for profile '{name}'");
            return Reconciliation::default();
        }

        let scope: Scope = self.ctx.scope();
        let in_scope: bool = scope == Scope::Global || self.git.is_inside_work_tree();
        let identity = Identity {
            name: profile.git_name.clone(),
            email: profile.git_email.clone(),
        };

        let signing = if profile.sign_commits {
            self.enable_signing(scope, in_scope, identity.email.as_deref(), warnings)
        } else if in_scope {
            self.disable_signing(scope, warnings)
        } else {
            SigningChange::Untouched
        };

        let identity = if identity.name.is_none() && identity.email.is_none() {
            IdentityChange::Untouched
        } else if in_scope {
            self.apply_identity(scope, identity, warnings)
        } else {
            IdentityChange::SkippedOutsideRepository {
                rerun: self.rerun_command(&identity, profile.sign_commits),
            }
        };

        log::info!("reconciled git configuration for profile '{name}' at {scope} scope");
        Reconciliation { identity, signing }
    }

    fn apply_identity(
        &self,
        scope: Scope,
        identity: Identity,
        warnings: &mut Vec<Warning>,
    ) -> IdentityChange {
        let previous = Identity {
            name: self.read(scope, CONFIG_USER_NAME),
            email: self.read(scope, CONFIG_USER_EMAIL),
        };

        if let Some(git_name) = &identity.name {
            self.set(scope, CONFIG_USER_NAME, git_name, warnings);
        }
        if let Some(git_email) = &identity.email {
            self.set(scope, CONFIG_USER_EMAIL, git_email, warnings);
        }

        IdentityChange::Applied {
            scope,
            previous,
            applied: identity,
        }
    }

    fn enable_signing(
        &self,
        scope: Scope,
        in_scope: bool,
        email: Option<&str>,
        warnings: &mut Vec<Warning>,
    ) -> SigningChange {
        let public_key = self.ctx.active_public_key();
        if !public_key.is_file() {
            warnings.push(Warning::SigningKeyMissing(public_key));
            return SigningChange::SkippedMissingKey;
        }

        let signers_updated: bool = self.signers.upsert(email, &public_key, warnings);
        if signers_updated {
            // verification is machine-wide, so this one is always global
            let signers_path = self.signers.path().display().to_string();
            self.set(Scope::Global, CONFIG_GPG_SSH_ALLOWED_SIGNERS, &signers_path, warnings);
        }

        if !in_scope {
            return SigningChange::SkippedOutsideRepository { signers_updated };
        }

        let signing_key = public_key.display().to_string();
        self.set(scope, CONFIG_COMMIT_GPG_SIGN, "true", warnings);
        self.set(scope, CONFIG_TAG_GPG_SIGN, "true", warnings);
        self.set(scope, CONFIG_GPG_FORMAT, "ssh", warnings);
        self.set(scope, CONFIG_SIGNING_KEY, &signing_key, warnings);

        SigningChange::Enabled { signers_updated }
    }

    /// Removes the scoped signing settings. The allowed signers path stays.
    fn disable_signing(&self, scope: Scope, warnings: &mut Vec<Warning>) -> SigningChange {
        for key in SIGNING_KEYS {
            if let Err(err) = self.git.unset(scope, key) {
                let command = format!("config {} --unset-all {key}", scope.flag());
                warnings.push(failed(command, err));
            }
        }
        SigningChange::Disabled
    }

    fn read(&self, scope: Scope, key: &str) -> Option<String> {
        self.git.get(scope, key).unwrap_or_else(|err| {
            log::debug!("could not read {key}: {err}");
            None
        })
    }

    fn set(&self, scope: Scope, key: &str, value: &str, warnings: &mut Vec<Warning>) {
        if let Err(err) = self.git.set(scope, key, value) {
            warnings.push(failed(format!("config {} {key} {value}", scope.flag()), err));
        }
    }

    fn rerun_command(&self, identity: &Identity, sign_commits: bool) -> String {
        let mut settings: Vec<(&str, String)> = Vec::new();
        if let Some(git_name) = &identity.name {
            settings.push((CONFIG_USER_NAME, git_name.clone()));
        }
        if let Some(git_email) = &identity.email {
            settings.push((CONFIG_USER_EMAIL, git_email.clone()));
        }
        if sign_commits {
            settings.push((CONFIG_COMMIT_GPG_SIGN, "true".to_string()));
            settings.push((CONFIG_TAG_GPG_SIGN, "true".to_string()));
            settings.push((CONFIG_GPG_FORMAT, "ssh".to_string()));
            settings.push((
                CONFIG_SIGNING_KEY,
                self.ctx.active_public_key().display().to_string(),
            ));
        }

        settings
            .iter()
            .map(|(key, value)| format!("git config --local {key} {}", quote(value)))
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

fn failed(command: String, err: AppError) -> Warning {
    let stderr = match err {
        AppError::GitCommand(stderr) => stderr,
        other => other.to_string(),
    };
    Warning::GitCommandFailed { command, stderr }
}

/// Single-quotes `value` for a POSIX shell
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
