use std::path::{Path, PathBuf};

use crate::{
    error::AppError,
    profile::{self, Profile, Registry, Scope},
    storage::Settings,
};

/// Key file name used for every key pair
pub const KEY_NAME: &str = "id_ed25519";
/// Active profile record inside the credentials directory
pub const LOCK_FILE: &str = "active_profile.lock";
/// Signer allow-list inside the credentials directory
pub const ALLOWED_SIGNERS_FILE: &str = "allowed_signers";

/// Everything a run needs, loaded once at startup
#[derive(Debug, Clone)]
pub struct Context {
    base_dir: PathBuf,
    registry: Registry,
    scope: Scope,
}

impl Context {
    pub fn new(base_dir: impl Into<PathBuf>, registry: Registry, scope: Scope) -> Self {
        Self {
            base_dir: base_dir.into(),
            registry,
            scope,
        }
    }

    /// Builds the context from the profiles file, with an optional scope override
    pub fn from_settings(
        base_dir: impl Into<PathBuf>,
        settings: Settings,
        scope: Option<Scope>,
    ) -> Self {
        let scope = scope.unwrap_or(if settings.git_global_scope {
            Scope::Global
        } else {
            Scope::Local
        });
        Self::new(base_dir, settings.profiles, scope)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, AppError> {
        profile::find(&self.registry, name)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(LOCK_FILE)
    }

    pub fn allowed_signers_path(&self) -> PathBuf {
        self.base_dir.join(ALLOWED_SIGNERS_FILE)
    }

    pub fn active_private_key(&self) -> PathBuf {
        self.base_dir.join(KEY_NAME)
    }

    pub fn active_public_key(&self) -> PathBuf {
        public_key_of(&self.active_private_key())
    }

    /// Source private and public key of a key folder
    pub fn source_keys(&self, folder: &Path) -> (PathBuf, PathBuf) {
        let private_key = self.base_dir.join(folder).join(KEY_NAME);
        let public_key = public_key_of(&private_key);
        (private_key, public_key)
    }
}

fn public_key_of(private_key: &Path) -> PathBuf {
    let mut public_key = private_key.as_os_str().to_owned();
    public_key.push(".pub");
    PathBuf::from(public_key)
}
