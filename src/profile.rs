use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr};

use serde::Deserialize;

use crate::error::AppError;

/// Represents an identity profile stored in the profiles file
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Key folder relative to the credentials directory
    #[serde(default)]
    pub folder: Option<PathBuf>,
    /// Git username (user.name)
    #[serde(default)]
    pub git_name: Option<String>,
    /// Git email address (user.email)
    #[serde(default)]
    pub git_email: Option<String>,
    /// Enables SSH commit and tag signing
    #[serde(default)]
    pub sign_commits: bool,
}

impl Profile {
    /// Key folder, treating an empty path as unset
    pub fn key_folder(&self) -> Option<&PathBuf> {
        self.folder.as_ref().filter(|folder| !folder.as_os_str().is_empty())
    }

    /// Whether the profile carries anything for Git at all
    pub fn has_git_settings(&self) -> bool {
        self.git_name.is_some() || self.git_email.is_some() || self.sign_commits
    }
}

/// Profiles keyed by name. Iteration order is lexicographic.
pub type Registry = BTreeMap<String, Profile>;

/// Looks up a profile by exact name
pub fn find<'a>(registry: &'a Registry, name: &str) -> Result<&'a Profile, AppError> {
    registry.get(name).ok_or_else(|| AppError::ProfileNotFound {
        name: name.to_string(),
        available: registry.keys().cloned().collect(),
    })
}

/// Where Git settings are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Local,
}

impl Scope {
    /// Flag passed to `git config`
    pub fn flag(self) -> &'static str {
        match self {
            Scope::Global => "--global",
            Scope::Local => "--local",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Local => f.write_str("local"),
        }
    }
}

impl FromStr for Scope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Scope::Global),
            "local" => Ok(Scope::Local),
            other => Err(AppError::Validation(format!(
                "unknown scope '{other}', expected 'global' or 'local'"
            ))),
        }
    }
}
