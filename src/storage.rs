use std::{fs, io, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::{error::AppError, profile::Registry, validation::validate_registry};

/// Profiles file inside the credentials directory
pub const PROFILES_FILE: &str = "profiles.json";
/// Credentials directory inside the user's home directory
const SSH_DIR: &str = ".ssh";

/// Contents of the profiles file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Write Git settings with --global instead of --local
    #[serde(default = "default_global_scope")]
    pub git_global_scope: bool,
    /// Profiles keyed by name
    pub profiles: Registry,
}

fn default_global_scope() -> bool {
    true
}

/// Gets the default credentials directory (~/.ssh)
pub fn default_base_dir() -> Result<PathBuf, AppError> {
    let home_dir: PathBuf = dirs::home_dir().ok_or_else(|| {
        AppError::Validation("failed to find the home directory".to_string())
    })?;
    Ok(home_dir.join(SSH_DIR))
}

/// Loads and validates the profiles file
///
/// # Arguments
/// * `path` - Location of the profiles file
pub fn load_settings(path: &Path) -> Result<Settings, AppError> {
    let file_contents: String = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::ConfigurationMissing {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    log::debug!("loaded profiles file {}", path.display());

    let settings: Settings =
        serde_json::from_str(&file_contents).map_err(|err| AppError::ConfigurationMissing {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    validate_registry(&settings.profiles)?;

    Ok(settings)
}
