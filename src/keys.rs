use std::{fs, io, path::{Path, PathBuf}};

use crate::{
    context::Context,
    error::{AppError, Warning},
    profile::Profile,
};

/// Owner read/write
const PRIVATE_KEY_MODE: u32 = 0o600;

/// Result of a successful key activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Profile that was activated
    pub profile: String,
    /// Folder the key pair was copied from
    pub folder: PathBuf,
}

/// Copies the profile's key pair over the active key pair
///
/// # Arguments
/// * `ctx` - Run context
/// * `name` - Profile name
/// * `profile` - Profile to activate
/// * `warnings` - Sink for non-fatal problems
pub fn activate(
    ctx: &Context,
    name: &str,
    profile: &Profile,
    warnings: &mut Vec<Warning>,
) -> Result<Activation, AppError> {
    let folder: &PathBuf = profile
        .key_folder()
        .ok_or_else(|| AppError::ProfileMisconfigured(name.to_string()))?;

    let (src_private, src_public) = ctx.source_keys(folder);
    if !src_private.is_file() || !src_public.is_file() {
        return Err(AppError::KeysNotFound {
            profile: name.to_string(),
            private_key: src_private,
            public_key: src_public,
        });
    }

    let dst_private: PathBuf = ctx.active_private_key();
    let dst_public: PathBuf = ctx.active_public_key();
    overwrite(&src_private, &dst_private)?;
    overwrite(&src_public, &dst_public)?;

    if let Err(err) = set_mode(&dst_private, PRIVATE_KEY_MODE) {
        warnings.push(Warning::PermissionDegraded {
            path: dst_private,
            reason: err.to_string(),
        });
    }

    log::info!("activated profile '{name}' from {}", folder.display());
    Ok(Activation {
        profile: name.to_string(),
        folder: folder.clone(),
    })
}

/// Copies `src` over `dst`, replacing a write-protected `dst` if needed
fn overwrite(src: &Path, dst: &Path) -> Result<(), AppError> {
    log::debug!("copying {} to {}", src.display(), dst.display());
    match fs::copy(src, dst) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied && dst.exists() => {
            log::debug!("{} is write-protected, replacing it", dst.display());
            fs::remove_file(dst)?;
            fs::copy(src, dst)?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Sets Unix permission bits on `path`
#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub(crate) fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
