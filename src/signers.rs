use std::{fmt, fs, io, path::{Path, PathBuf}};

use crate::{error::Warning, keys::set_mode};

/// Owner read/write, group/other read
const ALLOWED_SIGNERS_MODE: u32 = 0o644;

/// One line of the allowed signers file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedSigner {
    pub email: String,
    pub key_type: String,
    pub key_data: String,
}

impl AllowedSigner {
    /// Builds an entry from public key text (`<type> <data> [comment]`)
    pub fn from_public_key(email: &str, public_key: &str) -> Option<Self> {
        let mut tokens = public_key.split_whitespace();
        let key_type = tokens.next()?;
        let key_data = tokens.next()?;
        Some(Self {
            email: email.to_string(),
            key_type: key_type.to_string(),
            key_data: key_data.to_string(),
        })
    }
}

impl fmt::Display for AllowedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.email, self.key_type, self.key_data)
    }
}

/// Allow-list mapping each email to exactly one public key
#[derive(Debug, Clone)]
pub struct SignerRegistry {
    path: PathBuf,
    owner: Option<u32>,
}

impl SignerRegistry {
    /// Registry guarded against files not owned by the effective user
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owner: current_uid(),
        }
    }

    /// Registry that accepts only files owned by `owner`
    pub fn with_owner(path: impl Into<PathBuf>, owner: u32) -> Self {
        Self {
            path: path.into(),
            owner: Some(owner),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the entry for `email` with the key in `public_key`.
    /// Returns whether the file was rewritten.
    pub fn upsert(
        &self,
        email: Option<&str>,
        public_key: &Path,
        warnings: &mut Vec<Warning>,
    ) -> bool {
        let Some(email) = email else {
            log::debug!("no email, skipping allowed signers update");
            return false;
        };
        let Ok(key_text) = fs::read_to_string(public_key) else {
            log::debug!("{} not readable, skipping allowed signers update", public_key.display());
            return false;
        };

        if let Some(warning) = self.ownership_mismatch() {
            warnings.push(warning);
            return false;
        }

        let Some(entry) = AllowedSigner::from_public_key(email, &key_text) else {
            warnings.push(Warning::MalformedPublicKey(public_key.to_path_buf()));
            return false;
        };

        let entry_line: String = entry.to_string();
        let existing: String = self.load(warnings);
        let mut lines: Vec<&str> = existing
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| principal(line) != Some(email))
            .collect();
        lines.push(&entry_line);

        let mut contents = lines.join("\n");
        contents.push('\n');
        if let Err(err) = fs::write(&self.path, contents) {
            warnings.push(Warning::SignerRegistryUnwritable {
                path: self.path.clone(),
                reason: err.to_string(),
            });
            return false;
        }
        log::info!("registered {email} in {}", self.path.display());

        if let Err(err) = set_mode(&self.path, ALLOWED_SIGNERS_MODE) {
            warnings.push(Warning::PermissionDegraded {
                path: self.path.clone(),
                reason: err.to_string(),
            });
        }
        true
    }

    /// Entries currently in the file, skipping lines that are not `<email> <type> <data>`
    pub fn entries(&self) -> io::Result<Vec<AllowedSigner>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        Ok(contents
            .lines()
            .filter_map(|line| {
                let (email, key) = line.trim().split_once(char::is_whitespace)?;
                AllowedSigner::from_public_key(email, key)
            })
            .collect())
    }

    /// Reads the current file, relaxing permissions once if it is unreadable
    fn load(&self, warnings: &mut Vec<Warning>) -> String {
        match fs::read_to_string(&self.path) {
            Ok(contents) => return contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return String::new(),
            Err(err) => {
                log::debug!("{} unreadable ({err}), relaxing permissions", self.path.display())
            }
        }

        let retried = set_mode(&self.path, ALLOWED_SIGNERS_MODE)
            .and_then(|_| fs::read_to_string(&self.path));
        match retried {
            Ok(contents) => contents,
            Err(err) => {
                warnings.push(Warning::SignerRegistryUnreadable {
                    path: self.path.clone(),
                    reason: err.to_string(),
                });
                String::new()
            }
        }
    }

    fn ownership_mismatch(&self) -> Option<Warning> {
        let expected = self.owner?;
        let owner = file_owner(&self.path)?;
        (owner != expected).then(|| Warning::SignerRegistryBlocked {
            path: self.path.clone(),
            owner,
            current: expected,
        })
    }
}

fn principal(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

#[cfg(unix)]
fn current_uid() -> Option<u32> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    Some(unsafe { libc::geteuid() })
}

#[cfg(not(unix))]
fn current_uid() -> Option<u32> {
    None
}

#[cfg(unix)]
fn file_owner(path: &Path) -> Option<u32> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path).ok().map(|metadata| metadata.uid())
}

#[cfg(not(unix))]
fn file_owner(_path: &Path) -> Option<u32> {
    None
}
