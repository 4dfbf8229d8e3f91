use std::path::PathBuf;

use thiserror::Error;

/// Application error types
///
/// Every variant aborts the run. Conditions that are reported but never
/// abort are [`Warning`]s.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
    /// Error when executing Git commands
    #[error("git command failed: {0}")]
    GitCommand(String),
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Error during UTF-8 conversion.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    /// Profiles file is absent or cannot be parsed
    #[error(
        "configuration not usable at {}: {reason}\ncreate it from the template: cp profiles.example.json {}",
        .path.display(),
        .path.display()
    )]
    ConfigurationMissing { path: PathBuf, reason: String },
    /// Profiles file parsed but failed a schema check
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
    /// Profiles file defines no profiles
    #[error("no profiles configured")]
    NoProfiles,
    /// Explicitly requested profile is not in the registry
    #[error("profile '{name}' does not exist\nprofiles: {}", .available.join(", "))]
    ProfileNotFound { name: String, available: Vec<String> },
    /// Profile has no key folder
    #[error("profile '{0}' has no 'folder' defined")]
    ProfileMisconfigured(String),
    /// Source key pair is missing on disk
    #[error(
        "SSH keys not found for profile '{profile}'\nexpected:\n  {}\n  {}",
        .private_key.display(),
        .public_key.display()
    )]
    KeysNotFound {
        profile: String,
        private_key: PathBuf,
        public_key: PathBuf,
    },
}

/// Non-fatal conditions collected during a run and reported at the end
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// chmod on a key or signer file failed
    #[error("could not restrict permissions on {}: {reason}", .path.display())]
    PermissionDegraded { path: PathBuf, reason: String },
    /// Signer file belongs to another user
    #[error(
        "{} is owned by uid {owner}, not by the current user (uid {current}); fix it with `sudo chown {current} {}`",
        .path.display(),
        .path.display()
    )]
    SignerRegistryBlocked {
        path: PathBuf,
        owner: u32,
        current: u32,
    },
    /// Signer file could not be read even after relaxing permissions
    #[error("could not read {}: {reason}; existing signers were not kept", .path.display())]
    SignerRegistryUnreadable { path: PathBuf, reason: String },
    /// Signer file could not be rewritten
    #[error("could not write {}: {reason}; allowed signers left unchanged", .path.display())]
    SignerRegistryUnwritable { path: PathBuf, reason: String },
    /// Public key does not have at least a type and a data token
    #[error("public key {} is malformed: expected `<type> <data> [comment]`", .0.display())]
    MalformedPublicKey(PathBuf),
    /// Commit signing requested but the active public key is absent
    #[error("active public key {} not found, skipping commit signing", .0.display())]
    SigningKeyMissing(PathBuf),
    /// Git exited non-zero
    #[error("`git {command}` failed: {stderr}")]
    GitCommandFailed { command: String, stderr: String },
}
