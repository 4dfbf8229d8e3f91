use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
    process::{Command, Output},
};

use crate::{error::AppError, profile::Scope};

pub const CONFIG_USER_NAME: &str = "user.name";
pub const CONFIG_USER_EMAIL: &str = "user.email";
pub const CONFIG_COMMIT_GPG_SIGN: &str = "commit.gpgsign";
pub const CONFIG_TAG_GPG_SIGN: &str = "tag.gpgsign";
pub const CONFIG_GPG_FORMAT: &str = "gpg.format";
pub const CONFIG_SIGNING_KEY: &str = "user.signingkey";
pub const CONFIG_GPG_SSH_ALLOWED_SIGNERS: &str = "gpg.ssh.allowedSignersFile";

/// Exit code of `git config --get` for a missing key
const EXIT_KEY_MISSING: i32 = 1;
/// Exit code of `git config --unset-all` for a missing key
const EXIT_NOTHING_TO_UNSET: i32 = 5;

/// The Git configuration operations the reconciler relies on
pub trait GitConfig {
    /// Reads `key` at `scope`, `None` if not set
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, AppError>;
    /// Sets `key` to `value` at `scope`
    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), AppError>;
    /// Removes `key` at `scope`. A key that was never set is not an error.
    fn unset(&self, scope: Scope, key: &str) -> Result<(), AppError>;
    /// Checks if current directory is in a Git work tree
    fn is_inside_work_tree(&self) -> bool;
}

/// Runs the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
    envs: Vec<(OsString, OsString)>,
    current_dir: Option<PathBuf>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
            envs: Vec::new(),
            current_dir: None,
        }
    }
}

impl GitCli {
    /// Sets an environment variable for every invocation
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_owned(), value.as_ref().to_owned()));
        self
    }

    /// Runs every invocation in `dir`
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    fn run(&self, args: &[&str]) -> Result<Output, AppError> {
        log::debug!("running git {}", args.join(" "));
        let mut command = Command::new(&self.program);
        command.args(args);
        command.envs(self.envs.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        Ok(command.output()?)
    }
}

impl GitConfig for GitCli {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, AppError> {
        let git_command_output: Output = self.run(&["config", scope.flag(), "--get", key])?;

        if git_command_output.status.code() == Some(EXIT_KEY_MISSING) {
            return Ok(None);
        }
        if !git_command_output.status.success() {
            return Err(command_error(git_command_output));
        }

        let value = String::from_utf8(git_command_output.stdout)?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), AppError> {
        let git_command_output: Output = self.run(&["config", scope.flag(), key, value])?;

        if !git_command_output.status.success() {
            return Err(command_error(git_command_output));
        }
        Ok(())
    }

    fn unset(&self, scope: Scope, key: &str) -> Result<(), AppError> {
        let git_command_output: Output =
            self.run(&["config", scope.flag(), "--unset-all", key])?;

        if git_command_output.status.success()
            || git_command_output.status.code() == Some(EXIT_NOTHING_TO_UNSET)
        {
            return Ok(());
        }
        Err(command_error(git_command_output))
    }

    fn is_inside_work_tree(&self) -> bool {
        match self.run(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(output) => {
                output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true"
            }
            Err(err) => {
                log::debug!("could not run git rev-parse: {err}");
                false
            }
        }
    }
}

fn command_error(output: Output) -> AppError {
    AppError::GitCommand(String::from_utf8_lossy(&output.stderr).trim().to_string())
}
