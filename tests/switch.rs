use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use keyswitch::{
    git::{CONFIG_COMMIT_GPG_SIGN, CONFIG_USER_EMAIL},
    run, switch_profile, AppError, Cli, Context, GitConfig, IdentityChange, Profile, Prompt,
    Registry, Request, Scope, SignerRegistry, SigningChange,
};
use tempfile::TempDir;

/// In-memory git config
#[derive(Default)]
struct FakeGit {
    values: RefCell<HashMap<(Scope, String), String>>,
    inside_repo: bool,
}

impl FakeGit {
    fn value(&self, scope: Scope, key: &str) -> Option<String> {
        self.values.borrow().get(&(scope, key.to_string())).cloned()
    }
}

impl GitConfig for FakeGit {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.value(scope, key))
    }

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .borrow_mut()
            .insert((scope, key.to_string()), value.to_string());
        Ok(())
    }

    fn unset(&self, scope: Scope, key: &str) -> Result<(), AppError> {
        self.values.borrow_mut().remove(&(scope, key.to_string()));
        Ok(())
    }

    fn is_inside_work_tree(&self) -> bool {
        self.inside_repo
    }
}

/// Prompt that must never be asked
struct NoPrompt;

impl Prompt for NoPrompt {
    fn show(&mut self, _text: &str) {}

    fn ask(&mut self, message: &str) -> Result<String, AppError> {
        panic!("unexpected prompt: {message}");
    }

    fn reject(&mut self, _reason: &str) {}
}

struct Workstation {
    dir: TempDir,
}

impl Workstation {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn base(&self) -> &Path {
        self.dir.path()
    }

    fn key_pair(&self, folder: &str, tag: &str) -> &Self {
        let dir = self.base().join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("id_ed25519"), format!("PRIVATE {tag}\n")).unwrap();
        fs::write(
            dir.join("id_ed25519.pub"),
            format!("ssh-ed25519 AAAA{tag} {tag}@laptop\n"),
        )
        .unwrap();
        self
    }

    fn context(&self, scope: Scope, sign_a: bool) -> Context {
        let mut registry = Registry::new();
        registry.insert(
            "a".to_string(),
            Profile {
                folder: Some(PathBuf::from("A")),
                git_name: None,
                git_email: Some("a@x.com".to_string()),
                sign_commits: sign_a,
            },
        );
        registry.insert(
            "b".to_string(),
            Profile {
                folder: Some(PathBuf::from("B")),
                git_name: None,
                git_email: Some("b@x.com".to_string()),
                sign_commits: false,
            },
        );
        Context::new(self.base(), registry, scope)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.base().join(name)).unwrap()
    }
}

fn switch(
    ctx: &Context,
    request: Request,
    git: &FakeGit,
) -> Result<keyswitch::Switch, AppError> {
    let signers = SignerRegistry::new(ctx.allowed_signers_path());
    switch_profile(ctx, &request, true, &mut NoPrompt, git, &signers)
}

#[test]
fn auto_rotates_and_materializes_each_profile() {
    let ws = Workstation::new();
    ws.key_pair("A", "a").key_pair("B", "b");
    let ctx = ws.context(Scope::Global, false);
    let git = FakeGit::default();

    for expected in ["a", "b", "a"] {
        let result = switch(&ctx, Request::Rotate, &git).unwrap();
        assert_eq!(result.activation.profile, expected);
        assert_eq!(ws.read("active_profile.lock"), expected);
        assert_eq!(
            fs::read(ctx.active_private_key()).unwrap(),
            fs::read(ws.base().join(expected.to_uppercase()).join("id_ed25519")).unwrap()
        );
        assert_eq!(
            git.value(Scope::Global, CONFIG_USER_EMAIL),
            Some(format!("{expected}@x.com"))
        );
    }
}

#[test]
fn failed_activation_still_advances_rotation() {
    let ws = Workstation::new();
    ws.key_pair("B", "b");
    let ctx = ws.context(Scope::Global, false);
    let git = FakeGit::default();

    // "a" has no keys on disk: the lock moves anyway
    let err = switch(&ctx, Request::Rotate, &git).unwrap_err();
    assert!(matches!(err, AppError::KeysNotFound { ref profile, .. } if profile == "a"));
    assert_eq!(ws.read("active_profile.lock"), "a");
    assert!(git.values.borrow().is_empty());

    let result = switch(&ctx, Request::Rotate, &git).unwrap();
    assert_eq!(result.activation.profile, "b");
}

#[test]
fn unknown_profile_changes_nothing() {
    let ws = Workstation::new();
    ws.key_pair("A", "a");
    let ctx = ws.context(Scope::Global, false);
    let git = FakeGit::default();

    let err = switch(&ctx, Request::Named("c".to_string()), &git).unwrap_err();

    assert!(err.to_string().contains("a, b"));
    assert!(!ws.base().join("active_profile.lock").exists());
    assert!(!ctx.active_private_key().exists());
}

#[test]
fn signing_profile_registers_signer() {
    let ws = Workstation::new();
    ws.key_pair("A", "a").key_pair("B", "b");
    let ctx = ws.context(Scope::Global, true);
    let git = FakeGit::default();

    let result = switch(&ctx, Request::Named("a".to_string()), &git).unwrap();
    switch(&ctx, Request::Named("a".to_string()), &git).unwrap();

    assert_eq!(
        result.reconciliation.signing,
        SigningChange::Enabled { signers_updated: true }
    );
    assert_eq!(ws.read("allowed_signers"), "a@x.com ssh-ed25519 AAAAa\n");
    assert_eq!(git.value(Scope::Global, CONFIG_COMMIT_GPG_SIGN).as_deref(), Some("true"));

    // switching to a non-signing profile turns signing off again
    let result = switch(&ctx, Request::Named("b".to_string()), &git).unwrap();
    assert_eq!(result.reconciliation.signing, SigningChange::Disabled);
    assert_eq!(git.value(Scope::Global, CONFIG_COMMIT_GPG_SIGN), None);
    assert_eq!(ws.read("allowed_signers"), "a@x.com ssh-ed25519 AAAAa\n");
}

#[test]
fn local_scope_outside_repository_still_switches_keys() {
    let ws = Workstation::new();
    ws.key_pair("A", "a");
    let ctx = ws.context(Scope::Local, false);
    let git = FakeGit::default();

    let result = switch(&ctx, Request::Named("a".to_string()), &git).unwrap();

    assert!(matches!(
        result.reconciliation.identity,
        IdentityChange::SkippedOutsideRepository { .. }
    ));
    assert!(result.warnings.is_empty());
    assert_eq!(ws.read("active_profile.lock"), "a");
    assert_eq!(ws.read("id_ed25519"), "PRIVATE a\n");
    assert!(git.values.borrow().is_empty());
}

fn write_profiles(ws: &Workstation) {
    fs::write(
        ws.base().join("profiles.json"),
        r#"{
            "git_global_scope": false,
            "profiles": {
                "a": { "folder": "A", "git_email": "a@x.com" },
                "b": { "folder": "B", "git_email": "b@x.com", "sign_commits": true }
            }
        }"#,
    )
    .unwrap();
}

#[test]
fn run_without_git_switches_keys() {
    let ws = Workstation::new();
    ws.key_pair("A", "a").key_pair("B", "b");
    write_profiles(&ws);
    let cli = Cli {
        profile: Some("b".to_string()),
        no_git: true,
        base_dir: Some(ws.base().to_path_buf()),
        ..Cli::default()
    };

    run(&cli).unwrap();

    assert_eq!(ws.read("active_profile.lock"), "b");
    assert_eq!(ws.read("id_ed25519.pub"), "ssh-ed25519 AAAAb b@laptop\n");
    assert!(!ws.base().join("allowed_signers").exists());
}

#[test]
fn run_list_does_not_mutate() {
    let ws = Workstation::new();
    write_profiles(&ws);
    let cli = Cli {
        list: true,
        base_dir: Some(ws.base().to_path_buf()),
        ..Cli::default()
    };

    run(&cli).unwrap();

    assert!(!ws.base().join("active_profile.lock").exists());
}

#[test]
fn run_without_configuration_fails_before_mutation() {
    let ws = Workstation::new();
    ws.key_pair("A", "a");
    let cli = Cli {
        profile: Some("a".to_string()),
        base_dir: Some(ws.base().to_path_buf()),
        ..Cli::default()
    };

    let err = run(&cli).unwrap_err();

    assert!(matches!(err, AppError::ConfigurationMissing { .. }));
    assert!(!ws.base().join("active_profile.lock").exists());
    assert!(!ws.base().join("id_ed25519").exists());
}
