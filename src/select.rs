use colored::Colorize;
use inquire::Text;

use crate::{
    error::AppError,
    profile::{self, Registry},
    validation::{prompt_until_valid, validate_selection},
};

/// Profile argument that requests round-robin rotation
pub const AUTO: &str = "auto";

/// Source of interactive answers
pub trait Prompt {
    /// Shows informational text
    fn show(&mut self, text: &str);
    /// Asks a question and returns the raw answer
    fn ask(&mut self, message: &str) -> Result<String, AppError>;
    /// Reports why the last answer was not accepted
    fn reject(&mut self, reason: &str);
}

/// Terminal prompt backed by `inquire`
#[derive(Debug, Default)]
pub struct InquirePrompt;

impl Prompt for InquirePrompt {
    fn show(&mut self, text: &str) {
        println!("{text}");
    }

    fn ask(&mut self, message: &str) -> Result<String, AppError> {
        Ok(Text::new(message).prompt()?)
    }

    fn reject(&mut self, reason: &str) {
        println!("{}", reason.red());
    }
}

/// What the user asked for on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// No profile given, ask
    Interactive,
    /// Next profile after the recorded one
    Rotate,
    /// A profile by name
    Named(String),
}

impl Request {
    pub fn from_arg(profile: Option<&str>) -> Self {
        match profile {
            None => Request::Interactive,
            Some(AUTO) => Request::Rotate,
            Some(name) => Request::Named(name.to_string()),
        }
    }
}

/// Turns a request into a profile name. Never touches the filesystem.
///
/// # Arguments
/// * `request` - What was asked for
/// * `lock` - Profile recorded by the last activation
/// * `registry` - Configured profiles
/// * `prompt` - Answers for interactive mode
pub fn resolve<P>(
    request: &Request,
    lock: Option<&str>,
    registry: &Registry,
    prompt: &mut P,
) -> Result<String, AppError>
where
    P: Prompt + ?Sized,
{
    if registry.is_empty() {
        return Err(AppError::NoProfiles);
    }

    match request {
        Request::Interactive => ask_profile(registry, prompt),
        Request::Rotate => next_profile(registry, lock),
        Request::Named(name) => {
            profile::find(registry, name)?;
            Ok(name.clone())
        }
    }
}

/// Returns the profile after `current` in name order, wrapping around.
/// Unknown or absent `current` selects the first profile.
pub fn next_profile(registry: &Registry, current: Option<&str>) -> Result<String, AppError> {
    let names: Vec<&String> = registry.keys().collect();
    let first: &String = names.first().copied().ok_or(AppError::NoProfiles)?;

    let next = current
        .and_then(|current| names.iter().position(|name| name.as_str() == current))
        .map(|idx| names[(idx + 1) % names.len()])
        .unwrap_or(first);
    Ok(next.to_string())
}

/// Renders the numbered profile menu
pub fn render_menu(registry: &Registry) -> String {
    let mut menu = format!("{}", "available SSH profiles:".blue());
    for (idx, (name, profile)) in registry.iter().enumerate() {
        let folder = profile
            .key_folder()
            .map(|folder| folder.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        menu.push_str(&format!("\n  {}) {name}  (folder: {folder})", idx + 1));
    }
    menu
}

fn ask_profile<P>(registry: &Registry, prompt: &mut P) -> Result<String, AppError>
where
    P: Prompt + ?Sized,
{
    let names: Vec<&str> = registry.keys().map(String::as_str).collect();
    prompt.show(&render_menu(registry));

    let selected: String = prompt_until_valid(
        prompt,
        &format!("{}", "select profile by number or name:".blue()),
        |input| validate_selection(input, &names),
    )?;
    log::debug!("interactively selected profile '{selected}'");
    prompt.show(&format!("{} {selected}", "selected profile:".green()));
    Ok(selected)
}
