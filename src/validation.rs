use std::path::{Component, Path};

use validator::ValidateEmail;

use crate::{error::AppError, profile::Registry, select::{Prompt, AUTO}};

/// Maximum length for a profile name
const MAX_PROFILE_NAME_LENGTH: usize = 30;
/// Maximum length for Git username
const MAX_USERNAME_LENGTH: usize = 100;
/// Maximum length for Git email address
const MAX_EMAIL_LENGTH: usize = 100;

/// Prompts user for input until valid input is provided
pub fn prompt_until_valid<P, T, F>(
    prompt: &mut P,
    prompt_message: &str,
    input_validation: F,
) -> Result<T, AppError>
where
    P: Prompt + ?Sized,
    F: Fn(&str) -> Result<T, AppError>,
{
    loop {
        let input: String = prompt.ask(prompt_message)?;
        match input_validation(&input) {
            Ok(value) => break Ok(value),
            Err(AppError::Validation(msg)) => prompt.reject(&msg),
            Err(e) => return Err(e),
        }
    }
}

/// Validates a menu answer given by number or by exact name
///
/// # Arguments
/// * `input` - Raw answer
/// * `names` - Profile names in menu order
pub fn validate_selection(input: &str, names: &[&str]) -> Result<String, AppError> {
    let choice: &str = input.trim();
    if choice.is_empty() {
        return Err(AppError::Validation("Please enter a value".to_string()));
    }

    if let Ok(number) = choice.parse::<usize>() {
        if (1..=names.len()).contains(&number) {
            return Ok(names[number - 1].to_string());
        }
    }

    if let Some(name) = names.iter().find(|name| **name == choice) {
        return Ok(name.to_string());
    }

    Err(AppError::Validation(
        "Invalid selection, please try again".to_string(),
    ))
}

// Schema checks for the profiles file

/// Validates every profile in the registry
pub fn validate_registry(registry: &Registry) -> Result<(), AppError> {
    for (name, profile) in registry {
        validate_profile_name(name)?;
        if let Some(git_name) = &profile.git_name {
            validate_git_name(name, git_name)?;
        }
        if let Some(git_email) = &profile.git_email {
            validate_git_email(name, git_email)?;
        }
        if let Some(folder) = &profile.folder {
            validate_folder(name, folder)?;
        }
    }
    Ok(())
}

/// Validates a profile name
fn validate_profile_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        Err(invalid("profile name cannot be empty".to_string()))
    } else if name.len() > MAX_PROFILE_NAME_LENGTH {
        Err(invalid(format!(
            "profile name '{name}' too long (max {MAX_PROFILE_NAME_LENGTH} characters)"
        )))
    } else if name.chars().any(char::is_whitespace) {
        Err(invalid(format!("profile name '{name}' cannot contain whitespace")))
    } else if name == AUTO {
        Err(invalid(format!("profile name cannot be '{AUTO}'")))
    } else {
        Ok(())
    }
}

/// Validates a Git username
fn validate_git_name(profile: &str, git_name: &str) -> Result<(), AppError> {
    if git_name.trim().is_empty() {
        Err(invalid(format!("profile '{profile}': git_name cannot be empty")))
    } else if git_name.len() > MAX_USERNAME_LENGTH {
        Err(invalid(format!(
            "profile '{profile}': git_name too long (max {MAX_USERNAME_LENGTH} characters)"
        )))
    } else {
        Ok(())
    }
}

/// Validates a Git email address
fn validate_git_email(profile: &str, git_email: &str) -> Result<(), AppError> {
    if git_email.len() > MAX_EMAIL_LENGTH {
        Err(invalid(format!(
            "profile '{profile}': git_email too long (max {MAX_EMAIL_LENGTH} characters)"
        )))
    } else if !git_email.validate_email() {
        Err(invalid(format!(
            "profile '{profile}': invalid git_email '{git_email}'"
        )))
    } else {
        Ok(())
    }
}

/// Validates a key folder, which must stay inside the credentials directory
fn validate_folder(profile: &str, folder: &Path) -> Result<(), AppError> {
    let escapes = folder
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        Err(invalid(format!(
            "profile '{profile}': folder '{}' must be a relative path inside the credentials directory",
            folder.display()
        )))
    } else {
        Ok(())
    }
}

fn invalid(msg: String) -> AppError {
    AppError::ConfigurationInvalid(msg)
}
