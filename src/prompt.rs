use dialoguer::{Input, theme::ColorfulTheme};

use crate::authors::validate_name;
use crate::email::validate_email;

/// Abstraction over a string input prompt.
///
/// Implementors define how string input is collected from the user,
/// including any styling or interactivity. Tests substitute a mock.
pub trait StringPrompter {
    /// Prompt the user for a string input.
    ///
    /// # Parameters
    /// - `prompt`: The message shown to the user.
    /// - `default`: Pre-filled value, if any.
    ///
    /// # Returns
    /// `Ok(String)` if input is successfully collected, or an `Err(String)` describing the failure.
    fn prompt(&mut self, prompt: &str, default: Option<&str>) -> Result<String, String>;
}

/// Default implementation of `StringPrompter` using `dialoguer::Input`.
///
/// Uses the `ColorfulTheme` for user-friendly styling.
pub struct DialoguerStringPrompter;

impl StringPrompter for DialoguerStringPrompter {
    fn prompt(&mut self, prompt: &str, default: Option<&str>) -> Result<String, String> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
        if let Some(d) = default {
            input = input.default(d.to_string());
        }
        input.interact_text().map_err(|e| e.to_string())
    }
}

/// Prompt for one field of a co-author entry, e.g. `"Name for jd"`.
///
/// Surrounding whitespace is trimmed; an empty answer is an error.
pub fn ask<P: StringPrompter>(
    prompter: &mut P,
    label: &str,
    initials: &str,
    default_value: Option<&str>,
) -> Result<String, String> {
    let prompt = format!("{} for {}", label, initials);
    let answer = prompter.prompt(&prompt, default_value)?;
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        Err(format!("{} must not be empty", label))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Prompt for `label` until `is_valid` accepts the answer.
///
/// Each rejected answer prints `warning` in yellow. Gives up after
/// `attempts` invalid answers and returns the last one so the caller can
/// report it.
fn ask_until<P, F>(
    prompter: &mut P,
    label: &str,
    initials: &str,
    attempts: usize,
    is_valid: F,
    warning: &str,
) -> Result<String, String>
where
    P: StringPrompter,
    F: Fn(&str) -> bool,
{
    let mut last = String::new();
    for _ in 0..attempts.max(1) {
        last = ask(prompter, label, initials, None)?;
        if is_valid(&last) {
            break;
        }
        eprintln!("{}", console::style(warning).for_stderr().yellow());
    }
    Ok(last)
}

/// Prompt for a co-author name, re-asking while it contains angle brackets
/// or control characters.
pub fn ask_name<P: StringPrompter>(
    prompter: &mut P,
    initials: &str,
    attempts: usize,
) -> Result<String, String> {
    ask_until(prompter, "Name", initials, attempts, validate_name, "Invalid Name")
}

/// Prompt for an email address, re-asking until it passes validation.
///
/// # Parameters
/// - `prompter`: Source of answers.
/// - `initials`: Shown in the prompt, e.g. `"Email for jd"`.
/// - `attempts`: Invalid answers tolerated before giving up.
///
/// # Returns
/// The first valid answer, or the last invalid one once `attempts` run out.
pub fn ask_email<P: StringPrompter>(
    prompter: &mut P,
    initials: &str,
    attempts: usize,
) -> Result<String, String> {
    ask_until(
        prompter,
        "Email",
        initials,
        attempts,
        validate_email,
        "Invalid Email Format",
    )
}
