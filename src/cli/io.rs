use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::cli::core::CommandError;
use crate::cli::output;

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

pub fn print_hint(message: impl fmt::Display) {
    output::hint(message);
}

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Free-form text, prefilled with `initial` when editing. Empty input is
/// allowed and returned as an empty string.
pub fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    initial: Option<&str>,
) -> Result<String, CommandError> {
    let mut input = Input::<String>::with_theme(theme);
    input = input.with_prompt(prompt).allow_empty(true);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    input
        .interact_text()
        .map(|value| value.trim().to_string())
        .map_err(CommandError::from)
}

/// Text input re-asked until `parse` accepts it.
pub fn prompt_parsed<T>(
    theme: &ColorfulTheme,
    prompt: &str,
    initial: Option<&str>,
    parse: impl Fn(&str) -> Result<T, CommandError>,
) -> Result<T, CommandError> {
    loop {
        let raw = prompt_text(theme, prompt, initial)?;
        match parse(&raw) {
            Ok(value) => return Ok(value),
            Err(CommandError::InvalidArguments(message)) => print_warning(message),
            Err(other) => return Err(other),
        }
    }
}

/// Pick one of `items`; returns its index.
pub fn select_index<T: ToString>(
    theme: &ColorfulTheme,
    prompt: &str,
    items: &[T],
    default: usize,
) -> Result<usize, CommandError> {
    Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(default.min(items.len().saturating_sub(1)))
        .interact()
        .map_err(CommandError::from)
}
