use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
    Plain,
}

/// Global output switches. Script mode turns on `plain_mode` so piped output
/// carries no escape codes.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    pub plain_mode: bool,
    pub quiet_mode: bool,
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

pub fn current_preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn should_skip(kind: MessageKind, prefs: &OutputPreferences) -> bool {
    prefs.quiet_mode && matches!(kind, MessageKind::Info | MessageKind::Hint)
}

fn icon(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Hint => "[?]",
        MessageKind::Info | MessageKind::Section | MessageKind::Plain => "",
    }
}

pub fn format_message(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Info | MessageKind::Plain => text,
        _ => format!("{} {}", icon(kind), text),
    };

    if prefs.plain_mode {
        return formatted;
    }

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info | MessageKind::Plain => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = current_preferences();
    if should_skip(kind, &prefs) {
        return;
    }
    let formatted = format_message(kind, message, &prefs);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Unstyled line, never suppressed. Used for tables and advisor replies.
pub fn plain(message: impl fmt::Display) {
    print(MessageKind::Plain, message);
}

/// Emphasis for amounts: green for income, default otherwise.
pub fn money(text: &str, positive: bool) -> String {
    if current_preferences().plain_mode || !positive {
        text.to_string()
    } else {
        text.green().to_string()
    }
}

/// Highlight used for over-budget and high-spending markers.
pub fn alert(text: &str) -> String {
    if current_preferences().plain_mode {
        text.to_string()
    } else {
        text.bright_red().bold().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_mode_has_no_escape_codes() {
        let prefs = OutputPreferences {
            plain_mode: true,
            quiet_mode: false,
        };
        assert_eq!(format_message(MessageKind::Error, "boom", &prefs), "[x] boom");
        assert_eq!(format_message(MessageKind::Section, " Dashboard ", &prefs), "=== Dashboard ===");
        assert_eq!(format_message(MessageKind::Info, "note", &prefs), "note");
    }

    #[test]
    fn quiet_mode_hides_info_only() {
        let prefs = OutputPreferences {
            plain_mode: true,
            quiet_mode: true,
        };
        assert!(should_skip(MessageKind::Info, &prefs));
        assert!(!should_skip(MessageKind::Error, &prefs));
        assert!(!should_skip(MessageKind::Plain, &prefs));
    }
}
