//! Core CLI loop, dispatch, and shell context helpers.

use std::{io, sync::Arc};

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::{
    advisor::Advisor,
    config::{Config, ConfigManager},
    core::{
        services::{MonthKey, ServiceError},
        LedgerManager, LedgerRepository, LoadOrigin, LoadReport, SystemClock,
    },
    currency::format_currency,
    errors::LedgerError,
    storage::JsonFileStore,
};

pub use crate::cli::shell_context::{CliMode, ShellContext};
pub use crate::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    /// Opens the configured data directory and loads the ledger.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        if mode == CliMode::Script {
            colored::control::set_override(false);
            output::set_preferences(OutputPreferences {
                plain_mode: true,
                quiet_mode: false,
            });
        }

        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let store = JsonFileStore::new(config_manager.data_dir(&config))?;
        tracing::debug!(store = %store.dir().display(), "opening ledger store");
        let repository = LedgerRepository::new(Box::new(store), Arc::new(SystemClock));
        let manager = LedgerManager::open(repository)?;
        let advisor = Advisor::from_config(&config);

        let context = Self::with_parts(mode, manager, config, advisor);
        context.report_load(context.manager.load_reports());
        Ok(context)
    }

    /// Assembles a context from already-built parts.
    pub fn with_parts(mode: CliMode, manager: LedgerManager, config: Config, advisor: Advisor) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        ShellContext {
            mode,
            registry,
            manager,
            config,
            advisor,
            conversation: None,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        }
    }

    pub(crate) fn report_load(&self, reports: &[LoadReport]) {
        for report in reports {
            for note in &report.migrations {
                cli_io::print_info(format!("Migration ({}): {}", report.key, note));
            }
            for warning in &report.warnings {
                cli_io::print_warning(warning);
            }
            match report.origin {
                LoadOrigin::Recovered => cli_io::print_warning(format!(
                    "Stored {} could not be read and were reset to defaults.",
                    report.key
                )),
                LoadOrigin::Defaulted => {
                    tracing::info!(key = report.key, "initialised with default data")
                }
                LoadOrigin::Stored => {}
            }
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.resolve(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = crate::cli::shell::parse_command_line(line)?;
        let Some((word, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.dispatch(&word.to_lowercase(), word, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .words()
            .into_iter()
            .map(|word| (levenshtein(word, &needle), word))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit BeigeLedger?", true)
            .map_err(|err| CliError::Command(err.to_string()))
    }

    /// Asks before a destructive action. Script mode never prompts; it
    /// needs `--yes` instead.
    pub(crate) fn confirm(&self, prompt: &str, assume_yes: bool) -> Result<bool, CommandError> {
        if assume_yes {
            return Ok(true);
        }
        if self.mode == CliMode::Script {
            return Err(CommandError::InvalidArguments(format!(
                "{} Pass `--yes` to confirm in script mode.",
                prompt
            )));
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Ledger(inner) => {
                tracing::error!(error = %inner, "command failed");
                cli_io::print_error(format!("Could not save your changes: {}", inner));
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn prompt(&self) -> String {
        format!("beige_ledger ({})> ", self.currency())
    }

    /// Names and aliases, for completion.
    pub(crate) fn command_words(&self) -> Vec<&'static str> {
        self.registry.words()
    }

    pub(crate) fn command(&self, word: &str) -> Option<&CommandEntry> {
        self.registry.resolve(word)
    }

    /// Formats `amount` in the display currency.
    pub(crate) fn money(&self, amount: f64) -> String {
        format_currency(amount, self.currency().as_str())
    }

    /// Full transaction id for an exact id or a unique prefix of one.
    pub(crate) fn resolve_transaction_id(&self, reference: &str) -> Result<String, CommandError> {
        let ids = self
            .manager
            .ledger()
            .transactions
            .iter()
            .map(|txn| txn.id.as_str());
        resolve_id(reference, ids, "Transaction")
    }

    pub(crate) fn resolve_category_id(&self, reference: &str) -> Result<String, CommandError> {
        let ids = self
            .manager
            .ledger()
            .categories
            .iter()
            .map(|category| category.id.as_str());
        resolve_id(reference, ids, "Category")
    }
}

fn resolve_id<'a>(
    reference: &str,
    ids: impl Iterator<Item = &'a str> + Clone,
    label: &str,
) -> Result<String, CommandError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "{} id cannot be empty",
            label
        )));
    }
    if let Some(exact) = ids.clone().find(|id| *id == reference) {
        return Ok(exact.to_string());
    }
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(reference)).collect();
    match matches.as_slice() {
        [single] => Ok((*single).to_string()),
        [] => Err(CommandError::NotFound(format!(
            "{} `{}` not found",
            label, reference
        ))),
        many => Err(CommandError::InvalidArguments(format!(
            "`{}` matches {} {} ids; type more characters",
            reference,
            many.len(),
            label.to_lowercase()
        ))),
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_month(input: &str) -> Result<MonthKey, CommandError> {
    input
        .parse::<MonthKey>()
        .map_err(CommandError::InvalidArguments)
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned = input.trim().replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid amount `{}` (expected a non-negative number)",
            input
        ))),
    }
}

/// First eight characters of an id, enough to address it in commands.
pub(crate) fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(idx, _)| &id[..idx])
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Ledger(err) => CommandError::Ledger(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
            ServiceError::NotFound(message) => CommandError::NotFound(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn script_context() -> ShellContext {
    use crate::core::FixedClock;
    use crate::storage::MemoryStore;

    let clock = Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
    ));
    let repository = LedgerRepository::new(Box::new(MemoryStore::new()), clock).with_demo_seed(11);
    let manager = LedgerManager::open(repository).expect("memory store opens");
    ShellContext::with_parts(
        CliMode::Script,
        manager,
        Config::default(),
        Advisor::unconfigured("test-model"),
    )
}
