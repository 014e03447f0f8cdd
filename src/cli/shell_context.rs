use dialoguer::theme::ColorfulTheme;

use crate::{
    advisor::{Advisor, Conversation},
    config::Config,
    core::LedgerManager,
    currency::CurrencyCode,
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// State shared by every command handler for the lifetime of the shell.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: LedgerManager,
    pub config: Config,
    pub advisor: Advisor,
    /// Advisor chat, started on the first `ask`. Reset when the display
    /// currency changes so the greeting stays accurate.
    pub conversation: Option<Conversation>,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn currency(&self) -> &CurrencyCode {
        &self.manager.settings().currency
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, transactions: {} }}",
            self.running,
            self.last_command,
            self.manager.ledger().transactions.len()
        )
    }
}
