//! Command table the shell dispatches through.

use crate::cli::core::CommandResult;
use crate::cli::shell_context::ShellContext;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// A shell command. Any alias reaches the same handler as the name.
pub struct CommandEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            aliases: &[],
            description,
            usage,
            handler,
        }
    }

    pub fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    /// Name followed by aliases.
    pub fn spellings(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    fn answers_to(&self, word: &str) -> bool {
        self.spellings().any(|spelling| spelling.eq_ignore_ascii_case(word))
    }
}

/// Commands in the order they were registered.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`. An entry with the same name is replaced where it stands.
    /// Aliases already taken by another command are dropped from `entry`.
    pub fn register(&mut self, mut entry: CommandEntry) {
        if let Some(slot) = self.entries.iter_mut().find(|e| e.name == entry.name) {
            *slot = entry;
            return;
        }
        if entry.aliases.iter().any(|alias| self.resolve(alias).is_some()) {
            tracing::warn!(
                command = entry.name,
                "alias clashes with an existing command; aliases ignored"
            );
            entry.aliases = &[];
        }
        self.entries.push(entry);
    }

    /// Entry answering to `word` by name or alias, ignoring ASCII case.
    pub fn resolve(&self, word: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.answers_to(word))
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Primary command names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Every word the dispatcher accepts, aliases included.
    pub fn words(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .flat_map(|entry| entry.spellings())
            .collect()
    }
}
