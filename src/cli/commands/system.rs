use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::storage::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        )
        .with_aliases(&["h"]),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit).with_aliases(&["quit", "q"]),
    ]
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    let advisor_state = if context.advisor.is_configured() {
        "configured"
    } else {
        "no API key"
    };
    let rows = [
        ("Schema ver", format!("v{CURRENT_SCHEMA_VERSION}")),
        ("Build", format!("{} ({})", meta.git_hash, meta.git_status)),
        ("Built at", meta.timestamp.to_string()),
        ("Target", meta.target.to_string()),
        ("Profile", meta.profile.to_string()),
        ("Rustc", meta.rustc.to_string()),
        ("Advisor", format!("{} ({advisor_state})", context.advisor.model())),
    ];
    output_section(format!("BeigeLedger {}", meta.version));
    for (label, value) in rows {
        io::print_info(format!("  {label:<12} : {value}"));
    }
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(word) => match context.command(word) {
            Some(entry) => print_entry(entry),
            None => context.suggest_command(word),
        },
        None => print_overview(&context.registry),
    }
    Ok(())
}

fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    let width = registry.names().map(str::len).max().unwrap_or(0);
    for entry in registry.entries() {
        io::print_info(format!("  {:<width$}  {}", entry.name, entry.description));
    }
    io::print_info("Use `help <command>` for details.");
}

fn print_entry(entry: &CommandEntry) {
    output_section(format!("Help: {}", entry.name));
    io::print_info(format!("  {}", entry.description));
    io::print_info(format!("  Usage: {}", entry.usage));
    if !entry.aliases.is_empty() {
        io::print_info(format!("  Also: {}", entry.aliases.join(", ")));
    }
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
