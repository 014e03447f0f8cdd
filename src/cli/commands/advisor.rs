use crate::advisor::{Conversation, Role};
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "ask",
        "Ask the AI advisor about your spending (no question shows the chat)",
        "ask [question...]",
        cmd_ask,
    )]
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Advisor => "Advisor",
    }
}

fn cmd_ask(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let currency = context.currency().clone();
    let question = args.join(" ");

    let ShellContext {
        conversation,
        advisor,
        manager,
        ..
    } = context;
    let conversation = conversation.get_or_insert_with(|| Conversation::new(currency));

    if question.trim().is_empty() {
        output_section("Advisor");
        for message in conversation.messages() {
            output::plain(format!("{}: {}", speaker(message.role), message.content));
        }
        return Ok(());
    }

    if advisor.is_configured() {
        io::print_info(format!("Asking {}...", advisor.model()));
    }
    if let Some(reply) = conversation.ask(advisor, &manager.ledger().transactions, &question) {
        output::plain(format!("{}: {}", speaker(reply.role), reply.content));
    }
    Ok(())
}
