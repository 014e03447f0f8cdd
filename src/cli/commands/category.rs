use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::{Table, TableColumn};
use crate::ledger::TransactionKind;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "categories",
            "List income and expense categories",
            "categories",
            cmd_categories,
        ),
        CommandEntry::new(
            "category",
            "Add or remove a category",
            "category add <name...> <income|expense> | category remove <id>",
            cmd_category,
        ),
    ]
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let ledger = context.manager.ledger();
    for kind in [TransactionKind::Expense, TransactionKind::Income] {
        let title = match kind {
            TransactionKind::Expense => "Expense categories",
            TransactionKind::Income => "Income categories",
        };
        output_section(title);
        let categories = ledger.categories_for(kind);
        if categories.is_empty() {
            io::print_info("  None.");
            continue;
        }
        let mut table = Table::new(vec![
            TableColumn::left("ID"),
            TableColumn::left("Name").max(32),
            TableColumn::right("Used by"),
        ]);
        for category in categories {
            let used = ledger
                .transactions
                .iter()
                .filter(|txn| txn.kind == kind && txn.category == category.name)
                .count();
            table.push_row(vec![
                short_id(&category.id).to_string(),
                category.name.clone(),
                used.to_string(),
            ]);
        }
        output::plain(table.render());
    }

    let dangling = ledger.dangling_categories();
    if !dangling.is_empty() {
        io::print_hint(format!(
            "Transactions also use categories that no longer exist: {}",
            dangling.join(", ")
        ));
    }
    Ok(())
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: category add <name...> <income|expense> | category remove <id>".into(),
        ));
    };
    match action.to_ascii_lowercase().as_str() {
        "add" => add_category(context, rest),
        "remove" | "delete" => remove_category(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown category action `{}` (expected add or remove)",
            other
        ))),
    }
}

/// The last word is the kind; everything before it is the name, so
/// multi-word names work without quoting.
fn add_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((kind, name_parts)) = args.split_last() else {
        return Err(CommandError::InvalidArguments(
            "usage: category add <name...> <income|expense>".into(),
        ));
    };
    let kind = kind
        .parse::<TransactionKind>()
        .map_err(CommandError::InvalidArguments)?;
    let name = name_parts.join(" ");
    let category = context.manager.add_category(&name, kind)?;
    io::print_success(format!(
        "Added {} category `{}` ({}).",
        category.kind,
        category.name,
        short_id(&category.id)
    ));
    Ok(())
}

fn remove_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: category remove <id>".into())
    })?;
    let id = context.resolve_category_id(reference)?;
    let removed = context.manager.remove_category(&id)?;
    io::print_success(format!("Removed category `{}`.", removed.name));
    let still_used = context
        .manager
        .ledger()
        .transactions
        .iter()
        .filter(|txn| txn.category == removed.name)
        .count();
    if still_used > 0 {
        io::print_info(format!(
            "{} transactions keep the name `{}`.",
            still_used, removed.name
        ));
    }
    Ok(())
}
