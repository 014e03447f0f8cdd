use std::path::PathBuf;

use crate::cli::args::{ArgSpec, ParsedArgs};
use crate::cli::core::{
    parse_amount, parse_date, short_id, CommandError, CommandResult, ShellContext,
};
use crate::cli::forms::transaction_form;
use crate::cli::io;
use crate::cli::output::{self, money, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::{Table, TableColumn};
use crate::core::services::{ExportService, KindFilter, SummaryService, TransactionFilter, TransactionService};
use crate::currency::{format_currency, CurrencyCode};
use crate::ledger::{Transaction, TransactionDraft, TransactionKind};

const DEFAULT_EXPORT_FILE: &str = "beigeledger_export.csv";

const FILTER_OPTIONS: &[&str] = &["search", "type", "category"];
const LIST_SPEC: ArgSpec = ArgSpec::new(&["search", "type", "category", "page"], &[]);
const EXPORT_SPEC: ArgSpec = ArgSpec::new(FILTER_OPTIONS, &[]);
const ADD_SPEC: ArgSpec = ArgSpec::new(
    &["currency", "category", "merchant", "method", "date", "notes"],
    &[],
);
const EDIT_SPEC: ArgSpec = ArgSpec::new(
    &["type", "amount", "currency", "category", "merchant", "method", "date", "notes"],
    &[],
);
const DELETE_SPEC: ArgSpec = ArgSpec::new(&[], &["yes"]);

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "transactions",
            "List transactions with search, filters and paging",
            "transactions [--search TEXT] [--type all|income|expense] [--category NAME] [--page N]",
            cmd_list,
        )
        .with_aliases(&["ls"]),
        CommandEntry::new(
            "add",
            "Record an income or expense (no arguments opens the form)",
            "add [income|expense] [amount] [--currency C] [--category NAME] [--merchant NAME] [--method M] [--date YYYY-MM-DD] [--notes TEXT]",
            cmd_add,
        ),
        CommandEntry::new(
            "edit",
            "Change a transaction (only an id opens the form)",
            "edit <id> [--type T] [--amount A] [--currency C] [--category NAME] [--merchant NAME] [--method M] [--date YYYY-MM-DD] [--notes TEXT]",
            cmd_edit,
        ),
        CommandEntry::new(
            "delete",
            "Delete a transaction",
            "delete <id> [--yes]",
            cmd_delete,
        )
        .with_aliases(&["rm"]),
        CommandEntry::new("show", "Show every field of a transaction", "show <id>", cmd_show),
        CommandEntry::new(
            "export",
            "Write the filtered transaction list to a CSV file",
            "export [file.csv] [--search TEXT] [--type T] [--category NAME]",
            cmd_export,
        ),
    ]
}

fn filter_from(parsed: &ParsedArgs) -> Result<TransactionFilter, CommandError> {
    let kind = match parsed.option("type") {
        Some(raw) => raw.parse::<KindFilter>().map_err(CommandError::InvalidArguments)?,
        None => KindFilter::All,
    };
    let category = parsed
        .option("category")
        .filter(|name| !name.eq_ignore_ascii_case("all"))
        .map(str::to_string);
    Ok(TransactionFilter {
        search: parsed.option("search").map(str::to_string),
        kind,
        category,
    })
}

/// `+$12.00` / `-€3.50` in the record's own currency.
fn signed_amount(txn: &Transaction) -> String {
    let sign = if txn.is_income() { '+' } else { '-' };
    format!("{}{}", sign, format_currency(txn.amount, txn.currency.as_str()))
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &LIST_SPEC)?;
    let filter = filter_from(&parsed)?;
    let requested = parsed.parsed::<usize>("page")?.unwrap_or(1);

    let transactions = &context.manager.ledger().transactions;
    let matching = TransactionService::filter(transactions, &filter);
    let page = TransactionService::paginate(matching, requested, context.config.effective_page_size());

    output_section("Transactions");
    if page.items.is_empty() {
        io::print_info("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("ID"),
        TableColumn::left("Date"),
        TableColumn::left("Merchant").max(24),
        TableColumn::left("Category").max(20),
        TableColumn::left("Method").max(14),
        TableColumn::right("Amount"),
    ]);
    for txn in &page.items {
        table.push_row(vec![
            short_id(&txn.id).to_string(),
            txn.date.format("%Y-%m-%d").to_string(),
            txn.merchant.clone(),
            txn.category.clone(),
            txn.payment_method.clone(),
            money(&signed_amount(txn), txn.is_income()),
        ]);
    }
    output::plain(table.render());
    output::plain(format!(
        "Page {} of {} ({} matching)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    ));
    if page.has_next() {
        io::print_hint(format!("Next page: `transactions --page {}`", page.page + 1));
    }
    Ok(())
}

/// Applies the field options shared by `add` and `edit` onto `draft`.
fn apply_field_options(mut draft: TransactionDraft, parsed: &ParsedArgs) -> Result<TransactionDraft, CommandError> {
    if let Some(currency) = parsed.option("currency") {
        let code = CurrencyCode::new(currency);
        if code.is_empty() {
            return Err(CommandError::InvalidArguments("currency cannot be empty".into()));
        }
        if !code.is_known() {
            io::print_warning(format!(
                "Currency `{}` has no exchange rate; it will be treated as USD in totals.",
                code
            ));
        }
        draft = draft.with_currency(code);
    }
    if let Some(category) = parsed.option("category") {
        draft = draft.with_category(category);
    }
    if let Some(merchant) = parsed.option("merchant") {
        draft = draft.with_merchant(merchant);
    }
    if let Some(method) = parsed.option("method") {
        draft = draft.with_payment_method(method);
    }
    if let Some(date) = parsed.option("date") {
        draft = draft.with_date(parse_date(date)?);
    }
    if let Some(notes) = parsed.option("notes") {
        draft = draft.with_notes(notes);
    }
    Ok(draft)
}

fn parse_kind(raw: &str) -> Result<TransactionKind, CommandError> {
    raw.parse::<TransactionKind>()
        .map_err(CommandError::InvalidArguments)
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &ADD_SPEC)?;
    let kind_hint = parsed.positional.first().map(|raw| parse_kind(raw)).transpose()?;

    let draft = if parsed.positional.len() < 2 && !parsed.has_options() && context.is_interactive() {
        transaction_form(context, None, kind_hint)?
    } else {
        let kind = kind_hint
            .ok_or_else(|| CommandError::InvalidArguments("missing transaction type (income or expense)".into()))?;
        let amount = parse_amount(parsed.require_positional(1, "amount")?)?;
        if parsed.positional.len() > 2 {
            return Err(CommandError::InvalidArguments(format!(
                "unexpected argument `{}`",
                parsed.positional[2]
            )));
        }
        apply_field_options(TransactionDraft::new(kind, amount), &parsed)?
    };

    let id = context.manager.add_transaction(draft)?;
    if let Some(txn) = context.manager.ledger().transaction(&id) {
        io::print_success(format!(
            "Added {} {} at {} ({}).",
            txn.kind,
            signed_amount(txn),
            txn.merchant,
            short_id(&txn.id)
        ));
    }
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &EDIT_SPEC)?;
    let id = context.resolve_transaction_id(parsed.require_positional(0, "transaction id")?)?;
    let existing = TransactionService::get(context.manager.ledger(), &id)?.clone();

    let draft = if !parsed.has_options() {
        if !context.is_interactive() {
            return Err(CommandError::InvalidArguments(
                "nothing to change; pass at least one field option".into(),
            ));
        }
        transaction_form(context, Some(&existing), None)?
    } else {
        let mut draft = TransactionDraft::from_transaction(&existing);
        if let Some(kind) = parsed.option("type") {
            let kind = parse_kind(kind)?;
            if kind != draft.kind && parsed.option("category").is_none() {
                draft.category = None;
            }
            draft.kind = kind;
        }
        if let Some(amount) = parsed.option("amount") {
            draft.amount = parse_amount(amount)?;
        }
        apply_field_options(draft, &parsed)?
    };

    context.manager.update_transaction(&id, draft)?;
    io::print_success(format!("Updated transaction {}.", short_id(&id)));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &DELETE_SPEC)?;
    let id = context.resolve_transaction_id(parsed.require_positional(0, "transaction id")?)?;
    if !context.confirm("Are you sure you want to delete this transaction?", parsed.flag("yes"))? {
        io::print_info("Nothing deleted.");
        return Ok(());
    }
    let removed = context.manager.delete_transaction(&id)?;
    io::print_success(format!(
        "Deleted {} {} at {}.",
        removed.kind,
        signed_amount(&removed),
        removed.merchant
    ));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &ArgSpec::new(&[], &[]))?;
    let id = context.resolve_transaction_id(parsed.require_positional(0, "transaction id")?)?;
    let txn = TransactionService::get(context.manager.ledger(), &id)?;

    output_section(format!("Transaction {}", short_id(&txn.id)));
    let mut rows = vec![
        ("ID", txn.id.clone()),
        ("Date", txn.date.format("%Y-%m-%d").to_string()),
        ("Type", txn.kind.to_string()),
        ("Amount", money(&signed_amount(txn), txn.is_income())),
    ];
    if txn.currency != *context.currency() {
        let converted = SummaryService::converted(txn, context.currency());
        rows.push(("Converted", context.money(converted)));
    }
    rows.extend([
        ("Category", txn.category.clone()),
        ("Merchant", txn.merchant.clone()),
        ("Payment", txn.payment_method.clone()),
        ("Notes", txn.notes_or_empty().to_string()),
    ]);
    for (label, value) in rows {
        output::plain(format!("  {:<10} {}", label, value));
    }
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &EXPORT_SPEC)?;
    let filter = filter_from(&parsed)?;
    let path = parsed
        .positional
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));

    let matching = TransactionService::filter(&context.manager.ledger().transactions, &filter);
    let written = ExportService::export_to_path(&path, &matching)?;
    tracing::info!(path = %path.display(), rows = written, "exported transactions");
    io::print_success(format!("Exported {} transactions to {}.", written, path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::script_context;

    #[test]
    fn filters_parse_from_options() {
        let parsed = ParsedArgs::parse(&["--type", "income", "--category", "all", "--search", "rent"], &LIST_SPEC).unwrap();
        let filter = filter_from(&parsed).unwrap();
        assert_eq!(filter.kind, KindFilter::Only(TransactionKind::Income));
        assert_eq!(filter.category, None);
        assert_eq!(filter.search.as_deref(), Some("rent"));

        let bad = ParsedArgs::parse(&["--type", "transfer"], &LIST_SPEC).unwrap();
        assert!(filter_from(&bad).is_err());
    }

    #[test]
    fn edit_switching_type_resets_category() {
        let mut context = script_context();
        cmd_add(&mut context, &["expense", "20", "--category", "Housing"]).unwrap();
        let id = context.manager.ledger().transactions[0].id.clone();
        cmd_edit(&mut context, &[&id, "--type", "income"]).unwrap();
        let txn = context.manager.ledger().transaction(&id).unwrap();
        assert_eq!(txn.kind, TransactionKind::Income);
        assert_eq!(txn.category, "Other Income");
        assert_eq!(txn.amount, 20.0);
    }

    #[test]
    fn export_writes_filtered_rows() {
        let mut context = script_context();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        cmd_add(&mut context, &["income", "10", "--merchant", "Zebra Ltd", "--notes", "a, \"quoted\" note"]).unwrap();
        let path_arg = path.to_string_lossy().to_string();
        cmd_export(&mut context, &[&path_arg, "--search", "zebra"]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "Date,Type,Amount,Currency,Category,Merchant,Payment Method,Notes");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(",income,10,USD,Other Income,Zebra Ltd,Card,\"a, \"\"quoted\"\" note\""));
    }

    #[test]
    fn script_add_requires_type_and_amount() {
        let mut context = script_context();
        assert!(cmd_add(&mut context, &[]).is_err());
        assert!(cmd_add(&mut context, &["expense"]).is_err());
        assert!(cmd_add(&mut context, &["expense", "5", "extra"]).is_err());
    }
}
