use crate::cli::args::{ArgSpec, ParsedArgs};
use crate::cli::commands::dashboard::month_argument;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, alert, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::{scaled_bar, Table, TableColumn};
use crate::core::services::{SummaryService, HIGH_SPENDING_THRESHOLD};

const BAR_WIDTH: usize = 30;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "report",
        "Daily spending and full category breakdown for a month",
        "report [YYYY-MM]",
        cmd_report,
    )]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &ArgSpec::new(&[], &[]))?;
    let month = month_argument(context, &parsed)?;
    let currency = context.currency().clone();
    let transactions = &context.manager.ledger().transactions;
    let report = SummaryService::daily_spending(transactions, month, &currency);

    output_section(format!("Daily spending: {} {}", month.label(), month.year()));
    let peak = report.peak().map(|day| day.amount).unwrap_or(0.0);
    for day in &report.days {
        let bar = scaled_bar(day.amount, peak, BAR_WIDTH);
        let line = format!("  {:>2}  {:>14}  {}", day.day, context.money(day.amount), bar);
        if day.is_high_spending() {
            output::plain(format!("{} {}", alert(&line), alert("*")));
        } else {
            output::plain(line);
        }
    }
    output::plain(format!("  Total: {}", context.money(report.total())));
    if let Some(peak) = report.peak() {
        output::plain(format!(
            "  Highest day: {} ({})",
            peak.day,
            context.money(peak.amount)
        ));
    }
    io::print_info(format!(
        "  * marks days above {} in spending.",
        context.money(HIGH_SPENDING_THRESHOLD)
    ));

    output_section("Expenses by category");
    let categories = SummaryService::category_breakdown(transactions, month, &currency);
    if categories.is_empty() {
        io::print_info("  No expenses recorded for this month.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Category").max(32),
        TableColumn::right("Amount"),
    ]);
    for entry in &categories {
        table.push_row(vec![entry.name.clone(), context.money(entry.amount)]);
    }
    output::plain(table.render());
    Ok(())
}
