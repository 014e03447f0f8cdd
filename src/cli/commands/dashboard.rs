use crate::cli::args::{ArgSpec, ParsedArgs};
use crate::cli::core::{parse_month, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, alert, money, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::{progress_bar, scaled_bar, Table, TableColumn};
use crate::core::services::{MonthKey, SummaryService};

/// Categories listed under the breakdown.
const TOP_CATEGORIES: usize = 5;
const BAR_WIDTH: usize = 24;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "dashboard",
        "Monthly totals, budget progress and spending trend",
        "dashboard [YYYY-MM]",
        cmd_dashboard,
    )]
}

/// Month named by the first positional argument, or the current month.
pub(crate) fn month_argument(context: &ShellContext, parsed: &ParsedArgs) -> Result<MonthKey, CommandError> {
    match parsed.positional.first() {
        Some(raw) => parse_month(raw),
        None => Ok(MonthKey::of(context.manager.today())),
    }
}

fn cmd_dashboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &ArgSpec::new(&[], &[]))?;
    let month = month_argument(context, &parsed)?;
    let settings = context.manager.settings();
    let transactions = &context.manager.ledger().transactions;
    let summary = SummaryService::monthly_summary(
        transactions,
        month,
        &settings.currency,
        settings.monthly_budget,
    );

    output_section(format!("Dashboard: {} {}", month.label(), month.year()));
    output::plain(format!(
        "  Total income    {}",
        money(&context.money(summary.income), true)
    ));
    output::plain(format!("  Total expenses  {}", context.money(summary.expense)));
    output::plain(format!(
        "  Net balance     {}",
        money(&context.money(summary.balance), summary.balance >= 0.0)
    ));

    let budget = summary.budget;
    output_section("Monthly budget");
    if budget.budget > 0.0 {
        let bar = progress_bar(budget.display_percent, BAR_WIDTH);
        let bar = if budget.over_budget() { alert(&bar) } else { bar };
        output::plain(format!(
            "  {} {:.0}%  {} / {}",
            bar,
            budget.display_percent,
            context.money(budget.spent),
            context.money(budget.budget)
        ));
        if budget.over_budget() {
            output::plain(format!(
                "  {}",
                alert(&format!(
                    "Over budget by {} ({:.1}% used)",
                    context.money(budget.spent - budget.budget),
                    budget.ratio_percent
                ))
            ));
        }
    } else {
        io::print_info("  No monthly budget set. Use `settings --budget <amount>`.");
    }

    output_section("Expenses by category");
    if summary.categories.is_empty() {
        io::print_info("  No expenses recorded for this month.");
    } else {
        let mut table = Table::new(vec![
            TableColumn::left("Category").max(28),
            TableColumn::right("Amount"),
            TableColumn::right("Share"),
        ]);
        for entry in summary.categories.iter().take(TOP_CATEGORIES) {
            let share = if summary.expense > 0.0 {
                entry.amount / summary.expense * 100.0
            } else {
                0.0
            };
            table.push_row(vec![
                entry.name.clone(),
                context.money(entry.amount),
                format!("{:.1}%", share),
            ]);
        }
        output::plain(table.render());
        let hidden = summary.categories.len().saturating_sub(TOP_CATEGORIES);
        if hidden > 0 {
            io::print_info(format!("  ... and {} more. See `report` for the full list.", hidden));
        }
    }

    output_section("Spending trend");
    let trend = SummaryService::spending_trend(transactions, month, &settings.currency);
    let peak = trend
        .iter()
        .map(|point| point.rounded_expense())
        .fold(0.0_f64, f64::max);
    for point in &trend {
        output::plain(format!(
            "  {} {}  {:>14}  {}",
            point.label(),
            point.month.year(),
            context.money(point.rounded_expense()),
            scaled_bar(point.rounded_expense(), peak, BAR_WIDTH)
        ));
    }
    Ok(())
}
