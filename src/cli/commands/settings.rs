use crate::cli::args::{ArgSpec, ParsedArgs};
use crate::cli::core::{parse_amount, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::{Table, TableColumn};
use crate::core::services::SettingsUpdate;
use crate::currency::{format_number, rate_for, CurrencyCode, CURRENCIES};

const SETTINGS_SPEC: ArgSpec = ArgSpec::new(&["currency", "budget"], &[]);
const CLEAR_SPEC: ArgSpec = ArgSpec::new(&[], &["yes"]);

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "settings",
            "Show or change the display currency and monthly budget",
            "settings [--currency CODE] [--budget AMOUNT]",
            cmd_settings,
        ),
        CommandEntry::new(
            "currencies",
            "List supported currencies and their USD rates",
            "currencies",
            cmd_currencies,
        ),
        CommandEntry::new(
            "clear",
            "Delete all data and start over with demo data",
            "clear [--yes]",
            cmd_clear,
        ),
    ]
}

fn print_settings(context: &ShellContext) {
    let settings = context.manager.settings();
    output_section("Settings");
    let currency_name = crate::currency::lookup(settings.currency.as_str())
        .map(|info| info.name)
        .unwrap_or("unknown, converted 1:1 with USD");
    output::plain(format!(
        "  Display currency  {} ({})",
        settings.currency, currency_name
    ));
    output::plain(format!(
        "  Monthly budget    {}",
        context.money(settings.monthly_budget)
    ));
    output::plain(format!(
        "  Storage           {}",
        context.manager.repository().store().describe()
    ));
}

fn cmd_settings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &SETTINGS_SPEC)?;
    if let Some(extra) = parsed.positional.first() {
        return Err(CommandError::InvalidArguments(format!(
            "unexpected argument `{}`",
            extra
        )));
    }

    let update = SettingsUpdate {
        currency: parsed.option("currency").map(CurrencyCode::new),
        monthly_budget: parsed.option("budget").map(parse_amount).transpose()?,
    };
    if update.is_empty() {
        print_settings(context);
        io::print_hint("Change with `settings --currency CODE --budget AMOUNT`.");
        return Ok(());
    }

    let previous = context.currency().clone();
    if let Some(code) = &update.currency {
        if !code.is_empty() && !code.is_known() {
            io::print_warning(format!(
                "Currency `{}` has no exchange rate; totals will treat it as USD.",
                code
            ));
        }
    }
    context.manager.update_settings(update)?;
    if *context.currency() != previous {
        context.conversation = None;
    }
    io::print_success("Settings saved.");
    print_settings(context);
    Ok(())
}

fn cmd_currencies(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Currencies");
    let mut table = Table::new(vec![
        TableColumn::left("Code"),
        TableColumn::left("Name").max(30),
        TableColumn::left("Symbol"),
        TableColumn::right("Per USD"),
    ]);
    for info in CURRENCIES {
        let marker = if info.code == context.currency().as_str() {
            format!("{} *", info.code)
        } else {
            info.code.to_string()
        };
        table.push_row(vec![
            marker,
            info.name.to_string(),
            info.symbol.to_string(),
            format_number(rate_for(info.code), 2),
        ]);
    }
    output::plain(table.render());
    io::print_info("Currencies without a listed rate convert 1:1 with USD.");
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &CLEAR_SPEC)?;
    if !context.confirm("Are you sure? This deletes all transactions, categories and settings.", parsed.flag("yes"))? {
        io::print_info("Nothing cleared.");
        return Ok(());
    }
    context.manager.clear_data()?;
    context.conversation = None;
    tracing::warn!("all ledger data cleared");
    io::print_success(format!(
        "All data cleared. Started over with {} demo transactions.",
        context.manager.ledger().transactions.len()
    ));
    Ok(())
}
