//! Interactive add/edit form for transactions.

use chrono::NaiveDate;

use crate::cli::core::{parse_amount, parse_date, CommandError, ShellContext};
use crate::cli::io;
use crate::currency::{CurrencyCode, CURRENCIES};
use crate::ledger::{Ledger, Transaction, TransactionDraft, TransactionKind, DEFAULT_PAYMENT_METHOD};

pub const PAYMENT_METHODS: [&str; 4] = ["Card", "Cash", "UPI", "Bank Transfer"];

/// Values the form starts from: the record being edited, or blanks with
/// today's date and the display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefaults {
    pub kind: TransactionKind,
    pub amount: Option<f64>,
    pub date: NaiveDate,
    pub currency: CurrencyCode,
    pub category: Option<String>,
    pub payment_method: String,
    pub merchant: String,
    pub notes: String,
}

impl FormDefaults {
    pub fn for_new(kind: TransactionKind, today: NaiveDate, currency: &CurrencyCode) -> Self {
        Self {
            kind,
            amount: None,
            date: today,
            currency: currency.clone(),
            category: None,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            merchant: String::new(),
            notes: String::new(),
        }
    }

    pub fn for_edit(existing: &Transaction) -> Self {
        Self {
            kind: existing.kind,
            amount: Some(existing.amount),
            date: existing.date,
            currency: existing.currency.clone(),
            category: Some(existing.category.clone()),
            payment_method: existing.payment_method.clone(),
            merchant: existing.merchant.clone(),
            notes: existing.notes_or_empty().to_string(),
        }
    }
}

/// Category choices for `kind`: the fallback name first, then the
/// configured categories in stored order. A dangling name kept by the record
/// being edited is offered too.
pub fn category_options(ledger: &Ledger, kind: TransactionKind, current: Option<&str>) -> Vec<String> {
    let mut options = vec![kind.fallback_category().to_string()];
    for category in ledger.categories_for(kind) {
        if !options.contains(&category.name) {
            options.push(category.name.clone());
        }
    }
    if let Some(current) = current {
        if !options.iter().any(|name| name == current) {
            options.push(current.to_string());
        }
    }
    options
}

/// Payment methods with a non-standard current value appended.
pub fn payment_options(current: &str) -> Vec<String> {
    let mut options: Vec<String> = PAYMENT_METHODS.iter().map(|m| m.to_string()).collect();
    if !current.is_empty() && !options.iter().any(|m| m == current) {
        options.push(current.to_string());
    }
    options
}

/// Walks the user through every field. `existing` prefills an edit.
pub fn transaction_form(
    context: &ShellContext,
    existing: Option<&Transaction>,
    kind_hint: Option<TransactionKind>,
) -> Result<TransactionDraft, CommandError> {
    let theme = &context.theme;
    let defaults = match existing {
        Some(txn) => FormDefaults::for_edit(txn),
        None => FormDefaults::for_new(
            kind_hint.unwrap_or(TransactionKind::Expense),
            context.manager.today(),
            context.currency(),
        ),
    };

    let kinds = [TransactionKind::Expense, TransactionKind::Income];
    let kind_labels = ["Expense", "Income"];
    let kind_default = kinds.iter().position(|k| *k == defaults.kind).unwrap_or(0);
    let kind = kinds[io::select_index(theme, "Type", &kind_labels, kind_default)?];

    let amount_initial = defaults.amount.map(|amount| amount.to_string());
    let amount = io::prompt_parsed(theme, "Amount", amount_initial.as_deref(), parse_amount)?;

    let mut currency_codes: Vec<&str> = CURRENCIES.iter().map(|info| info.code).collect();
    let mut currency_labels: Vec<String> = CURRENCIES
        .iter()
        .map(|info| format!("{} - {} ({})", info.code, info.name, info.symbol))
        .collect();
    if !defaults.currency.is_known() {
        currency_codes.push(defaults.currency.as_str());
        currency_labels.push(defaults.currency.to_string());
    }
    let currency_default = currency_codes
        .iter()
        .position(|code| *code == defaults.currency.as_str())
        .unwrap_or(0);
    let currency_index = io::select_index(theme, "Currency", &currency_labels, currency_default)?;
    let currency = CurrencyCode::new(currency_codes[currency_index]);

    let date_initial = defaults.date.format("%Y-%m-%d").to_string();
    let date = io::prompt_parsed(theme, "Date (YYYY-MM-DD)", Some(&date_initial), parse_date)?;

    // Switching type on an edit drops a category of the other kind.
    let current_category = defaults.category.as_deref().filter(|_| kind == defaults.kind);
    let categories = category_options(context.manager.ledger(), kind, current_category);
    let category_default = current_category
        .and_then(|name| categories.iter().position(|option| option == name))
        .unwrap_or(0);
    let category = categories[io::select_index(theme, "Category", &categories, category_default)?].clone();

    let merchant = io::prompt_text(
        theme,
        if kind == TransactionKind::Income { "Source" } else { "Merchant" },
        Some(&defaults.merchant),
    )?;

    let methods = payment_options(&defaults.payment_method);
    let method_default = methods
        .iter()
        .position(|method| *method == defaults.payment_method)
        .unwrap_or(0);
    let payment_method = methods[io::select_index(theme, "Payment method", &methods, method_default)?].clone();

    let notes = io::prompt_text(theme, "Notes", Some(&defaults.notes))?;

    Ok(TransactionDraft::new(kind, amount)
        .with_date(date)
        .with_currency(currency)
        .with_category(category)
        .with_payment_method(payment_method)
        .with_merchant(merchant)
        .with_notes(notes))
}
