//! Income and expense records.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;

pub const DEFAULT_PAYMENT_METHOD: &str = "Card";
pub const UNKNOWN_MERCHANT: &str = "Unknown";
pub const UNCATEGORIZED_EXPENSE: &str = "Uncategorized";
pub const UNCATEGORIZED_INCOME: &str = "Other Income";

/// Direction of money flow. Also partitions categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Category assigned when a record arrives without one.
    pub fn fallback_category(self) -> &'static str {
        match self {
            TransactionKind::Income => UNCATEGORIZED_INCOME,
            TransactionKind::Expense => UNCATEGORIZED_EXPENSE,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!(
                "unknown transaction type `{other}` (expected income or expense)"
            )),
        }
    }
}

/// A stored income or expense. Replaced wholesale on edit.
///
/// `amount` is always expressed in `currency`, never in the display currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub currency: CurrencyCode,
    pub category: String,
    pub payment_method: String,
    pub merchant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn notes_or_empty(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

/// Field values captured by the add/edit form, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub currency: Option<CurrencyCode>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub merchant: Option<String>,
    pub notes: Option<String>,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, amount: f64) -> Self {
        Self {
            kind,
            amount,
            date: None,
            currency: None,
            category: None,
            payment_method: None,
            merchant: None,
            notes: None,
        }
    }

    /// Prefills a draft from an existing record for editing.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            kind: transaction.kind,
            amount: transaction.amount,
            date: Some(transaction.date),
            currency: Some(transaction.currency.clone()),
            category: Some(transaction.category.clone()),
            payment_method: Some(transaction.payment_method.clone()),
            merchant: Some(transaction.merchant.clone()),
            notes: transaction.notes.clone(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Materialises the draft, filling blanks with the form defaults.
    pub fn into_transaction(
        self,
        id: String,
        today: NaiveDate,
        default_currency: &CurrencyCode,
    ) -> Transaction {
        let currency = self
            .currency
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| default_currency.clone());
        Transaction {
            id,
            date: self.date.unwrap_or(today),
            kind: self.kind,
            amount: self.amount,
            currency,
            category: non_blank(self.category)
                .unwrap_or_else(|| self.kind.fallback_category().to_string()),
            payment_method: non_blank(self.payment_method)
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            merchant: non_blank(self.merchant).unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
            notes: non_blank(self.notes),
        }
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn blank_draft_fields_take_form_defaults() {
        let expense = TransactionDraft::new(TransactionKind::Expense, 12.5)
            .with_merchant("   ")
            .into_transaction("t1".into(), today(), &CurrencyCode::new("EUR"));
        assert_eq!(expense.date, today());
        assert_eq!(expense.currency.as_str(), "EUR");
        assert_eq!(expense.category, "Uncategorized");
        assert_eq!(expense.payment_method, "Card");
        assert_eq!(expense.merchant, "Unknown");
        assert_eq!(expense.notes, None);

        let income = TransactionDraft::new(TransactionKind::Income, 1000.0).into_transaction(
            "t2".into(),
            today(),
            &CurrencyCode::default(),
        );
        assert_eq!(income.category, "Other Income");
    }

    #[test]
    fn serializes_with_original_field_names() {
        let txn = TransactionDraft::new(TransactionKind::Expense, 20.0)
            .with_category("Food & Dining")
            .with_payment_method("Cash")
            .with_merchant("Local Bakery")
            .into_transaction("abc".into(), today(), &CurrencyCode::default());
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["paymentMethod"], "Cash");
        assert_eq!(json["date"], "2025-03-14");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn parses_kind_case_insensitively() {
        assert_eq!("Income".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert_eq!(" EXPENSE ".parse::<TransactionKind>(), Ok(TransactionKind::Expense));
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
