//! Ledger domain records and the in-memory aggregate that holds them.

pub mod category;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod settings;
pub mod transaction;

pub use category::{default_categories, Category};
pub use ledger::Ledger;
pub use settings::{AppSettings, DEFAULT_MONTHLY_BUDGET};
pub use transaction::{
    Transaction, TransactionDraft, TransactionKind, DEFAULT_PAYMENT_METHOD, UNCATEGORIZED_EXPENSE,
    UNCATEGORIZED_INCOME, UNKNOWN_MERCHANT,
};
