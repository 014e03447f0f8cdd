use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::TransactionKind;

/// User-defined label partitioning transactions within a kind.
///
/// Transactions reference categories by name, not id, so removing a category
/// leaves existing records untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
        }
    }

    fn preset(id: &str, name: &str, kind: TransactionKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

/// Categories seeded on first run.
pub fn default_categories() -> Vec<Category> {
    use TransactionKind::{Expense, Income};
    vec![
        Category::preset("1", "Housing", Expense),
        Category::preset("2", "Food & Dining", Expense),
        Category::preset("3", "Transportation", Expense),
        Category::preset("4", "Utilities", Expense),
        Category::preset("5", "Shopping", Expense),
        Category::preset("6", "Salary", Income),
        Category::preset("7", "Freelance", Income),
        Category::preset("8", "Investments", Income),
    ]
}
