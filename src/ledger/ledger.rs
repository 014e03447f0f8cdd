use super::{
    category::Category,
    settings::AppSettings,
    transaction::{Transaction, TransactionKind},
};

/// In-memory application state: the three persisted collections side by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub settings: AppSettings,
}

impl Ledger {
    pub fn new(
        transactions: Vec<Transaction>,
        categories: Vec<Category>,
        settings: AppSettings,
    ) -> Self {
        Self {
            transactions,
            categories,
            settings,
        }
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Categories offered when recording a transaction of `kind`.
    pub fn categories_for(&self, kind: TransactionKind) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|category| category.kind == kind)
            .collect()
    }

    /// Category names referenced by transactions that no longer exist as categories.
    pub fn dangling_categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .transactions
            .iter()
            .map(|txn| txn.category.as_str())
            .filter(|name| !self.categories.iter().any(|c| c.name == *name))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
