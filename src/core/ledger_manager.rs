use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::core::clock::Clock;
use crate::core::repository::{LedgerRepository, LoadReport};
use crate::core::services::{
    CategoryService, ServiceResult, SettingsService, SettingsUpdate, TransactionService,
};
use crate::errors::LedgerError;
use crate::ledger::{AppSettings, Category, Ledger, Transaction, TransactionDraft, TransactionKind};

/// Facade that owns the in-memory ledger and keeps the store in step with it.
///
/// Every mutation runs against a working copy, persists the affected key and
/// only then replaces the current state, so a failed write leaves memory and
/// disk agreeing.
pub struct LedgerManager {
    repository: LedgerRepository,
    ledger: Ledger,
    last_load: Vec<LoadReport>,
}

impl LedgerManager {
    pub fn open(repository: LedgerRepository) -> Result<Self, LedgerError> {
        let (ledger, reports) = repository.load_ledger()?;
        Ok(Self {
            repository,
            ledger,
            last_load: reports,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn settings(&self) -> &AppSettings {
        &self.ledger.settings
    }

    pub fn repository(&self) -> &LedgerRepository {
        &self.repository
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.repository.clock()
    }

    pub fn today(&self) -> NaiveDate {
        self.repository.clock().today()
    }

    /// Reports from the most recent load.
    pub fn load_reports(&self) -> &[LoadReport] {
        &self.last_load
    }

    /// Re-reads every key from the store.
    pub fn reload(&mut self) -> Result<&[LoadReport], LedgerError> {
        let (ledger, reports) = self.repository.load_ledger()?;
        self.ledger = ledger;
        self.last_load = reports;
        Ok(&self.last_load)
    }

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> ServiceResult<String> {
        let mut working = self.ledger.clone();
        let id = TransactionService::add(&mut working, draft, self.today())?;
        self.repository.save_transactions(&working.transactions)?;
        self.ledger = working;
        Ok(id)
    }

    pub fn update_transaction(&mut self, id: &str, draft: TransactionDraft) -> ServiceResult<()> {
        let mut working = self.ledger.clone();
        TransactionService::update(&mut working, id, draft, self.today())?;
        self.repository.save_transactions(&working.transactions)?;
        self.ledger = working;
        Ok(())
    }

    pub fn delete_transaction(&mut self, id: &str) -> ServiceResult<Transaction> {
        let mut working = self.ledger.clone();
        let removed = TransactionService::remove(&mut working, id)?;
        self.repository.save_transactions(&working.transactions)?;
        self.ledger = working;
        Ok(removed)
    }

    pub fn add_category(&mut self, name: &str, kind: TransactionKind) -> ServiceResult<Category> {
        let mut working = self.ledger.clone();
        let category = CategoryService::add(&mut working, name, kind)?;
        self.repository.save_categories(&working.categories)?;
        self.ledger = working;
        Ok(category)
    }

    pub fn remove_category(&mut self, id: &str) -> ServiceResult<Category> {
        let mut working = self.ledger.clone();
        let removed = CategoryService::remove(&mut working, id)?;
        self.repository.save_categories(&working.categories)?;
        self.ledger = working;
        let still_used = self
            .ledger
            .transactions
            .iter()
            .filter(|txn| txn.category == removed.name)
            .count();
        if still_used > 0 {
            warn!(
                category = %removed.name,
                transactions = still_used,
                "removed category is still referenced by transactions"
            );
        }
        Ok(removed)
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) -> ServiceResult<()> {
        let mut working = self.ledger.clone();
        SettingsService::apply(&mut working, update)?;
        self.repository.save_settings(&working.settings)?;
        self.ledger = working;
        Ok(())
    }

    /// Deletes all stored data and reloads, which regenerates the defaults.
    pub fn clear_data(&mut self) -> Result<&[LoadReport], LedgerError> {
        self.repository.clear()?;
        self.reload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::repository::LoadOrigin;
    use crate::currency::CurrencyCode;
    use crate::storage::{KeyValueStore, MemoryStore, TRANSACTIONS_KEY};

    fn manager() -> (LedgerManager, MemoryStore) {
        let store = MemoryStore::new();
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()));
        let repo = LedgerRepository::new(Box::new(store.clone()), clock).with_demo_seed(3);
        (LedgerManager::open(repo).unwrap(), store)
    }

    #[test]
    fn mutations_are_persisted() {
        let (mut manager, store) = manager();
        let id = manager
            .add_transaction(TransactionDraft::new(TransactionKind::Expense, 9.99).with_merchant("Cafe"))
            .unwrap();
        let raw = store.get(TRANSACTIONS_KEY).unwrap().unwrap();
        assert!(raw.contains(&id));

        manager.update_settings(SettingsUpdate {
            currency: Some(CurrencyCode::new("EUR")),
            monthly_budget: Some(1200.0),
        })
        .unwrap();
        manager.delete_transaction(&id).unwrap();

        let repo = LedgerRepository::new(Box::new(store.clone()), manager.clock().clone());
        let reopened = LedgerManager::open(repo).unwrap();
        assert!(reopened
            .load_reports()
            .iter()
            .all(|r| r.origin == LoadOrigin::Stored));
        assert_eq!(reopened.ledger(), manager.ledger());
        assert_eq!(reopened.settings().currency.as_str(), "EUR");
    }

    #[test]
    fn failed_validation_changes_nothing() {
        let (mut manager, _store) = manager();
        let before = manager.ledger().clone();
        assert!(manager
            .add_transaction(TransactionDraft::new(TransactionKind::Income, -3.0))
            .is_err());
        assert!(manager.remove_category("nope").is_err());
        assert_eq!(manager.ledger(), &before);
    }

    #[test]
    fn clear_data_regenerates_defaults() {
        let (mut manager, _store) = manager();
        manager.add_category("Pets", TransactionKind::Expense).unwrap();
        let reports = manager.clear_data().unwrap().to_vec();
        assert!(reports.iter().all(|r| r.origin == LoadOrigin::Defaulted));
        assert_eq!(manager.ledger().categories.len(), 8);
    }
}
