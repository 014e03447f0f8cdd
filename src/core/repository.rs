//! Load/save contracts for the three persisted collections.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    errors::LedgerError,
    ledger::{default_categories, AppSettings, Category, Ledger, Transaction},
    storage::{
        records::{self, Decoded},
        KeyValueStore, ALL_KEYS, CATEGORIES_KEY, CURRENT_SCHEMA_VERSION, SETTINGS_KEY,
        TRANSACTIONS_KEY,
    },
};

use super::{
    clock::Clock,
    demo::{DemoDataGenerator, DEMO_TRANSACTION_COUNT},
};

/// Where a loaded value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Read from the store as-is (possibly normalised).
    Stored,
    /// Key was absent; defaults were generated and written back.
    Defaulted,
    /// Stored payload was unreadable; it was quarantined and replaced.
    Recovered,
}

/// Outcome of loading one key.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub key: &'static str,
    pub origin: LoadOrigin,
    pub schema_version: u32,
    pub migrations: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub report: LoadReport,
}

/// Single entry point for reading and writing ledger state.
///
/// Loads never fail because of what is stored: absent keys are defaulted and
/// malformed ones are quarantined and regenerated. Only store I/O errors
/// propagate.
pub struct LedgerRepository {
    store: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    demo_seed: Option<u64>,
}

impl LedgerRepository {
    pub fn new(store: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            demo_seed: None,
        }
    }

    /// Fixes the seed used when sample transactions are generated.
    pub fn with_demo_seed(mut self, seed: u64) -> Self {
        self.demo_seed = Some(seed);
        self
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn load_transactions(&self) -> Result<Loaded<Vec<Transaction>>, LedgerError> {
        self.load_key(
            TRANSACTIONS_KEY,
            records::decode_transactions,
            || self.demo_transactions(),
            |items: &Vec<Transaction>| records::encode_transactions(items),
        )
    }

    pub fn load_categories(&self) -> Result<Loaded<Vec<Category>>, LedgerError> {
        self.load_key(
            CATEGORIES_KEY,
            records::decode_categories,
            default_categories,
            |items: &Vec<Category>| records::encode_categories(items),
        )
    }

    pub fn load_settings(&self) -> Result<Loaded<AppSettings>, LedgerError> {
        self.load_key(
            SETTINGS_KEY,
            records::decode_settings,
            AppSettings::default,
            records::encode_settings,
        )
    }

    /// Loads all three keys. Each is independent: a broken one does not
    /// affect the others.
    pub fn load_ledger(&self) -> Result<(Ledger, Vec<LoadReport>), LedgerError> {
        let transactions = self.load_transactions()?;
        let categories = self.load_categories()?;
        let settings = self.load_settings()?;
        let reports = vec![transactions.report, categories.report, settings.report];
        let ledger = Ledger::new(transactions.value, categories.value, settings.value);
        Ok((ledger, reports))
    }

    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), LedgerError> {
        self.store
            .set(TRANSACTIONS_KEY, &records::encode_transactions(transactions)?)?;
        info!(count = transactions.len(), "saved transactions");
        Ok(())
    }

    pub fn save_categories(&self, categories: &[Category]) -> Result<(), LedgerError> {
        self.store
            .set(CATEGORIES_KEY, &records::encode_categories(categories)?)?;
        info!(count = categories.len(), "saved categories");
        Ok(())
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<(), LedgerError> {
        self.store
            .set(SETTINGS_KEY, &records::encode_settings(settings)?)?;
        info!(currency = %settings.currency, budget = settings.monthly_budget, "saved settings");
        Ok(())
    }

    /// Removes every key. The next load regenerates defaults.
    pub fn clear(&self) -> Result<(), LedgerError> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        info!(store = %self.store.describe(), "cleared ledger data");
        Ok(())
    }

    fn demo_transactions(&self) -> Vec<Transaction> {
        let mut generator = match self.demo_seed {
            Some(seed) => DemoDataGenerator::new(seed),
            None => DemoDataGenerator::from_entropy(),
        };
        generator.generate(
            self.clock.today(),
            &default_categories(),
            DEMO_TRANSACTION_COUNT,
        )
    }

    fn load_key<T>(
        &self,
        key: &'static str,
        decode: impl FnOnce(&str) -> Result<Decoded<T>, LedgerError>,
        default: impl FnOnce() -> T,
        encode: impl Fn(&T) -> Result<String, LedgerError>,
    ) -> Result<Loaded<T>, LedgerError> {
        let Some(bytes) = self.store.get_bytes(key)? else {
            return self.initialise_key(key, default, encode);
        };
        let text = String::from_utf8(bytes)
            .map_err(|err| LedgerError::Storage(format!("payload is not valid UTF-8 ({err})")));
        if matches!(&text, Ok(raw) if raw.trim().is_empty()) {
            return self.initialise_key(key, default, encode);
        }

        match text.and_then(|raw| decode(&raw)) {
            Ok(decoded) => {
                for migration in &decoded.migrations {
                    warn!(key, "{migration}");
                }
                let mut warnings = Vec::new();
                if decoded.skipped > 0 {
                    warnings.push(format!(
                        "{key}: {} unreadable record(s) dropped",
                        decoded.skipped
                    ));
                    if let Some(path) = self.store.quarantine(key)? {
                        warnings.push(format!(
                            "previous contents preserved at {}",
                            path.display()
                        ));
                    }
                }
                if decoded.needs_rewrite() {
                    self.store.set(key, &encode(&decoded.value)?)?;
                    info!(
                        key,
                        from = decoded.schema_version,
                        to = CURRENT_SCHEMA_VERSION,
                        "rewrote key in current schema"
                    );
                }
                Ok(Loaded {
                    value: decoded.value,
                    report: LoadReport {
                        key,
                        origin: LoadOrigin::Stored,
                        schema_version: decoded.schema_version,
                        migrations: decoded.migrations,
                        warnings,
                    },
                })
            }
            Err(err) => {
                warn!(key, error = %err, "stored data is unreadable; regenerating defaults");
                let mut warnings = vec![format!("{key} could not be read ({err}); defaults restored")];
                match self.store.quarantine(key)? {
                    Some(path) => warnings.push(format!(
                        "previous contents preserved at {}",
                        path.display()
                    )),
                    None => warnings.push("previous contents were set aside".into()),
                }
                let value = default();
                self.store.set(key, &encode(&value)?)?;
                Ok(Loaded {
                    value,
                    report: LoadReport {
                        key,
                        origin: LoadOrigin::Recovered,
                        schema_version: CURRENT_SCHEMA_VERSION,
                        migrations: Vec::new(),
                        warnings,
                    },
                })
            }
        }
    }

    fn initialise_key<T>(
        &self,
        key: &'static str,
        default: impl FnOnce() -> T,
        encode: impl Fn(&T) -> Result<String, LedgerError>,
    ) -> Result<Loaded<T>, LedgerError> {
        let value = default();
        self.store.set(key, &encode(&value)?)?;
        info!(key, "initialised key with defaults");
        Ok(Loaded {
            value,
            report: LoadReport {
                key,
                origin: LoadOrigin::Defaulted,
                schema_version: CURRENT_SCHEMA_VERSION,
                migrations: Vec::new(),
                warnings: Vec::new(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::clock::FixedClock, storage::MemoryStore};
    use chrono::NaiveDate;

    fn repository() -> (LedgerRepository, MemoryStore) {
        let store = MemoryStore::new();
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()));
        let repo = LedgerRepository::new(Box::new(store.clone()), clock).with_demo_seed(1);
        (repo, store)
    }

    #[test]
    fn absent_keys_are_defaulted_and_written_back() {
        let (repo, store) = repository();
        let (ledger, reports) = repo.load_ledger().unwrap();
        assert_eq!(ledger.transactions.len(), DEMO_TRANSACTION_COUNT);
        assert_eq!(ledger.categories, default_categories());
        assert_eq!(ledger.settings, AppSettings::default());
        assert!(reports.iter().all(|r| r.origin == LoadOrigin::Defaulted));
        for key in ALL_KEYS {
            assert!(store.get(key).unwrap().is_some(), "{key} written back");
        }

        let (reloaded, reports) = repo.load_ledger().unwrap();
        assert_eq!(reloaded, ledger);
        assert!(reports.iter().all(|r| r.origin == LoadOrigin::Stored));
    }

    #[test]
    fn malformed_key_is_quarantined_and_others_survive() {
        let (repo, store) = repository();
        repo.save_settings(&AppSettings {
            currency: "EUR".into(),
            monthly_budget: 10.0,
        })
        .unwrap();
        store.set(CATEGORIES_KEY, "{oops").unwrap();

        let categories = repo.load_categories().unwrap();
        assert_eq!(categories.report.origin, LoadOrigin::Recovered);
        assert_eq!(categories.value, default_categories());
        assert!(!categories.report.warnings.is_empty());
        assert_eq!(store.quarantined(), vec![(CATEGORIES_KEY.to_string(), "{oops".to_string())]);

        let settings = repo.load_settings().unwrap();
        assert_eq!(settings.value.currency.as_str(), "EUR");
    }

    #[test]
    fn legacy_payload_is_normalised_once() {
        let (repo, store) = repository();
        store
            .set(
                TRANSACTIONS_KEY,
                r#"[{"id":"a","date":"2025-06-01","type":"expense","amount":5,
                    "category":"Food & Dining","paymentMethod":"Card","merchant":"Shell"}]"#,
            )
            .unwrap();
        let first = repo.load_transactions().unwrap();
        assert_eq!(first.report.schema_version, 0);
        assert_eq!(first.report.migrations.len(), 1);
        assert_eq!(first.value[0].currency.as_str(), "USD");

        let second = repo.load_transactions().unwrap();
        assert_eq!(second.report.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(second.report.migrations.is_empty());
        assert_eq!(second.value, first.value);
    }

    #[test]
    fn unreadable_record_is_dropped_without_losing_the_rest() {
        let (repo, store) = repository();
        let raw = r#"{"schemaVersion":1,"items":[
            {"id":"keep","date":"2025-06-01","type":"expense","amount":5,"currency":"USD",
             "category":"Food & Dining","paymentMethod":"Card","merchant":"Shell"},
            {"id":"drop","date":"2025-06-02","type":"transfer","amount":9}]}"#;
        store.set(TRANSACTIONS_KEY, raw).unwrap();

        let loaded = repo.load_transactions().unwrap();
        assert_eq!(loaded.report.origin, LoadOrigin::Stored);
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.value[0].id, "keep");
        assert!(loaded.report.migrations[0].starts_with("transaction #1 skipped"));
        assert!(loaded.report.warnings[0].contains("1 unreadable record(s) dropped"));
        assert_eq!(store.quarantined(), vec![(TRANSACTIONS_KEY.to_string(), raw.to_string())]);

        let reloaded = repo.load_transactions().unwrap();
        assert!(reloaded.report.migrations.is_empty());
        assert_eq!(reloaded.value, loaded.value);
    }

    #[test]
    fn empty_payload_counts_as_absent() {
        let (repo, store) = repository();
        store.set(SETTINGS_KEY, "").unwrap();
        let settings = repo.load_settings().unwrap();
        assert_eq!(settings.report.origin, LoadOrigin::Defaulted);
    }

    #[test]
    fn clear_removes_every_key() {
        let (repo, store) = repository();
        repo.load_ledger().unwrap();
        repo.clear().unwrap();
        for key in ALL_KEYS {
            assert!(store.get(key).unwrap().is_none());
        }
    }
}
