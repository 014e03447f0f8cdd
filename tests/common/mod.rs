#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use beige_ledger::{
    core::{FixedClock, LedgerManager, LedgerRepository},
    currency::CurrencyCode,
    ledger::{Transaction, TransactionKind},
    storage::{JsonFileStore, MemoryStore},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const DEMO_SEED: u64 = 7;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn today() -> NaiveDate {
    date(2025, 3, 14)
}

/// A fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn json_repository(dir: &Path) -> LedgerRepository {
    let store = JsonFileStore::new(dir).expect("create json store");
    LedgerRepository::new(Box::new(store), Arc::new(FixedClock::new(today())))
        .with_demo_seed(DEMO_SEED)
}

/// Manager over a JSON store in its own temp directory.
pub fn setup_json_manager() -> (LedgerManager, PathBuf) {
    let dir = temp_dir();
    let manager = LedgerManager::open(json_repository(&dir)).expect("open ledger");
    (manager, dir)
}

pub fn setup_memory_manager() -> LedgerManager {
    let repository = LedgerRepository::new(
        Box::new(MemoryStore::new()),
        Arc::new(FixedClock::new(today())),
    )
    .with_demo_seed(DEMO_SEED);
    LedgerManager::open(repository).expect("open ledger")
}

pub fn txn(
    kind: TransactionKind,
    amount: f64,
    currency: &str,
    category: &str,
    on: NaiveDate,
) -> Transaction {
    Transaction {
        id: format!("{}-{}-{}", category, amount, on),
        date: on,
        kind,
        amount,
        currency: CurrencyCode::new(currency),
        category: category.to_string(),
        payment_method: "Card".into(),
        merchant: "Test Merchant".into(),
        notes: None,
    }
}
