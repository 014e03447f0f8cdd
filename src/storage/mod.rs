//! Opaque key/value persistence for the three independent ledger collections.

pub mod json_backend;
pub mod memory;
pub mod records;

use std::path::PathBuf;

use crate::errors::LedgerError;

pub type Result<T> = std::result::Result<T, LedgerError>;

pub const TRANSACTIONS_KEY: &str = "beigeledger_transactions";
pub const CATEGORIES_KEY: &str = "beigeledger_categories";
pub const SETTINGS_KEY: &str = "beigeledger_settings";

/// Every key the ledger writes, in load order.
pub const ALL_KEYS: [&str; 3] = [TRANSACTIONS_KEY, CATEGORIES_KEY, SETTINGS_KEY];

/// String-valued store with whole-value replacement per key.
///
/// Writes to one key never touch another; there is no cross-key transaction.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Raw payload of `key`. Backends that hold bytes rather than text
    /// override this so undecodable payloads can still be recovered.
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get(key)?.map(String::into_bytes))
    }

    /// Preserves the current payload of `key` somewhere it will not be
    /// overwritten, returning its location when the backend keeps one.
    fn quarantine(&self, _key: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    /// Human readable location of the store, used in diagnostics.
    fn describe(&self) -> String;
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
pub use records::{Decoded, CURRENT_SCHEMA_VERSION};
