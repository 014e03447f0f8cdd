//! Wire shapes for the persisted collections.
//!
//! Writes always use the current envelope. Reads accept the envelope and the
//! bare legacy shape (schema 0), filling fields older records lack and
//! describing every such fix in [`Decoded::migrations`]. A collection item
//! that cannot be read at all is dropped and counted in [`Decoded::skipped`].

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::{
    currency::CurrencyCode,
    errors::LedgerError,
    ledger::{
        AppSettings, Category, Transaction, TransactionKind, DEFAULT_MONTHLY_BUDGET,
        DEFAULT_PAYMENT_METHOD, UNKNOWN_MERCHANT,
    },
};

use super::Result;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const LEGACY_SCHEMA_VERSION: u32 = 0;

/// A value read from the store together with how it had to be adjusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub schema_version: u32,
    pub migrations: Vec<String>,
    pub skipped: usize,
}

impl<T> Decoded<T> {
    /// True when the stored payload differs from what a fresh write would
    /// produce and should be rewritten in the current shape.
    pub fn needs_rewrite(&self) -> bool {
        self.schema_version < CURRENT_SCHEMA_VERSION || !self.migrations.is_empty()
    }
}

/// Items of a collection payload that deserialised, plus how many did not.
struct ReadItems<T> {
    schema_version: u32,
    items: Vec<(usize, T)>,
    skipped: usize,
}

fn read_items<T: DeserializeOwned>(
    raw: &str,
    label: &str,
    migrations: &mut Vec<String>,
) -> Result<ReadItems<T>> {
    let stored: StoredCollection<Value> = serde_json::from_str(raw)?;
    let (schema_version, values) = stored.into_parts()?;
    let mut items = Vec::with_capacity(values.len());
    let mut skipped = 0;
    for (position, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(item) => items.push((position, item)),
            Err(err) => {
                skipped += 1;
                migrations.push(format!("{label} #{position} skipped: {err}"));
            }
        }
    }
    Ok(ReadItems {
        schema_version,
        items,
        skipped,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionEnvelope<'a, T> {
    schema_version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCollection<T> {
    Versioned {
        #[serde(rename = "schemaVersion")]
        schema_version: u32,
        items: Vec<T>,
    },
    Legacy(Vec<T>),
}

impl<T> StoredCollection<T> {
    fn into_parts(self) -> Result<(u32, Vec<T>)> {
        match self {
            StoredCollection::Versioned {
                schema_version,
                items,
            } => {
                check_version(schema_version)?;
                Ok((schema_version, items))
            }
            StoredCollection::Legacy(items) => Ok((LEGACY_SCHEMA_VERSION, items)),
        }
    }
}

fn check_version(version: u32) -> Result<()> {
    if version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Storage(format!(
            "schema version {version} is newer than supported version {CURRENT_SCHEMA_VERSION}"
        )));
    }
    Ok(())
}

fn encode_collection<T: Serialize>(items: &[T]) -> Result<String> {
    let envelope = CollectionEnvelope {
        schema_version: CURRENT_SCHEMA_VERSION,
        items,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTransaction {
    #[serde(default)]
    id: Option<String>,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: TransactionKind,
    amount: f64,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    merchant: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl StoredTransaction {
    fn normalize(self, position: usize, migrations: &mut Vec<String>) -> Transaction {
        let id = match present(self.id) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                migrations.push(format!("transaction #{position}: assigned id {id}"));
                id
            }
        };

        let currency = match present(self.currency) {
            Some(raw) => {
                let code = CurrencyCode::new(raw.as_str());
                if code.as_str() != raw {
                    migrations.push(format!(
                        "transaction {id}: currency `{raw}` normalised to {code}"
                    ));
                }
                code
            }
            None => {
                migrations.push(format!(
                    "transaction {id}: missing currency defaulted to {}",
                    CurrencyCode::default()
                ));
                CurrencyCode::default()
            }
        };

        let category = present(self.category).unwrap_or_else(|| {
            let fallback = self.kind.fallback_category();
            migrations.push(format!(
                "transaction {id}: missing category set to {fallback}"
            ));
            fallback.to_string()
        });

        let payment_method = present(self.payment_method).unwrap_or_else(|| {
            migrations.push(format!(
                "transaction {id}: missing payment method set to {DEFAULT_PAYMENT_METHOD}"
            ));
            DEFAULT_PAYMENT_METHOD.to_string()
        });

        let merchant = present(self.merchant).unwrap_or_else(|| {
            migrations.push(format!(
                "transaction {id}: missing merchant set to {UNKNOWN_MERCHANT}"
            ));
            UNKNOWN_MERCHANT.to_string()
        });

        let had_notes = self.notes.is_some();
        let notes = present(self.notes);
        if had_notes && notes.is_none() {
            migrations.push(format!("transaction {id}: empty notes dropped"));
        }

        if self.amount < 0.0 {
            warn!(id = %id, amount = self.amount, "stored transaction has a negative amount");
        }

        Transaction {
            id,
            date: self.date,
            kind: self.kind,
            amount: self.amount,
            currency,
            category,
            payment_method,
            merchant,
            notes,
        }
    }
}

pub fn encode_transactions(transactions: &[Transaction]) -> Result<String> {
    encode_collection(transactions)
}

pub fn decode_transactions(raw: &str) -> Result<Decoded<Vec<Transaction>>> {
    let mut migrations = Vec::new();
    let read = read_items::<StoredTransaction>(raw, "transaction", &mut migrations)?;
    let value = read
        .items
        .into_iter()
        .map(|(position, item)| item.normalize(position, &mut migrations))
        .collect();
    Ok(Decoded {
        value,
        schema_version: read.schema_version,
        migrations,
        skipped: read.skipped,
    })
}

#[derive(Deserialize)]
struct StoredCategory {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
}

pub fn encode_categories(categories: &[Category]) -> Result<String> {
    encode_collection(categories)
}

pub fn decode_categories(raw: &str) -> Result<Decoded<Vec<Category>>> {
    let mut migrations = Vec::new();
    let read = read_items::<StoredCategory>(raw, "category", &mut migrations)?;
    let value = read
        .items
        .into_iter()
        .map(|(_, item)| match present(item.id) {
            Some(id) => Category {
                id,
                name: item.name,
                kind: item.kind,
            },
            None => {
                let category = Category::new(item.name, item.kind);
                migrations.push(format!(
                    "category {}: assigned id {}",
                    category.name, category.id
                ));
                category
            }
        })
        .collect();
    Ok(Decoded {
        value,
        schema_version: read.schema_version,
        migrations,
        skipped: read.skipped,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsEnvelope<'a> {
    schema_version: u32,
    #[serde(flatten)]
    settings: &'a AppSettings,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    #[serde(default)]
    schema_version: Option<u32>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    monthly_budget: Option<f64>,
}

pub fn encode_settings(settings: &AppSettings) -> Result<String> {
    let envelope = SettingsEnvelope {
        schema_version: CURRENT_SCHEMA_VERSION,
        settings,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn decode_settings(raw: &str) -> Result<Decoded<AppSettings>> {
    let stored: StoredSettings = serde_json::from_str(raw)?;
    let schema_version = stored.schema_version.unwrap_or(LEGACY_SCHEMA_VERSION);
    check_version(schema_version)?;
    let mut migrations = Vec::new();

    let currency = match present(stored.currency) {
        Some(raw) => CurrencyCode::new(raw),
        None => {
            migrations.push(format!(
                "settings: missing currency defaulted to {}",
                CurrencyCode::default()
            ));
            CurrencyCode::default()
        }
    };
    let monthly_budget = match stored.monthly_budget {
        Some(budget) => budget,
        None => {
            migrations.push(format!(
                "settings: missing monthly budget defaulted to {DEFAULT_MONTHLY_BUDGET}"
            ));
            DEFAULT_MONTHLY_BUDGET
        }
    };

    Ok(Decoded {
        value: AppSettings {
            currency,
            monthly_budget,
        },
        schema_version,
        migrations,
        skipped: 0,
    })
}
