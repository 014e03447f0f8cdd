use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info};

use crate::{
    errors::LedgerError,
    utils::persistence::{ensure_dir, read_optional, write_atomic},
};

use super::{KeyValueStore, Result};

const DATA_EXTENSION: &str = "json";
const QUARANTINE_EXTENSION: &str = "corrupt";
const QUARANTINE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DEFAULT_RETENTION: usize = 5;

/// Stores each key as `<dir>/<key>.json`.
///
/// Unreadable payloads are copied to `<dir>/quarantine/<key>_<timestamp>.corrupt`
/// before being replaced; only the newest few copies per key are kept.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    quarantine_dir: PathBuf,
    retention: usize,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_retention(dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(dir: impl Into<PathBuf>, retention: usize) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        let quarantine_dir = dir.join("quarantine");
        info!(path = %dir.display(), "opened json store");
        Ok(Self {
            dir,
            quarantine_dir,
            retention: retention.max(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", canonical_key(key), DATA_EXTENSION))
    }

    /// Quarantined copies of `key`, newest first.
    pub fn quarantined(&self, key: &str) -> Result<Vec<PathBuf>> {
        if !self.quarantine_dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", canonical_key(key));
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.quarantine_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(QUARANTINE_EXTENSION) {
                continue;
            }
            let matches_key = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&prefix))
                .unwrap_or(false);
            if matches_key {
                entries.push(path);
            }
        }
        entries.sort_by(|a, b| quarantine_timestamp(b).cmp(&quarantine_timestamp(a)));
        Ok(entries)
    }

    fn prune_quarantine(&self, key: &str) -> Result<()> {
        let entries = self.quarantined(key)?;
        for stale in entries.iter().skip(self.retention) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }

    fn next_quarantine_path(&self, key: &str) -> PathBuf {
        let timestamp = Utc::now().format(QUARANTINE_TIMESTAMP_FORMAT).to_string();
        let stem = format!("{}_{}", canonical_key(key), timestamp);
        let mut candidate = self
            .quarantine_dir
            .join(format!("{}.{}", stem, QUARANTINE_EXTENSION));
        let mut counter = 1;
        while candidate.exists() {
            candidate = self
                .quarantine_dir
                .join(format!("{}-{}.{}", stem, counter, QUARANTINE_EXTENSION));
            counter += 1;
        }
        candidate
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_bytes(key)?
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|err| {
                    LedgerError::Storage(format!("{key} is not valid UTF-8: {err}"))
                })
            })
            .transpose()
    }

    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.key_path(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        write_atomic(&path, value)?;
        debug!(key, path = %path.display(), bytes = value.len(), "wrote key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn quarantine(&self, key: &str) -> Result<Option<PathBuf>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        ensure_dir(&self.quarantine_dir)?;
        let target = self.next_quarantine_path(key);
        fs::copy(&path, &target)?;
        self.prune_quarantine(key)?;
        Ok(Some(target))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "store".into()
    } else {
        sanitized
    }
}

fn quarantine_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let stem = path.file_stem()?.to_str()?;
    let stem = match stem.rsplit_once('-') {
        Some((head, counter)) if counter.chars().all(|c| c.is_ascii_digit()) => head,
        _ => stem,
    };
    let mut parts = stem.rsplitn(3, '_');
    let time = parts.next()?;
    let date = parts.next()?;
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S").ok()
}
