//! Reading-position records and the store interface they persist through.

use core::convert::Infallible;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Saved position of one document, keyed by its display identity.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(rename = "fileName")]
    pub document_id: String,
    pub current_index: usize,
    pub total_words: usize,
    pub percent: u8,
    pub last_read: DateTime<Utc>,
}

impl ProgressRecord {
    /// `None` for an empty document; those are never persisted.
    pub fn new(
        document_id: impl Into<String>,
        current_index: usize,
        total_words: usize,
        last_read: DateTime<Utc>,
    ) -> Option<Self> {
        if total_words == 0 {
            return None;
        }
        let current_index = current_index.min(total_words - 1);
        Some(Self {
            document_id: document_id.into(),
            current_index,
            total_words,
            percent: rounded_percent(current_index, total_words),
            last_read,
        })
    }
}

/// `round(100 * index / total)`, 0 when `total` is 0.
pub fn rounded_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (200 * index as u64 + total as u64) / (2 * total as u64);
    percent.min(100) as u8
}

/// Newest first; equal timestamps fall back to identity order.
pub fn sort_newest_first(records: &mut [ProgressRecord]) {
    records.sort_by(|a, b| {
        b.last_read
            .cmp(&a.last_read)
            .then_with(|| a.document_id.cmp(&b.document_id))
    });
}

/// Position persistence keyed by document identity.
pub trait ProgressStore {
    type Error;

    fn load(&mut self, document_id: &str) -> Result<Option<ProgressRecord>, Self::Error>;

    /// Insert or replace the record for `record.document_id`.
    fn save(&mut self, record: &ProgressRecord) -> Result<(), Self::Error>;

    /// Every record, most recently read first.
    fn list_all(&mut self) -> Result<Vec<ProgressRecord>, Self::Error>;

    /// Returns whether a record existed.
    fn delete(&mut self, document_id: &str) -> Result<bool, Self::Error>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryProgressStore {
    records: BTreeMap<String, ProgressRecord>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProgressStore for MemoryProgressStore {
    type Error = Infallible;

    fn load(&mut self, document_id: &str) -> Result<Option<ProgressRecord>, Self::Error> {
        Ok(self.records.get(document_id).cloned())
    }

    fn save(&mut self, record: &ProgressRecord) -> Result<(), Self::Error> {
        self.records
            .insert(record.document_id.clone(), record.clone());
        Ok(())
    }

    fn list_all(&mut self) -> Result<Vec<ProgressRecord>, Self::Error> {
        let mut records: Vec<_> = self.records.values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn delete(&mut self, document_id: &str) -> Result<bool, Self::Error> {
        Ok(self.records.remove(document_id).is_some())
    }
}
