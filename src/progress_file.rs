//! Reading progress kept in one JSON object file, keyed by document identity.
//!
//! A missing or unreadable mapping is treated as empty so a damaged file never
//! blocks reading. Writes go to a sibling temp file first and are renamed over
//! the old one.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use quickread_core::{
    ProgressRecord, ProgressStore,
    progress::sort_newest_first,
};
use tempfile::NamedTempFile;

use crate::error::StoreError;

type ProgressMap = BTreeMap<String, ProgressRecord>;

#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<ProgressMap, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ProgressMap::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        if content.trim().is_empty() {
            return Ok(ProgressMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(
                    "progress: ignoring malformed file path={} err={}",
                    self.path.display(),
                    err
                );
                Ok(ProgressMap::new())
            }
        }
    }

    fn write_all(&self, map: &ProgressMap) -> Result<(), StoreError> {
        let parent_dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir).map_err(|err| self.io_error(err))?;

        let temp_file = NamedTempFile::new_in(parent_dir).map_err(|err| self.io_error(err))?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer(&mut writer, map)?;
            writer.flush().map_err(|err| self.io_error(err))?;
        }
        temp_file.persist(&self.path)?;

        debug!(
            "progress: wrote path={} records={}",
            self.path.display(),
            map.len()
        );
        Ok(())
    }
}

impl ProgressStore for JsonProgressStore {
    type Error = StoreError;

    fn load(&mut self, document_id: &str) -> Result<Option<ProgressRecord>, Self::Error> {
        Ok(self.read_all()?.remove(document_id))
    }

    fn save(&mut self, record: &ProgressRecord) -> Result<(), Self::Error> {
        let mut map = self.read_all()?;
        map.insert(record.document_id.clone(), record.clone());
        self.write_all(&map)
    }

    fn list_all(&mut self) -> Result<Vec<ProgressRecord>, Self::Error> {
        let mut records: Vec<_> = self.read_all()?.into_values().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn delete(&mut self, document_id: &str) -> Result<bool, Self::Error> {
        let mut map = self.read_all()?;
        if map.remove(document_id).is_none() {
            return Ok(false);
        }
        self.write_all(&map)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn record(id: &str, index: usize, secs: i64) -> ProgressRecord {
        ProgressRecord::new(id, index, 100, at(secs)).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let mut store = JsonProgressStore::new(dir.path().join("progress.json"));
        assert_eq!(store.load("book.epub").unwrap(), None);
        assert!(store.list_all().unwrap().is_empty());
        assert!(!store.delete("book.epub").unwrap());
    }

    #[test]
    fn saves_upsert_and_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("progress.json");
        let mut store = JsonProgressStore::new(&path);

        store.save(&record("a.txt", 10, 0)).unwrap();
        store.save(&record("b.pdf", 20, 5)).unwrap();
        store.save(&record("a.txt", 30, 9)).unwrap();

        let mut reopened = JsonProgressStore::new(&path);
        assert_eq!(reopened.load("a.txt").unwrap().unwrap().current_index, 30);
        let ids: Vec<_> = reopened
            .list_all()
            .unwrap()
            .into_iter()
            .map(|record| record.document_id)
            .collect();
        assert_eq!(ids, ["a.txt", "b.pdf"]);
    }

    #[test]
    fn file_is_one_object_keyed_by_identity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let mut store = JsonProgressStore::new(&path);
        store.save(&record("Pasted text - 1/2/2024", 50, 0)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &raw["Pasted text - 1/2/2024"];
        assert_eq!(entry["fileName"], "Pasted text - 1/2/2024");
        assert_eq!(entry["currentIndex"], 50);
        assert_eq!(entry["percent"], 50);
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_replaced_on_save() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = JsonProgressStore::new(&path);
        assert_eq!(store.load("a.txt").unwrap(), None);

        store.save(&record("a.txt", 1, 0)).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_only_that_record() {
        let dir = tempdir().unwrap();
        let mut store = JsonProgressStore::new(dir.path().join("progress.json"));
        store.save(&record("a.txt", 1, 0)).unwrap();
        store.save(&record("b.txt", 2, 1)).unwrap();

        assert!(store.delete("a.txt").unwrap());
        assert_eq!(store.load("a.txt").unwrap(), None);
        assert!(store.load("b.txt").unwrap().is_some());
    }
}
