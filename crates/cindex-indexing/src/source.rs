//! Primary-store reader seam.
//!
//! The indexer never touches the primary store directly; it reads key
//! records through [`KeyTableSource`]. The trait keeps the rebuild path
//! testable against an in-memory table and lets production wire in the
//! RocksDB-backed snapshot.

use std::collections::{BTreeMap, HashMap};

use cindex_storage::{KeyStore, CF_KEY_TABLE};
use cindex_types::KeyRecord;
use tracing::debug;

use crate::error::IndexingError;

/// Read-only view of the primary store's key tables.
pub trait KeyTableSource {
    /// Return every `(key name, record)` pair in the named table, in the
    /// table's native order.
    ///
    /// The sequence is finite and restartable: calling `scan` again yields
    /// the same snapshot. Tables the source does not hold scan as empty.
    /// Any underlying iterator is acquired and released within the call.
    fn scan(&self, table: &str) -> Result<Vec<(String, KeyRecord)>, IndexingError>;
}

impl KeyTableSource for KeyStore {
    fn scan(&self, table: &str) -> Result<Vec<(String, KeyRecord)>, IndexingError> {
        if table != CF_KEY_TABLE {
            debug!(table = %table, "Key store does not hold this table");
            return Ok(Vec::new());
        }
        Ok(self.iter_keys()?)
    }
}

/// In-memory key table for tests and small fixtures.
#[derive(Debug, Default)]
pub struct InMemoryKeyTable {
    tables: HashMap<String, BTreeMap<String, KeyRecord>>,
}

impl InMemoryKeyTable {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record into the named table
    pub fn insert(&mut self, table: impl Into<String>, key: impl Into<String>, record: KeyRecord) {
        self.tables
            .entry(table.into())
            .or_default()
            .insert(key.into(), record);
    }

    /// Remove a record from the named table
    pub fn remove(&mut self, table: &str, key: &str) -> Option<KeyRecord> {
        self.tables.get_mut(table)?.remove(key)
    }

    /// Number of records in the named table
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.len())
    }

    /// Whether the named table is empty
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

impl KeyTableSource for InMemoryKeyTable {
    fn scan(&self, table: &str) -> Result<Vec<(String, KeyRecord)>, IndexingError> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cindex_types::{LocationEntry, LocationGroup};
    use tempfile::TempDir;

    fn sample_record(name: &str) -> KeyRecord {
        KeyRecord::new(name).with_group(LocationGroup::new(0, vec![LocationEntry::new(10, 1)]))
    }

    #[test]
    fn test_in_memory_scan_sorted() {
        let mut source = InMemoryKeyTable::new();
        source.insert("key_table", "b", sample_record("b"));
        source.insert("key_table", "a", sample_record("a"));

        let keys: Vec<_> = source
            .scan("key_table")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_in_memory_unknown_table_is_empty() {
        let source = InMemoryKeyTable::new();
        assert!(source.scan("other_table").unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_scan_is_restartable() {
        let mut source = InMemoryKeyTable::new();
        source.insert("key_table", "a", sample_record("a"));

        let first = source.scan("key_table").unwrap();
        let second = source.scan("key_table").unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_key_store_scan() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::open(temp_dir.path()).unwrap();
        store.put_key("k1", &sample_record("k1")).unwrap();

        let scanned = store.scan(CF_KEY_TABLE).unwrap();
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].0, "k1");

        assert!(store.scan("not_a_table").unwrap().is_empty());
    }
}
