//! Primary key-table store.
//!
//! A snapshot of the primary metadata store's key table, backed by its own
//! RocksDB instance. The indexer only ever reads it; the put/delete side
//! exists for the writer system that produces the snapshot (and for test
//! fixtures).

use rocksdb::{IteratorMode, Options, DB};
use std::path::Path;
use tracing::info;

use cindex_types::KeyRecord;

use crate::column_families::{build_key_store_cf_descriptors, CF_KEY_TABLE};
use crate::error::StorageError;

/// Snapshot of the primary key table.
pub struct KeyStore {
    db: DB,
}

impl KeyStore {
    /// Open the key table at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening key table at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors = build_key_store_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_KEY_TABLE)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_KEY_TABLE.to_string()))
    }

    /// Store one key record under its key name
    pub fn put_key(&self, key: &str, record: &KeyRecord) -> Result<(), StorageError> {
        let cf = self.cf()?;
        let bytes = record
            .to_bytes()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.db.put_cf(&cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Get one key record by key name
    pub fn get_key(&self, key: &str) -> Result<Option<KeyRecord>, StorageError> {
        let cf = self.cf()?;
        match self.db.get_cf(&cf, key.as_bytes())? {
            Some(bytes) => {
                let record = KeyRecord::from_bytes(&bytes)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Delete one key record
    pub fn delete_key(&self, key: &str) -> Result<(), StorageError> {
        let cf = self.cf()?;
        self.db.delete_cf(&cf, key.as_bytes())?;
        Ok(())
    }

    /// Iterate every key record in the table's native order.
    ///
    /// Returns (key name, record) pairs. The iterator is acquired and
    /// released within this call.
    pub fn iter_keys(&self) -> Result<Vec<(String, KeyRecord)>, StorageError> {
        let cf = self.cf()?;

        let mut results = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        for item in iter {
            let (key, value) = item?;
            let key_name = std::str::from_utf8(&key)
                .map_err(|e| StorageError::Key(format!("Invalid UTF-8 key: {}", e)))?
                .to_string();
            let record = KeyRecord::from_bytes(&value)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            results.push((key_name, record));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cindex_types::{LocationEntry, LocationGroup};
    use tempfile::TempDir;

    fn create_test_store() -> (KeyStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn sample_record(name: &str) -> KeyRecord {
        KeyRecord::new(name).with_group(LocationGroup::new(0, vec![LocationEntry::new(10, 1)]))
    }

    #[test]
    fn test_put_and_get_key() {
        let (store, _temp) = create_test_store();

        let record = sample_record("k1");
        store.put_key("k1", &record).unwrap();

        let retrieved = store.get_key("k1").unwrap();
        assert_eq!(retrieved, Some(record));
        assert_eq!(store.get_key("missing").unwrap(), None);
    }

    #[test]
    fn test_delete_key() {
        let (store, _temp) = create_test_store();

        store.put_key("k1", &sample_record("k1")).unwrap();
        store.delete_key("k1").unwrap();
        assert!(store.get_key("k1").unwrap().is_none());
    }

    #[test]
    fn test_iter_keys_native_order() {
        let (store, _temp) = create_test_store();

        store.put_key("b", &sample_record("b")).unwrap();
        store.put_key("a", &sample_record("a")).unwrap();
        store.put_key("c", &sample_record("c")).unwrap();

        let keys: Vec<_> = store
            .iter_keys()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
