//! RocksDB wrapper for the derived container-key index.
//!
//! Provides:
//! - Database open with column family setup
//! - Point reads/writes/deletes on the mapping table
//! - Per-container and global counter maintenance
//! - Full reinitialization for rebuild runs
//!
//! The store owns nothing but derived state: every record here can be
//! reconstructed from a full scan of the primary key table.

use rocksdb::{IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use tracing::{debug, info};

use crate::column_families::{
    build_index_cf_descriptors, CF_CONTAINER_KEY, CF_CONTAINER_KEY_COUNT, CF_GLOBAL_STATS,
    INDEX_CF_NAMES,
};
use crate::error::StorageError;
use crate::keys::{
    container_count_key, decode_count, encode_count, ContainerKeyPrefix, CONTAINER_COUNT_KEY,
};

/// Derived-index store: container -> key mappings plus aggregate counters.
///
/// Writes are synchronous and individually durable: each call returns only
/// once RocksDB has accepted the write. The store performs no internal
/// locking; callers serialize rebuild/apply invocations externally.
pub struct IndexStore {
    db: DB,
}

impl IndexStore {
    /// Open the derived-index store at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening derived-index store at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors = build_index_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(name.to_string()))
    }

    // ==================== Mapping Table ====================

    /// Store one mapping record with the given use count
    pub fn put_mapping(&self, prefix: &ContainerKeyPrefix, count: u64) -> Result<(), StorageError> {
        let cf = self.cf(CF_CONTAINER_KEY)?;
        self.db.put_cf(&cf, prefix.to_bytes(), encode_count(count))?;
        Ok(())
    }

    /// Get the use count for one mapping record; 0 when the record is absent
    pub fn mapping_count(&self, prefix: &ContainerKeyPrefix) -> Result<u64, StorageError> {
        let cf = self.cf(CF_CONTAINER_KEY)?;
        match self.db.get_cf(&cf, prefix.to_bytes())? {
            Some(bytes) => Ok(decode_count(&bytes)),
            None => Ok(0),
        }
    }

    /// Delete one mapping record
    pub fn delete_mapping(&self, prefix: &ContainerKeyPrefix) -> Result<(), StorageError> {
        let cf = self.cf(CF_CONTAINER_KEY)?;
        self.db.delete_cf(&cf, prefix.to_bytes())?;
        Ok(())
    }

    /// Whether the given container has ever been observed by the index.
    ///
    /// Checks for a persisted key-count record, which outlives the
    /// container's mappings: deletes decrement the count but never remove
    /// the record. A container that drained to zero keys still "exists"
    /// here, so the global container count is not re-incremented when keys
    /// return to it.
    pub fn container_exists(&self, container_id: u64) -> Result<bool, StorageError> {
        let cf = self.cf(CF_CONTAINER_KEY_COUNT)?;
        Ok(self
            .db
            .get_cf(&cf, container_count_key(container_id))?
            .is_some())
    }

    /// Iterate the whole mapping table.
    ///
    /// Returns (key, count) pairs in key order. This is a full scan; the
    /// de-index path depends on exactly this behavior.
    pub fn iter_mappings(&self) -> Result<Vec<(ContainerKeyPrefix, u64)>, StorageError> {
        let cf = self.cf(CF_CONTAINER_KEY)?;

        let mut results = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        for item in iter {
            let (key, value) = item?;
            let prefix = ContainerKeyPrefix::from_bytes(&key)?;
            results.push((prefix, decode_count(&value)));
        }

        Ok(results)
    }

    // ==================== Counters ====================

    /// Number of mapping records referencing the given container;
    /// 0 when the container has never been counted
    pub fn key_count_for_container(&self, container_id: u64) -> Result<u64, StorageError> {
        let cf = self.cf(CF_CONTAINER_KEY_COUNT)?;
        match self.db.get_cf(&cf, container_count_key(container_id))? {
            Some(bytes) => Ok(decode_count(&bytes)),
            None => Ok(0),
        }
    }

    /// Persist the key count for the given container
    pub fn store_key_count(&self, container_id: u64, count: u64) -> Result<(), StorageError> {
        let cf = self.cf(CF_CONTAINER_KEY_COUNT)?;
        self.db
            .put_cf(&cf, container_count_key(container_id), encode_count(count))?;
        Ok(())
    }

    /// Total number of containers ever observed in the derived index.
    ///
    /// This counter only grows: removing a container's last key does not
    /// retract its contribution (ever-referenced semantic).
    pub fn container_count(&self) -> Result<u64, StorageError> {
        let cf = self.cf(CF_GLOBAL_STATS)?;
        match self.db.get_cf(&cf, CONTAINER_COUNT_KEY)? {
            Some(bytes) => Ok(decode_count(&bytes)),
            None => Ok(0),
        }
    }

    /// Overwrite the global container count
    pub fn store_container_count(&self, count: u64) -> Result<(), StorageError> {
        let cf = self.cf(CF_GLOBAL_STATS)?;
        self.db.put_cf(&cf, CONTAINER_COUNT_KEY, encode_count(count))?;
        Ok(())
    }

    /// Add `n` to the global container count
    pub fn increment_container_count_by(&self, n: u64) -> Result<(), StorageError> {
        let current = self.container_count()?;
        self.store_container_count(current + n)?;
        debug!(added = n, total = current + n, "Incremented container count");
        Ok(())
    }

    // ==================== Lifecycle ====================

    /// Clear the mapping table and every counter.
    ///
    /// Rebuild runs call this first so no stale records survive from a
    /// prior state. Deletes are batched per column family.
    pub fn reinit(&self) -> Result<(), StorageError> {
        for cf_name in INDEX_CF_NAMES {
            let cf = self.cf(cf_name)?;

            let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
            let mut batch = WriteBatch::default();
            let mut count = 0u64;
            for item in iter {
                let (key, _) = item?;
                batch.delete_cf(&cf, &key);
                count += 1;
            }

            if count > 0 {
                self.db.write(batch)?;
                debug!(cf = %cf_name, deleted = count, "Cleared column family");
            }
        }
        info!("Derived-index store reinitialized");
        Ok(())
    }

    /// Get entry counts per column family
    pub fn stats(&self) -> Result<IndexStoreStats, StorageError> {
        let mut stats = IndexStoreStats::default();

        stats.mapping_count = self.count_cf_entries(CF_CONTAINER_KEY)?;
        stats.counted_containers = self.count_cf_entries(CF_CONTAINER_KEY_COUNT)?;
        stats.container_count = self.container_count()?;

        Ok(stats)
    }

    fn count_cf_entries(&self, cf_name: &str) -> Result<u64, StorageError> {
        let cf = self.cf(cf_name)?;
        let mut count = 0u64;
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        for item in iter {
            item?;
            count += 1;
        }
        Ok(count)
    }
}

/// Statistics about the derived-index store.
#[derive(Debug, Default)]
pub struct IndexStoreStats {
    /// Number of mapping records
    pub mapping_count: u64,
    /// Number of containers with a persisted key count
    pub counted_containers: u64,
    /// Global container count
    pub container_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (IndexStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_open_creates_column_families() {
        let (store, _temp) = create_test_store();
        for cf_name in INDEX_CF_NAMES {
            assert!(
                store.db.cf_handle(cf_name).is_some(),
                "CF {} should exist",
                cf_name
            );
        }
    }

    #[test]
    fn test_mapping_roundtrip() {
        let (store, _temp) = create_test_store();
        let prefix = ContainerKeyPrefix::new(10, "k1", 0);

        assert_eq!(store.mapping_count(&prefix).unwrap(), 0);

        store.put_mapping(&prefix, 1).unwrap();
        assert_eq!(store.mapping_count(&prefix).unwrap(), 1);

        store.delete_mapping(&prefix).unwrap();
        assert_eq!(store.mapping_count(&prefix).unwrap(), 0);
    }

    #[test]
    fn test_container_exists() {
        let (store, _temp) = create_test_store();

        assert!(!store.container_exists(10).unwrap());

        store.store_key_count(10, 1).unwrap();
        assert!(store.container_exists(10).unwrap());
        assert!(!store.container_exists(9).unwrap());
        assert!(!store.container_exists(11).unwrap());

        // A drained container still exists: the count record survives at 0
        store.store_key_count(10, 0).unwrap();
        assert!(store.container_exists(10).unwrap());
    }

    #[test]
    fn test_iter_mappings_in_key_order() {
        let (store, _temp) = create_test_store();

        store
            .put_mapping(&ContainerKeyPrefix::new(20, "k1", 0), 1)
            .unwrap();
        store
            .put_mapping(&ContainerKeyPrefix::new(10, "k2", 1), 1)
            .unwrap();
        store
            .put_mapping(&ContainerKeyPrefix::new(10, "k1", 0), 1)
            .unwrap();

        let mappings = store.iter_mappings().unwrap();
        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings[0].0.container_id, 10);
        assert_eq!(mappings[0].0.key_prefix, "k1");
        assert_eq!(mappings[2].0.container_id, 20);
    }

    #[test]
    fn test_key_count_roundtrip() {
        let (store, _temp) = create_test_store();

        assert_eq!(store.key_count_for_container(7).unwrap(), 0);
        store.store_key_count(7, 3).unwrap();
        assert_eq!(store.key_count_for_container(7).unwrap(), 3);
    }

    #[test]
    fn test_container_count_increments() {
        let (store, _temp) = create_test_store();

        assert_eq!(store.container_count().unwrap(), 0);
        store.increment_container_count_by(2).unwrap();
        store.increment_container_count_by(1).unwrap();
        assert_eq!(store.container_count().unwrap(), 3);
    }

    #[test]
    fn test_reinit_clears_everything() {
        let (store, _temp) = create_test_store();

        store
            .put_mapping(&ContainerKeyPrefix::new(10, "k1", 0), 1)
            .unwrap();
        store.store_key_count(10, 1).unwrap();
        store.increment_container_count_by(1).unwrap();

        store.reinit().unwrap();

        assert!(store.iter_mappings().unwrap().is_empty());
        assert_eq!(store.key_count_for_container(10).unwrap(), 0);
        assert_eq!(store.container_count().unwrap(), 0);
    }

    #[test]
    fn test_stats() {
        let (store, _temp) = create_test_store();

        store
            .put_mapping(&ContainerKeyPrefix::new(10, "k1", 0), 1)
            .unwrap();
        store
            .put_mapping(&ContainerKeyPrefix::new(20, "k1", 0), 1)
            .unwrap();
        store.store_key_count(10, 1).unwrap();
        store.store_key_count(20, 1).unwrap();
        store.increment_container_count_by(2).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.mapping_count, 2);
        assert_eq!(stats.counted_containers, 2);
        assert_eq!(stats.container_count, 2);
    }
}
