//! Column family definitions for RocksDB.
//!
//! The derived index keeps each concern in its own column family:
//! - container_key: (container, key, version) -> use count
//! - container_key_count: container -> number of distinct keys
//! - global_stats: named global counters (currently the container total)
//!
//! The primary key table lives in a separate database with a single
//! column family; the indexer only ever reads it.

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for container -> key mappings
pub const CF_CONTAINER_KEY: &str = "container_key";

/// Column family name for per-container key counts
pub const CF_CONTAINER_KEY_COUNT: &str = "container_key_count";

/// Column family name for global counters
pub const CF_GLOBAL_STATS: &str = "global_stats";

/// Column family name for the primary key table
pub const CF_KEY_TABLE: &str = "key_table";

/// All derived-index column family names
pub const INDEX_CF_NAMES: &[&str] = &[CF_CONTAINER_KEY, CF_CONTAINER_KEY_COUNT, CF_GLOBAL_STATS];

/// Build column family descriptors for the derived-index database
pub fn build_index_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_CONTAINER_KEY, Options::default()),
        ColumnFamilyDescriptor::new(CF_CONTAINER_KEY_COUNT, Options::default()),
        ColumnFamilyDescriptor::new(CF_GLOBAL_STATS, Options::default()),
    ]
}

/// Build column family descriptors for the primary key-table database
pub fn build_key_store_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![ColumnFamilyDescriptor::new(CF_KEY_TABLE, Options::default())]
}
