//! Storage layer for the container-key index system.
//!
//! Two RocksDB-backed stores:
//! - [`IndexStore`]: the derived index (mapping table plus aggregate
//!   counters), owned and mutated exclusively by the indexer
//! - [`KeyStore`]: a read-side snapshot of the primary key table, scanned
//!   by full rebuild runs
//!
//! Key codecs live in [`keys`], column family layout in
//! [`column_families`].

pub mod column_families;
pub mod db;
pub mod error;
pub mod key_store;
pub mod keys;

pub use column_families::{
    CF_CONTAINER_KEY, CF_CONTAINER_KEY_COUNT, CF_GLOBAL_STATS, CF_KEY_TABLE,
};
pub use db::{IndexStore, IndexStoreStats};
pub use error::StorageError;
pub use key_store::KeyStore;
pub use keys::ContainerKeyPrefix;
