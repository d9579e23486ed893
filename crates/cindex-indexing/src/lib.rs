//! Derived-index maintenance for the container-key index system.
//!
//! This crate keeps a reverse index (container -> contained keys, plus
//! aggregate counts) consistent with the primary key table as it evolves.
//!
//! ## Key Components
//!
//! - [`ContainerKeyMapper`]: the indexer; owns the write path into the
//!   derived index
//! - [`KeyTableSource`]: read-only seam to the primary store's key table
//! - [`IndexTask`] / [`TaskResult`]: the task surface exposed to the
//!   surrounding framework
//! - [`MapperConfig`]: tracked tables and progress reporting
//! - [`IndexingError`]: error types for indexing operations
//!
//! ## Operating modes
//!
//! 1. `rebuild(source)` scans the entire key table once and re-derives
//!    the index from scratch (clearing it first)
//! 2. `apply(batch)` consumes an ordered stream of put/delete/update
//!    events and updates the index in place, without rescanning
//!
//! Both modes funnel every key through the same index/de-index
//! primitives, so the idempotency and counter invariants hold on either
//! path.
//!
//! ## Example
//!
//! ```ignore
//! use cindex_indexing::{ContainerKeyMapper, MapperConfig};
//!
//! let mapper = ContainerKeyMapper::new(store);
//! let result = mapper.rebuild(&key_table);
//! assert!(result.success);
//!
//! let result = mapper.apply(&batch);
//! assert!(result.success);
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod source;
pub mod task;

pub use config::MapperConfig;
pub use error::IndexingError;
pub use mapper::{ContainerKeyMapper, TASK_NAME};
pub use source::{InMemoryKeyTable, KeyTableSource};
pub use task::{IndexTask, TaskResult};
