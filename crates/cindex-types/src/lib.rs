//! # cindex-types
//!
//! Shared domain types for the container-key index system.
//!
//! This crate defines the core data structures used throughout the system:
//! - Key records: versioned placement metadata for logical keys
//! - Update events: ordered change notifications from the primary store
//!
//! ## Usage
//!
//! ```rust
//! use cindex_types::{KeyRecord, LocationGroup, LocationEntry};
//!
//! let record = KeyRecord::new("vol1/bucket1/key1")
//!     .with_group(LocationGroup::new(0, vec![LocationEntry::new(10, 1)]));
//! assert_eq!(record.location_groups.len(), 1);
//! ```

pub mod event;
pub mod key_record;

pub use event::{UpdateAction, UpdateEvent, UpdateEventBatch};
pub use key_record::{KeyRecord, LocationEntry, LocationGroup};
