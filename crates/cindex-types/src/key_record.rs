//! Key record types for the primary metadata store.
//!
//! A key record describes where the data for one logical key physically
//! lives: an ordered list of location groups (one per write version), each
//! naming the containers that hold a replica or chunk of that version.

use serde::{Deserialize, Serialize};

/// One physical placement within a location group.
///
/// Identifies the container holding a replica/chunk, plus the block's
/// local id inside that container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Container holding this replica/chunk
    pub container_id: u64,

    /// Block id local to the container
    pub local_id: u64,
}

impl LocationEntry {
    /// Create a new location entry
    pub fn new(container_id: u64, local_id: u64) -> Self {
        Self {
            container_id,
            local_id,
        }
    }
}

/// One version-generation of a key's physical placement.
///
/// Versions increase monotonically; a new group is appended on each
/// overwrite of the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationGroup {
    /// Version number of this placement set
    pub version: u64,

    /// Containers holding the data for this version, in write order
    pub locations: Vec<LocationEntry>,
}

impl LocationGroup {
    /// Create a new location group
    pub fn new(version: u64, locations: Vec<LocationEntry>) -> Self {
        Self { version, locations }
    }
}

/// A logical key tracked by the primary metadata store.
///
/// Key records are the unit the indexer expands: each
/// `(location group, location entry)` pair yields one
/// `(container, key, version)` mapping in the derived index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Unique key identifier, in the same string form the primary store
    /// uses as its table key
    pub key_name: String,

    /// Ordered placement history, oldest version first
    #[serde(default)]
    pub location_groups: Vec<LocationGroup>,
}

impl KeyRecord {
    /// Create a key record with no placement data
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            location_groups: Vec::new(),
        }
    }

    /// Append a location group
    pub fn with_group(mut self, group: LocationGroup) -> Self {
        self.location_groups.push(group);
        self
    }

    /// Total number of `(container, key, version)` triples this record
    /// expands to
    pub fn location_count(&self) -> usize {
        self.location_groups.iter().map(|g| g.locations.len()).sum()
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_record_roundtrip() {
        let record = KeyRecord::new("vol1/bucket1/key1")
            .with_group(LocationGroup::new(
                0,
                vec![LocationEntry::new(10, 1), LocationEntry::new(20, 2)],
            ))
            .with_group(LocationGroup::new(1, vec![LocationEntry::new(10, 3)]));

        let bytes = record.to_bytes().unwrap();
        let decoded = KeyRecord::from_bytes(&bytes).unwrap();

        assert_eq!(record, decoded);
    }

    #[test]
    fn test_location_count() {
        let record = KeyRecord::new("k")
            .with_group(LocationGroup::new(
                0,
                vec![LocationEntry::new(1, 0), LocationEntry::new(2, 0)],
            ))
            .with_group(LocationGroup::new(1, vec![LocationEntry::new(3, 0)]));

        assert_eq!(record.location_count(), 3);
    }

    #[test]
    fn test_empty_record() {
        let record = KeyRecord::new("empty");
        assert_eq!(record.location_count(), 0);

        let bytes = record.to_bytes().unwrap();
        let decoded = KeyRecord::from_bytes(&bytes).unwrap();
        assert!(decoded.location_groups.is_empty());
    }

    #[test]
    fn test_missing_groups_field_defaults_empty() {
        let decoded = KeyRecord::from_bytes(br#"{"key_name":"k1"}"#).unwrap();
        assert_eq!(decoded.key_name, "k1");
        assert!(decoded.location_groups.is_empty());
    }
}
