//! Key encoding and decoding for the derived-index column families.
//!
//! Mapping key format: `{container_id:be64}{key_prefix}{version:be64}`
//! - container_id first so all mappings for one container are contiguous
//!   and reachable by prefix iteration
//! - version last, fixed width, so decoding needs no delimiter: the first
//!   8 bytes are the container, the last 8 the version, the middle the key
//!
//! Counter keys are the bare big-endian container id (per-container key
//! counts) or a short ASCII name (global counters).

use crate::error::StorageError;

/// Width of the fixed-size head (container id) and tail (version)
const FIXED_BYTES: usize = 8;

/// Key under `global_stats` holding the total number of containers
/// ever observed in the derived index.
pub const CONTAINER_COUNT_KEY: &[u8] = b"container_count";

/// Composite key for one mapping record: "this container holds this key
/// at this version".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerKeyPrefix {
    /// Container holding the data
    pub container_id: u64,
    /// Key identifier, exactly as the primary store names it
    pub key_prefix: String,
    /// Placement version the mapping belongs to
    pub version: u64,
}

impl ContainerKeyPrefix {
    /// Create a new mapping key
    pub fn new(container_id: u64, key_prefix: impl Into<String>, version: u64) -> Self {
        Self {
            container_id,
            key_prefix: key_prefix.into(),
            version,
        }
    }

    /// Encode to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        let key = self.key_prefix.as_bytes();
        let mut bytes = Vec::with_capacity(2 * FIXED_BYTES + key.len());
        bytes.extend_from_slice(&self.container_id.to_be_bytes());
        bytes.extend_from_slice(key);
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes
    }

    /// Decode from stored bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        if bytes.len() < 2 * FIXED_BYTES {
            return Err(StorageError::Key(format!(
                "Mapping key too short: {} bytes",
                bytes.len()
            )));
        }

        let (head, rest) = bytes.split_at(FIXED_BYTES);
        let (middle, tail) = rest.split_at(rest.len() - FIXED_BYTES);

        let container_id = u64::from_be_bytes(head.try_into().expect("8-byte head"));
        let version = u64::from_be_bytes(tail.try_into().expect("8-byte tail"));
        let key_prefix = std::str::from_utf8(middle)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8 in mapping key: {}", e)))?
            .to_string();

        Ok(Self {
            container_id,
            key_prefix,
            version,
        })
    }

    /// Prefix matching every mapping for one container
    pub fn container_prefix(container_id: u64) -> Vec<u8> {
        container_id.to_be_bytes().to_vec()
    }
}

/// Encode a per-container counter key
pub fn container_count_key(container_id: u64) -> [u8; 8] {
    container_id.to_be_bytes()
}

/// Encode a u64 counter value
pub fn encode_count(count: u64) -> [u8; 8] {
    count.to_be_bytes()
}

/// Decode a u64 counter value; absent or short values read as 0
pub fn decode_count(bytes: &[u8]) -> u64 {
    match bytes.try_into() {
        Ok(arr) => u64::from_be_bytes(arr),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_key_roundtrip() {
        let key = ContainerKeyPrefix::new(42, "vol1/bucket1/key1", 3);
        let bytes = key.to_bytes();
        let decoded = ContainerKeyPrefix::from_bytes(&bytes).unwrap();
        assert_eq!(key, decoded);
    }

    #[test]
    fn test_mapping_key_empty_key_prefix() {
        let key = ContainerKeyPrefix::new(1, "", 0);
        let decoded = ContainerKeyPrefix::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(decoded.key_prefix, "");
        assert_eq!(decoded.container_id, 1);
    }

    #[test]
    fn test_mapping_key_too_short() {
        let result = ContainerKeyPrefix::from_bytes(&[0u8; 15]);
        assert!(matches!(result, Err(StorageError::Key(_))));
    }

    #[test]
    fn test_container_prefix_orders_by_container() {
        let a = ContainerKeyPrefix::new(1, "zzz", 9).to_bytes();
        let b = ContainerKeyPrefix::new(2, "aaa", 0).to_bytes();
        assert!(a < b);
        assert!(a.starts_with(&ContainerKeyPrefix::container_prefix(1)));
        assert!(!b.starts_with(&ContainerKeyPrefix::container_prefix(1)));
    }

    #[test]
    fn test_count_codec() {
        assert_eq!(decode_count(&encode_count(0)), 0);
        assert_eq!(decode_count(&encode_count(u64::MAX)), u64::MAX);
        assert_eq!(decode_count(b"bad"), 0);
    }
}
