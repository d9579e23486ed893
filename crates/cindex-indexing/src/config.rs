//! Mapper configuration.

use cindex_storage::CF_KEY_TABLE;

/// Configuration for the container-key mapper.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Primary-store tables whose events this mapper consumes.
    pub tracked_tables: Vec<String>,
    /// Number of keys between rebuild progress logs. Observability only;
    /// a value of 0 behaves like 1.
    pub progress_interval: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            tracked_tables: vec![CF_KEY_TABLE.to_string()],
            progress_interval: 100_000,
        }
    }
}

impl MapperConfig {
    /// Set the tracked tables
    pub fn with_tracked_tables(mut self, tables: Vec<String>) -> Self {
        self.tracked_tables = tables;
        self
    }

    /// Set the progress log interval
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tracks_key_table() {
        let config = MapperConfig::default();
        assert_eq!(config.tracked_tables, vec!["key_table".to_string()]);
        assert_eq!(config.progress_interval, 100_000);
    }

    #[test]
    fn test_builder() {
        let config = MapperConfig::default()
            .with_tracked_tables(vec!["other".to_string()])
            .with_progress_interval(0);

        assert_eq!(config.tracked_tables, vec!["other".to_string()]);
        // Interval is floored at 1 to keep the modulo progress check valid
        assert_eq!(config.progress_interval, 1);
    }
}
