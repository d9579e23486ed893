//! Container-key mapper: maintains the reverse container -> key index.
//!
//! The mapper owns the entire write path into the derived index. Both
//! maintenance modes funnel every key through the same two primitives:
//! `index_key` (insert expansion) and `deindex_key` (removal), so the
//! idempotency and counter invariants live in exactly one place.
//!
//! Concurrency contract: at most one of `rebuild`/`apply` may run at a
//! time against a given [`IndexStore`]. The mapper does no locking of its
//! own; callers serialize task invocations.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use cindex_storage::{ContainerKeyPrefix, IndexStore};
use cindex_types::{KeyRecord, UpdateAction, UpdateEvent, UpdateEventBatch};

use crate::config::MapperConfig;
use crate::error::IndexingError;
use crate::source::KeyTableSource;
use crate::task::{IndexTask, TaskResult};

/// Task identifier reported in every [`TaskResult`]
pub const TASK_NAME: &str = "container_key_mapper";

/// Maintains the container -> key mapping table and its aggregate
/// counters from the primary store's key table.
pub struct ContainerKeyMapper {
    store: Arc<IndexStore>,
    config: MapperConfig,
}

impl ContainerKeyMapper {
    /// Create a mapper with the default configuration
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self::with_config(store, MapperConfig::default())
    }

    /// Create a mapper with an explicit configuration
    pub fn with_config(store: Arc<IndexStore>, config: MapperConfig) -> Self {
        Self { store, config }
    }

    /// The derived-index store this mapper writes to
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Re-derive the whole index from a full scan of the primary store.
    ///
    /// Clears the mapping table and counters first, then indexes every
    /// key record the source yields. Not transactional: on failure the
    /// index is left in whatever partial state it reached and the caller
    /// retries a full rebuild.
    pub fn rebuild(&self, source: &dyn KeyTableSource) -> TaskResult {
        info!(task = TASK_NAME, "Starting full rebuild of the container-key index");
        let start = Instant::now();

        match self.try_rebuild(source) {
            Ok(keys) => {
                info!(
                    task = TASK_NAME,
                    keys,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Completed container-key index rebuild"
                );
                TaskResult::success(TASK_NAME)
            }
            Err(e) => {
                error!(task = TASK_NAME, error = %e, "Unable to rebuild the container-key index");
                TaskResult::failure(TASK_NAME)
            }
        }
    }

    fn try_rebuild(&self, source: &dyn KeyTableSource) -> Result<u64, IndexingError> {
        self.store.reinit()?;

        let mut keys = 0u64;
        for table in &self.config.tracked_tables {
            for (key, record) in source.scan(table)? {
                self.index_key(&key, &record)?;
                keys += 1;
                if keys as usize % self.config.progress_interval.max(1) == 0 {
                    info!(task = TASK_NAME, keys, "Rebuild progress");
                }
            }
        }
        Ok(keys)
    }

    /// Apply an ordered batch of change events from the primary store.
    ///
    /// Events for tables this mapper does not track are ignored. A
    /// failure on any event aborts the batch; events applied before the
    /// failing one are not rolled back, so a failed batch must be
    /// re-delivered or resolved by a full rebuild.
    pub fn apply(&self, batch: &UpdateEventBatch) -> TaskResult {
        match self.try_apply(batch) {
            Ok((processed, skipped)) => {
                info!(
                    task = TASK_NAME,
                    processed, skipped, "Applied update event batch"
                );
                TaskResult::success(TASK_NAME)
            }
            Err(_) => TaskResult::failure(TASK_NAME),
        }
    }

    fn try_apply(&self, batch: &UpdateEventBatch) -> Result<(u64, u64), IndexingError> {
        let mut processed = 0u64;
        let mut skipped = 0u64;

        for event in batch.iter() {
            if !self.config.tracked_tables.contains(&event.table) {
                continue;
            }
            match self.apply_event(event) {
                Ok(true) => processed += 1,
                Ok(false) => skipped += 1,
                Err(e) => {
                    error!(
                        task = TASK_NAME,
                        key = %event.key,
                        action = %event.action,
                        error = %e,
                        "Failed to apply update event"
                    );
                    return Err(e);
                }
            }
        }

        Ok((processed, skipped))
    }

    /// Apply one event. Returns whether the event was actually applied
    /// (false = skipped).
    fn apply_event(&self, event: &UpdateEvent) -> Result<bool, IndexingError> {
        match event.action {
            UpdateAction::Put => match &event.value {
                Some(record) => {
                    self.index_key(&event.key, record)?;
                    Ok(true)
                }
                None => {
                    warn!(key = %event.key, "Put event carries no key record; skipping");
                    Ok(false)
                }
            },
            UpdateAction::Delete => {
                self.deindex_key(&event.key)?;
                Ok(true)
            }
            UpdateAction::Update => {
                // Update is delete-old + insert-new. Without the old value
                // we can only insert, which may leave stale mappings behind.
                match &event.old_value {
                    Some(old) => self.deindex_key(&old.key_name)?,
                    None => {
                        warn!(key = %event.key, "Update event does not have the old key record")
                    }
                }
                match &event.value {
                    Some(record) => {
                        self.index_key(&event.key, record)?;
                        Ok(true)
                    }
                    None => {
                        warn!(key = %event.key, "Update event carries no new key record");
                        Ok(false)
                    }
                }
            }
            UpdateAction::Unknown => {
                debug!(key = %event.key, "Skipping update event with unrecognized action");
                Ok(false)
            }
        }
    }

    /// Index one key record: expand it into `(container, key, version)`
    /// triples and write every triple not already present.
    ///
    /// An existing mapping is left untouched, which makes replays and
    /// redundant puts no-ops for both the mapping table and the counters.
    /// Global-count increments are batched per key record; the container
    /// existence check keys off the count table, so a container first seen
    /// earlier in this same record is not counted twice.
    fn index_key(&self, key: &str, record: &KeyRecord) -> Result<(), IndexingError> {
        let mut containers_to_add = 0u64;

        for group in &record.location_groups {
            let version = group.version;
            for location in &group.locations {
                let container_id = location.container_id;
                let prefix = ContainerKeyPrefix::new(container_id, key, version);

                if self.store.mapping_count(&prefix)? > 0 {
                    continue;
                }
                self.store.put_mapping(&prefix, 1)?;

                if !self.store.container_exists(container_id)? {
                    containers_to_add += 1;
                }

                let key_count = self.store.key_count_for_container(container_id)?;
                self.store.store_key_count(container_id, key_count + 1)?;
            }
        }

        if containers_to_add > 0 {
            self.store.increment_container_count_by(containers_to_add)?;
        }
        Ok(())
    }

    /// Remove every mapping referencing the given key identifier and
    /// decrement the affected containers' key counts, once per removed
    /// mapping, never below zero.
    ///
    /// This is a full scan of the mapping table: the physical key layout
    /// is container-first, so mappings for one key are not contiguous.
    /// The global container count is intentionally not retracted here.
    fn deindex_key(&self, key: &str) -> Result<(), IndexingError> {
        let mut to_delete = Vec::new();
        for (prefix, _) in self.store.iter_mappings()? {
            if prefix.key_prefix == key {
                to_delete.push(prefix);
            }
        }

        for prefix in &to_delete {
            self.store.delete_mapping(prefix)?;

            let key_count = self.store.key_count_for_container(prefix.container_id)?;
            if key_count > 0 {
                self.store.store_key_count(prefix.container_id, key_count - 1)?;
            }
        }

        debug!(key = %key, removed = to_delete.len(), "De-indexed key");
        Ok(())
    }
}

impl IndexTask for ContainerKeyMapper {
    fn task_name(&self) -> &str {
        TASK_NAME
    }

    fn task_tables(&self) -> &[String] {
        &self.config.tracked_tables
    }

    fn rebuild(&self, source: &dyn KeyTableSource) -> TaskResult {
        ContainerKeyMapper::rebuild(self, source)
    }

    fn apply(&self, batch: &UpdateEventBatch) -> TaskResult {
        ContainerKeyMapper::apply(self, batch)
    }
}
