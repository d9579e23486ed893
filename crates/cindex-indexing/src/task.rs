//! Task surface shared with the surrounding task framework.
//!
//! Both maintenance paths report the same minimal status: which task ran
//! and whether it succeeded. Anything richer (timings, per-event counts)
//! goes to the log, not the caller.

use cindex_types::UpdateEventBatch;

use crate::source::KeyTableSource;

/// Outcome of one rebuild or apply run.
///
/// There is no partial-success variant: a run either converged or it
/// aborted and the caller owns the retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// Name of the task that produced this result
    pub task_name: String,
    /// Whether the run completed without error
    pub success: bool,
}

impl TaskResult {
    /// Successful result for the named task
    pub fn success(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            success: true,
        }
    }

    /// Failed result for the named task
    pub fn failure(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            success: false,
        }
    }
}

/// A derived-index maintenance task.
///
/// Implementations keep one derived view consistent with the primary
/// store, either by a full rebuild from a snapshot or by consuming an
/// ordered change-event batch. The caller guarantees at most one of the
/// two runs at a time per derived index.
pub trait IndexTask {
    /// Stable task identifier, used in task results and logs
    fn task_name(&self) -> &str;

    /// Primary-store tables this task tracks; events for other tables
    /// are ignored
    fn task_tables(&self) -> &[String];

    /// Re-derive the index from a full scan of the primary store
    fn rebuild(&self, source: &dyn KeyTableSource) -> TaskResult;

    /// Apply an ordered batch of change events
    fn apply(&self, batch: &UpdateEventBatch) -> TaskResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_result_constructors() {
        let ok = TaskResult::success("mapper");
        assert_eq!(ok.task_name, "mapper");
        assert!(ok.success);

        let failed = TaskResult::failure("mapper");
        assert!(!failed.success);
    }
}
