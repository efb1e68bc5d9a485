//! Value types flowing through the harness
//!
//! - Row: one insert payload (primary key + named columns)
//! - InsertStatus: result of handing a row to the session
//! - WorkerStats: per-worker counters, aggregated by the orchestrator

use serde::Serialize;
use std::fmt;

/// One row to be inserted: a primary key plus named column values.
///
/// Rows are immutable once built. A worker constructs a row when it decides
/// to perform an insert and the row is consumed when the session flushes it
/// into a transaction's write set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    key: String,
    columns: Vec<(String, String)>,
}

impl Row {
    /// Create a row with the given primary key and no columns.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column value (builder style).
    pub fn column(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Primary key of this row.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Column name/value pairs in insertion order.
    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} columns)", self.key, self.columns.len())
    }
}

/// Outcome of a buffered insert.
///
/// The error arm of the original tri-state status lives in `Result`; see
/// `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    /// Row was appended to the mutation buffer; no store call was made yet.
    Batched,
    /// The buffer reached capacity and was handed to the open transaction's
    /// write set. Not yet durable: an explicit commit still follows.
    Committed,
}

/// Per-worker counters.
///
/// Owned and written by exactly one worker; the orchestrator reads them
/// only after joining that worker's thread, so no synchronization is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// Loop iterations completed (attempted operations, not durable writes).
    pub ops_done: u64,
    /// Number of contention aborts observed at commit time.
    pub aborted: u64,
    /// Cleanup flushes that terminally failed, leaving rows unwritten.
    pub flush_failures: u64,
}

impl WorkerStats {
    /// Fold another worker's counters into this one.
    pub fn merge(&mut self, other: &WorkerStats) {
        self.ops_done += other.ops_done;
        self.aborted += other.aborted;
        self.flush_failures += other.flush_failures;
    }
}

impl fmt::Display for WorkerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ops, {} aborts, {} flush failures",
            self.ops_done, self.aborted, self.flush_failures
        )
    }
}
