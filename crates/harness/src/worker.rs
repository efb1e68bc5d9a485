//! Worker loop
//!
//! One worker runs a fixed budget of insert operations against the store:
//! open a transaction, draw a unique key, buffer the row, commit (or abort
//! and retry in the next iteration), then flush the remaining partial batch
//! at shutdown.
//!
//! `ops_done` counts every iteration, commit success or not, so total
//! wall-clock work stays bounded even under an abort storm; `aborted` is the
//! separate, precise contention signal.

use std::sync::Arc;

use batchbench_core::{KeySequence, Result, Row, TransactionalStore, WorkerStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::session::TransactionSession;

/// Shape of every generated row: key prefix plus the fixed payload columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowTemplate {
    /// Prefix prepended to the sequence number to form the primary key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Name of the primary-key column.
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Name of the payload column.
    #[serde(default = "default_payload_column")]
    pub payload_column: String,
    /// Value written to the payload column of every row.
    #[serde(default = "default_payload_value")]
    pub payload_value: String,
}

fn default_key_prefix() -> String {
    "user".to_string()
}

fn default_key_column() -> String {
    "id".to_string()
}

fn default_payload_column() -> String {
    "field0".to_string()
}

fn default_payload_value() -> String {
    "1000".to_string()
}

impl Default for RowTemplate {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            key_column: default_key_column(),
            payload_column: default_payload_column(),
            payload_value: default_payload_value(),
        }
    }
}

impl RowTemplate {
    /// Build the row for sequence number `n`.
    pub fn build(&self, n: u64) -> Row {
        let key = format!("{}{}", self.key_prefix, n);
        Row::new(key.clone())
            .column(&self.key_column, key)
            .column(&self.payload_column, &self.payload_value)
    }
}

/// Run one worker to completion of its operation budget.
///
/// Initialization failure (the store unreachable before the first
/// operation) makes the worker exit immediately with zero ops done. Inside
/// the loop, contention aborts are counted and retried with a fresh
/// transaction; other errors abort the transaction and are logged, and the
/// iteration still counts as attempted.
pub fn run_worker(
    id: usize,
    store: Arc<dyn TransactionalStore>,
    sequence: Arc<KeySequence>,
    template: &RowTemplate,
    ops_count: u64,
    batch_size: usize,
) -> WorkerStats {
    let mut stats = WorkerStats::default();

    // Init: verify the store is reachable before burning the budget.
    match store.begin() {
        Ok(txn) => txn.close(),
        Err(e) => {
            error!(worker = id, error = %e, "store unreachable during init; exiting with zero ops");
            return stats;
        }
    }

    let mut session = TransactionSession::new(store, batch_size);
    while stats.ops_done < ops_count {
        match run_once(&mut session, &sequence, template) {
            Ok(()) => {}
            Err(e) if e.is_retryable() => {
                stats.aborted += 1;
                debug!(
                    worker = id,
                    buffered = session.buffered(),
                    "transaction aborted; retrying in a fresh transaction"
                );
                session.abort();
            }
            Err(e) => {
                warn!(worker = id, error = %e, "operation failed; aborting transaction");
                session.abort();
            }
        }
        // Attempted, not confirmed-durable: bounds the loop under aborts.
        stats.ops_done += 1;
    }

    if let Err(e) = session.cleanup_flush() {
        stats.flush_failures += 1;
        error!(
            worker = id,
            unflushed = session.buffered(),
            error = %e,
            "cleanup flush failed; remaining rows were not written"
        );
    }

    stats
}

/// One logical operation: fresh transaction, one generated row, commit.
fn run_once(
    session: &mut TransactionSession,
    sequence: &KeySequence,
    template: &RowTemplate,
) -> Result<()> {
    session.start()?;
    let row = template.build(sequence.next_value());
    session.insert(row)?;
    session.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use batchbench_core::{Error, StoreTransaction};

    #[test]
    fn test_template_builds_prefixed_row() {
        let template = RowTemplate::default();
        let row = template.build(42);
        assert_eq!(row.key(), "user42");
        assert_eq!(row.columns()[0], ("id".to_string(), "user42".to_string()));
        assert_eq!(row.columns()[1], ("field0".to_string(), "1000".to_string()));
    }

    #[test]
    fn test_worker_writes_full_budget() {
        let store = Arc::new(MemStore::new("usertable"));
        let sequence = Arc::new(KeySequence::new(0));
        let stats = run_worker(
            0,
            Arc::clone(&store) as Arc<dyn TransactionalStore>,
            sequence,
            &RowTemplate::default(),
            10,
            2,
        );

        assert_eq!(stats.ops_done, 10);
        assert_eq!(stats.aborted, 0);
        assert_eq!(store.row_count(), 10);
    }

    #[test]
    fn test_worker_zero_budget_does_nothing() {
        let store = Arc::new(MemStore::new("usertable"));
        let sequence = Arc::new(KeySequence::new(0));
        let stats = run_worker(
            0,
            Arc::clone(&store) as Arc<dyn TransactionalStore>,
            sequence,
            &RowTemplate::default(),
            0,
            4,
        );

        assert_eq!(stats.ops_done, 0);
        assert_eq!(store.row_count(), 0);
    }

    /// Store that refuses all sessions, for the init-failure path.
    struct DownStore;

    impl TransactionalStore for DownStore {
        fn begin(&self) -> batchbench_core::Result<Box<dyn StoreTransaction>> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_unreachable_store_exits_with_zero_ops() {
        let sequence = Arc::new(KeySequence::new(0));
        let stats = run_worker(
            0,
            Arc::new(DownStore),
            sequence,
            &RowTemplate::default(),
            100,
            4,
        );

        assert_eq!(stats.ops_done, 0);
        assert_eq!(stats.aborted, 0);
    }
}
