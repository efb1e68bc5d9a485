//! Run orchestration
//!
//! Partitions the total operation budget across workers, spawns one named
//! OS thread per worker sharing a single `KeySequence` and store handle,
//! joins them all, and aggregates their counters into a `RunReport`.
//!
//! No partial results: a worker's stats are read only after its thread has
//! fully exited, so the stats need no synchronization.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use batchbench_core::{Error, KeySequence, Result, TransactionalStore, WorkerStats};
use tracing::{debug, error, info};

use crate::report::RunReport;
use crate::worker::{run_worker, RowTemplate};

/// Configuration for one load-generation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of worker threads (≥ 1).
    pub threads: usize,
    /// Total operations across all workers.
    pub ops: u64,
    /// Rows buffered per transaction before an implicit flush (≥ 1).
    pub batch_size: usize,
    /// First value drawn from the shared key sequence.
    pub starting_key: u64,
    /// Shape of every generated row.
    pub template: RowTemplate,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            ops: 1,
            batch_size: 1,
            starting_key: 0,
            template: RowTemplate::default(),
        }
    }
}

/// Partition `ops` across `workers` as evenly as possible.
///
/// Worker `i` gets `ops / workers`, plus one extra when
/// `i < ops % workers`. The partition is exact: the counts always sum to
/// `ops` and differ by at most one.
///
/// # Panics
///
/// Panics when `workers` is 0; [`run`] validates the thread count first.
pub fn partition(ops: u64, workers: usize) -> Vec<u64> {
    let workers_u64 = workers as u64;
    let base = ops / workers_u64;
    let remainder = (ops % workers_u64) as usize;
    (0..workers)
        .map(|i| base + u64::from(i < remainder))
        .collect()
}

/// Run the full load-generation harness to completion.
///
/// # Errors
///
/// Returns `Error::Config` for an invalid thread count or batch size, and
/// propagates thread-spawn failures. Worker panics do not fail the run;
/// the panicked worker contributes zero stats and is logged.
pub fn run(store: Arc<dyn TransactionalStore>, config: &RunConfig) -> Result<RunReport> {
    if config.threads == 0 {
        return Err(Error::Config("thread count must be >= 1".into()));
    }
    if config.batch_size == 0 {
        return Err(Error::Config("batch size must be >= 1".into()));
    }

    let sequence = Arc::new(KeySequence::new(config.starting_key));
    let budgets = partition(config.ops, config.threads);
    info!(
        threads = config.threads,
        ops = config.ops,
        batch_size = config.batch_size,
        "starting load run"
    );

    let started = Instant::now();
    let mut handles = Vec::with_capacity(config.threads);
    for (id, budget) in budgets.into_iter().enumerate() {
        let store = Arc::clone(&store);
        let sequence = Arc::clone(&sequence);
        let template = config.template.clone();
        let batch_size = config.batch_size;
        let spawned = thread::Builder::new()
            .name(format!("bench-worker-{}", id))
            .spawn(move || run_worker(id, store, sequence, &template, budget, batch_size));
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                error!(worker = id, error = %e, "failed to spawn worker");
                // Join the workers already running before giving up.
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(e.into());
            }
        }
    }

    // Join barrier: no stats are read before the owning thread has exited.
    let mut totals = WorkerStats::default();
    for (id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(stats) => {
                debug!(worker = id, %stats, "worker finished");
                totals.merge(&stats);
            }
            Err(_) => error!(worker = id, "worker panicked; its counters are lost"),
        }
    }

    let report = RunReport::new(totals, config.threads, started.elapsed());
    info!(
        ops_done = report.ops_done,
        aborted = report.aborted,
        ops_per_sec = report.ops_per_sec as u64,
        "load run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[test]
    fn test_partition_is_exact() {
        for (ops, workers) in [(10u64, 3usize), (0, 4), (7, 7), (5, 8), (100, 1)] {
            let parts = partition(ops, workers);
            assert_eq!(parts.len(), workers);
            assert_eq!(parts.iter().sum::<u64>(), ops);
            let max = parts.iter().max().unwrap();
            let min = parts.iter().min().unwrap();
            assert!(max - min <= 1);
        }
    }

    #[test]
    fn test_partition_remainder_goes_to_first_workers() {
        assert_eq!(partition(10, 3), vec![4, 3, 3]);
        assert_eq!(partition(5, 2), vec![3, 2]);
        assert_eq!(partition(4, 2), vec![2, 2]);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let store = Arc::new(MemStore::default());
        let config = RunConfig {
            threads: 0,
            ..RunConfig::default()
        };
        let err = run(store, &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let store = Arc::new(MemStore::default());
        let config = RunConfig {
            batch_size: 0,
            ..RunConfig::default()
        };
        let err = run(store, &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_run_writes_every_generated_row() {
        let store = Arc::new(MemStore::default());
        let config = RunConfig {
            threads: 4,
            ops: 100,
            batch_size: 8,
            starting_key: 0,
            template: RowTemplate::default(),
        };
        let report = run(Arc::clone(&store) as Arc<dyn TransactionalStore>, &config).unwrap();

        assert_eq!(report.ops_done, 100);
        assert_eq!(report.aborted, 0);
        assert_eq!(report.flush_failures, 0);
        // Every key drawn from the sequence landed exactly once.
        assert_eq!(store.row_count(), 100);
        for n in 0..100 {
            assert!(store.contains(&format!("user{}", n)));
        }
    }

    #[test]
    fn test_run_respects_starting_key() {
        let store = Arc::new(MemStore::default());
        let config = RunConfig {
            threads: 2,
            ops: 10,
            batch_size: 2,
            starting_key: 1000,
            template: RowTemplate::default(),
        };
        run(Arc::clone(&store) as Arc<dyn TransactionalStore>, &config).unwrap();

        assert!(store.contains("user1000"));
        assert!(store.contains("user1009"));
        assert!(!store.contains("user0"));
    }
}
