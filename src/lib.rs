//! batchbench: a batched-insert load harness for transactional stores
//!
//! A multi-threaded harness that issues batched insert transactions against
//! a transactional key-value/table store and reports throughput and
//! transaction-abort counts.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use batchbench::{run, MemStore, RunConfig, TransactionalStore};
//!
//! let store = Arc::new(MemStore::default());
//! let config = RunConfig {
//!     threads: 4,
//!     ops: 1000,
//!     batch_size: 16,
//!     ..RunConfig::default()
//! };
//! let report = run(store as Arc<dyn TransactionalStore>, &config).unwrap();
//! assert_eq!(report.ops_done, 1000);
//! ```
//!
//! # Architecture
//!
//! Workers own all their mutable state (mutation buffer, open transaction,
//! counters); the only shared pieces are the [`KeySequence`] and the store
//! handle. Any backend plugs in through the [`TransactionalStore`] trait.

// Re-export the public API from the core and harness crates
pub use batchbench_core::{
    Error, InsertStatus, KeySequence, Result, Row, StoreTransaction, TransactionalStore,
    WorkerStats,
};
pub use batchbench_harness::{
    partition, run, run_worker, MemStore, RowTemplate, RunConfig, RunReport, TransactionSession,
};
