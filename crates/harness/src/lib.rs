//! Load-generation engine for batchbench
//!
//! This crate implements the per-worker transaction/batching/retry engine:
//! - TransactionSession: mutation buffer + open-transaction handle
//! - Worker: one thread's budgeted insert loop
//! - Orchestrator: partitions the operation budget, spawns and joins workers
//! - MemStore: in-memory reference store with abort injection
//!
//! The engine is store-agnostic; everything goes through the
//! `TransactionalStore` boundary defined in `batchbench-core`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod orchestrator;
pub mod report;
pub mod session;
pub mod store;
pub mod worker;

pub use orchestrator::{partition, run, RunConfig};
pub use report::RunReport;
pub use session::TransactionSession;
pub use store::MemStore;
pub use worker::{run_worker, RowTemplate};
