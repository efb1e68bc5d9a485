//! Store boundary traits
//!
//! The harness never talks to a database directly; it drives any backend
//! that implements `TransactionalStore`. The traits are object-safe on
//! purpose: the orchestrator holds an `Arc<dyn TransactionalStore>` and
//! workers hold `Box<dyn StoreTransaction>`, so backends (and test doubles)
//! swap in without touching the engine.
//!
//! Assumed store semantics: serializable transactions that may abort under
//! contention and must be retried by the caller.

use crate::error::Result;
use crate::types::Row;

/// A transactional store capable of batched, keyed inserts.
///
/// Thread safety: `begin` must be safe to call concurrently from multiple
/// worker threads (requires Send + Sync). The returned transaction is owned
/// by exactly one worker.
pub trait TransactionalStore: Send + Sync {
    /// Open a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable` if no session can be acquired.
    fn begin(&self) -> Result<Box<dyn StoreTransaction>>;
}

/// One open transaction against the store.
///
/// Terminal operations (`commit`, `close`) consume the handle, so the type
/// system rules out use-after-commit.
pub trait StoreTransaction: Send {
    /// Add rows to this transaction's write set.
    ///
    /// Buffering only; nothing is durable until `commit`.
    ///
    /// # Errors
    ///
    /// Returns `Error::WriteRejected` if a payload is malformed.
    fn buffer_writes(&mut self, rows: &[Row]) -> Result<()>;

    /// Attempt to durably apply all buffered writes.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransactionAborted` on a contention conflict, an
    /// expected outcome the caller retries, or `Error::StoreUnavailable`
    /// when the attempt is fatally lost.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Release the transaction without committing. Buffered writes in the
    /// transaction are discarded by the store.
    fn close(self: Box<Self>);
}
