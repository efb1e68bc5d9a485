//! Error types for the batchbench harness
//!
//! One error enum covers the whole system. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations. Contention aborts are a
//! first-class variant because they are an expected outcome under load, not
//! an exceptional condition: callers branch on [`Error::is_retryable`]
//! instead of catching exceptions.

use std::io;
use thiserror::Error;

/// Result type alias for batchbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the harness
#[derive(Debug, Error)]
pub enum Error {
    /// Transaction aborted by the store due to contention.
    ///
    /// Expected under concurrent load. The worker retries the whole logical
    /// operation in a fresh transaction and counts the abort.
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),

    /// No session could be acquired from the store.
    ///
    /// Fatal to the current attempt; fatal to the worker when it happens
    /// during initialization.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store rejected a write payload as malformed.
    #[error("write rejected: {0}")]
    WriteRejected(String),

    /// Operation attempted in an invalid session state
    /// (e.g. insert without an open transaction).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error (thread spawning, config file access).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the failed operation should be retried in a new transaction.
    ///
    /// Only contention aborts are retryable; every other kind is fatal to
    /// the attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransactionAborted(_))
    }
}
