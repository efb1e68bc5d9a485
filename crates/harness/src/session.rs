//! Per-worker mutation buffer and transaction session
//!
//! A `TransactionSession` owns the two pieces of mutable state a worker
//! carries across loop iterations: the bounded mutation buffer and the
//! handle to the currently open transaction. Making both explicit in one
//! struct pins down the reset points: the buffer survives transaction
//! boundaries, the handle does not.
//!
//! Lifecycle: `Closed → Open → {Committed, Aborted}`, re-entered via
//! `start()` each iteration.

use std::sync::Arc;

use batchbench_core::{Error, InsertStatus, Result, Row, StoreTransaction, TransactionalStore};
use tracing::{debug, warn};

/// How many times a cleanup flush retries a contention abort before the
/// remaining rows are declared lost.
const CLEANUP_ATTEMPTS: u32 = 3;

/// Worker-local transaction state: buffered rows plus the open transaction.
///
/// Owned exclusively by one worker thread; never shared.
pub struct TransactionSession {
    store: Arc<dyn TransactionalStore>,
    txn: Option<Box<dyn StoreTransaction>>,
    buffer: Vec<Row>,
    batch_size: usize,
}

impl TransactionSession {
    /// Create a session flushing every `batch_size` rows.
    ///
    /// `batch_size` of 0 is treated as 1; the orchestrator validates the
    /// configured value before any session exists.
    pub fn new(store: Arc<dyn TransactionalStore>, batch_size: usize) -> Self {
        Self {
            store,
            txn: None,
            buffer: Vec::with_capacity(batch_size.max(1)),
            batch_size: batch_size.max(1),
        }
    }

    /// Open a fresh transaction. Any stale handle from a previous failed
    /// iteration is closed first.
    pub fn start(&mut self) -> Result<()> {
        if let Some(stale) = self.txn.take() {
            stale.close();
        }
        self.txn = Some(self.store.begin()?);
        Ok(())
    }

    /// Buffer one row, flushing the batch into the open transaction's write
    /// set when the buffer reaches capacity.
    ///
    /// Returns `Batched` while the batch is still filling and `Committed`
    /// once the batch has been handed to the transaction (durability still
    /// requires [`commit`](Self::commit)).
    ///
    /// A buffer already at capacity on entry means an earlier flush failed.
    /// The row is kept, never dropped, and goes out with the oversized
    /// batch; a warning makes the condition visible.
    ///
    /// # Errors
    ///
    /// Propagates flush failures; the buffer keeps all rows, and the caller
    /// must abort the transaction and retry in a fresh one.
    pub fn insert(&mut self, row: Row) -> Result<InsertStatus> {
        if self.buffer.len() >= self.batch_size {
            warn!(
                key = row.key(),
                buffered = self.buffer.len(),
                "mutation buffer full before append; deferring row into current flush"
            );
        }
        self.buffer.push(row);
        if self.buffer.len() < self.batch_size {
            return Ok(InsertStatus::Batched);
        }
        self.flush_into_txn()?;
        Ok(InsertStatus::Committed)
    }

    /// Hand all buffered rows to the open transaction and clear the buffer.
    /// On error the buffer is left intact for the next attempt.
    fn flush_into_txn(&mut self) -> Result<()> {
        let txn = self
            .txn
            .as_mut()
            .ok_or_else(|| Error::InvalidOperation("no open transaction to flush into".into()))?;
        txn.buffer_writes(&self.buffer)?;
        debug!(rows = self.buffer.len(), "batch handed to transaction");
        self.buffer.clear();
        Ok(())
    }

    /// Commit the open transaction.
    ///
    /// Rows still sitting in the buffer (a partial batch) are deliberately
    /// not part of this commit; they stay buffered across transaction
    /// boundaries until the batch fills or [`cleanup_flush`](Self::cleanup_flush)
    /// runs.
    ///
    /// # Errors
    ///
    /// `Error::TransactionAborted` signals a contention conflict the caller
    /// retries; anything else is fatal to the attempt.
    pub fn commit(&mut self) -> Result<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| Error::InvalidOperation("commit without an open transaction".into()))?;
        txn.commit()
    }

    /// Close the open transaction without committing.
    ///
    /// Idempotent: aborting an already-closed session is a no-op. Buffered
    /// rows are intentionally retained for the next transaction attempt so
    /// an abort never loses generated rows that were not yet flushed.
    pub fn abort(&mut self) {
        if let Some(txn) = self.txn.take() {
            debug!(buffered = self.buffer.len(), "aborting open transaction");
            txn.close();
        }
    }

    /// Flush the remaining partial batch in one final transaction.
    ///
    /// Contention aborts are retried up to `CLEANUP_ATTEMPTS` times;
    /// running out of attempts (or any fatal error) leaves the rows in the
    /// buffer and reports the failure to the caller.
    ///
    /// # Errors
    ///
    /// Returns the last store error once retries are exhausted.
    pub fn cleanup_flush(&mut self) -> Result<()> {
        if let Some(stale) = self.txn.take() {
            stale.close();
        }
        if self.buffer.is_empty() {
            return Ok(());
        }
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.final_commit() {
                Ok(()) => {
                    debug!(rows = self.buffer.len(), attempt, "cleanup flush committed");
                    self.buffer.clear();
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < CLEANUP_ATTEMPTS => {
                    warn!(attempt, error = %e, "cleanup flush aborted; retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One cleanup attempt: begin, buffer the remaining rows, commit.
    fn final_commit(&self) -> Result<()> {
        let mut txn = self.store.begin()?;
        txn.buffer_writes(&self.buffer)?;
        txn.commit()
    }

    /// Number of rows currently buffered (not yet handed to a transaction).
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether a transaction is currently open.
    pub fn is_open(&self) -> bool {
        self.txn.is_some()
    }
}
