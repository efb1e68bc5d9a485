//! In-memory reference store
//!
//! `MemStore` implements the `TransactionalStore` boundary against a
//! concurrent in-process table, so the whole harness runs end to end with no
//! external database. Commits serialize through a single commit lock and
//! bump a global version counter; an optional abort rate injects contention
//! conflicts so the retry path can be exercised under load.
//!
//! The table is insert-only: committing a duplicate primary key is a write
//! rejection, which doubles as a correctness check that the shared key
//! sequence never hands out the same key twice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use batchbench_core::{Error, Result, Row, StoreTransaction, TransactionalStore};
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

struct Inner {
    name: String,
    table: DashMap<String, Vec<(String, String)>>,
    version: AtomicU64,
    commit_lock: Mutex<()>,
    abort_rate: f64,
}

/// In-memory transactional table with injectable contention aborts.
///
/// Cheap to clone; all clones share the same table.
#[derive(Clone)]
pub struct MemStore {
    inner: Arc<Inner>,
}

impl MemStore {
    /// Create an empty store for the named table, with aborts disabled.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: table.into(),
                table: DashMap::new(),
                version: AtomicU64::new(0),
                commit_lock: Mutex::new(()),
                abort_rate: 0.0,
            }),
        }
    }

    /// Set the probability in `[0, 1]` that a commit fails with a
    /// contention abort.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for rates outside `[0, 1]`.
    pub fn with_abort_rate(self, rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::Config(format!(
                "abort rate must be within [0, 1], got {}",
                rate
            )));
        }
        let inner = Arc::new(Inner {
            name: self.inner.name.clone(),
            table: DashMap::new(),
            version: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            abort_rate: rate,
        });
        Ok(Self { inner })
    }

    /// Table name this store was created with.
    pub fn table_name(&self) -> &str {
        &self.inner.name
    }

    /// Number of durably committed rows.
    pub fn row_count(&self) -> usize {
        self.inner.table.len()
    }

    /// Whether a committed row exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.table.contains_key(key)
    }

    /// Column values of a committed row, if present.
    pub fn get(&self, key: &str) -> Option<Vec<(String, String)>> {
        self.inner.table.get(key).map(|r| r.value().clone())
    }

    /// Number of commits applied so far.
    pub fn commit_version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new("usertable")
    }
}

impl TransactionalStore for MemStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemTransaction {
            inner: Arc::clone(&self.inner),
            writes: Vec::new(),
        }))
    }
}

/// One open transaction: a private write set applied atomically on commit.
struct MemTransaction {
    inner: Arc<Inner>,
    writes: Vec<Row>,
}

impl StoreTransaction for MemTransaction {
    fn buffer_writes(&mut self, rows: &[Row]) -> Result<()> {
        for row in rows {
            if row.key().is_empty() {
                return Err(Error::WriteRejected("empty primary key".into()));
            }
            if row.columns().is_empty() {
                return Err(Error::WriteRejected(format!(
                    "row {} has no column values",
                    row.key()
                )));
            }
        }
        self.writes.extend_from_slice(rows);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let _guard = self.inner.commit_lock.lock();

        if self.inner.abort_rate > 0.0
            && rand::thread_rng().gen::<f64>() < self.inner.abort_rate
        {
            return Err(Error::TransactionAborted("injected conflict".into()));
        }

        // Validate the whole write set before applying anything, so a
        // rejected commit leaves the table untouched.
        for row in &self.writes {
            if self.inner.table.contains_key(row.key()) {
                return Err(Error::WriteRejected(format!(
                    "duplicate primary key {} in table {}",
                    row.key(),
                    self.inner.name
                )));
            }
        }

        let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
        let rows = self.writes.len();
        for row in self.writes {
            let columns = row.columns().to_vec();
            self.inner.table.insert(row.key().to_string(), columns);
        }
        debug!(version, rows, "commit applied");
        Ok(())
    }

    fn close(self: Box<Self>) {
        // Write set is private to this transaction; dropping it discards it.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str) -> Row {
        Row::new(key).column("id", key).column("field0", "1000")
    }

    #[test]
    fn test_commit_applies_writes() {
        let store = MemStore::new("usertable");
        let mut txn = store.begin().unwrap();
        txn.buffer_writes(&[row("user0"), row("user1")]).unwrap();
        txn.commit().unwrap();

        assert_eq!(store.row_count(), 2);
        assert_eq!(store.commit_version(), 1);
        let columns = store.get("user0").unwrap();
        assert_eq!(columns[1], ("field0".to_string(), "1000".to_string()));
    }

    #[test]
    fn test_close_discards_writes() {
        let store = MemStore::new("usertable");
        let mut txn = store.begin().unwrap();
        txn.buffer_writes(&[row("user0")]).unwrap();
        txn.close();

        assert_eq!(store.row_count(), 0);
        assert_eq!(store.commit_version(), 0);
    }

    #[test]
    fn test_duplicate_key_rejected_atomically() {
        let store = MemStore::new("usertable");
        let mut txn = store.begin().unwrap();
        txn.buffer_writes(&[row("user0")]).unwrap();
        txn.commit().unwrap();

        let mut txn = store.begin().unwrap();
        txn.buffer_writes(&[row("user1"), row("user0")]).unwrap();
        let err = txn.commit().unwrap_err();
        assert!(matches!(err, Error::WriteRejected(_)));
        // Nothing from the rejected transaction landed.
        assert!(!store.contains("user1"));
        assert_eq!(store.row_count(), 1);
    }

    #[test]
    fn test_malformed_rows_rejected_at_buffer_time() {
        let store = MemStore::new("usertable");
        let mut txn = store.begin().unwrap();
        let err = txn.buffer_writes(&[Row::new("")]).unwrap_err();
        assert!(matches!(err, Error::WriteRejected(_)));

        let err = txn.buffer_writes(&[Row::new("user0")]).unwrap_err();
        assert!(matches!(err, Error::WriteRejected(_)));
    }

    #[test]
    fn test_full_abort_rate_always_aborts() {
        let store = MemStore::new("usertable").with_abort_rate(1.0).unwrap();
        let mut txn = store.begin().unwrap();
        txn.buffer_writes(&[row("user0")]).unwrap();
        let err = txn.commit().unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.row_count(), 0);
    }

    #[test]
    fn test_abort_rate_out_of_range() {
        assert!(MemStore::new("t").with_abort_rate(1.5).is_err());
        assert!(MemStore::new("t").with_abort_rate(-0.1).is_err());
        assert!(MemStore::new("t").with_abort_rate(0.0).is_ok());
    }
}
