//! Core types for the batchbench load harness
//!
//! This crate defines the foundational pieces shared by every layer:
//! - Error/Result: the harness-wide error taxonomy
//! - Row, InsertStatus, WorkerStats: value types flowing through the engine
//! - KeySequence: the process-wide unique key counter
//! - TransactionalStore / StoreTransaction: the store boundary traits
//!
//! Nothing here talks to a database. The traits in [`traits`] are the only
//! contact surface with a real store implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod sequence;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use sequence::KeySequence;
pub use traits::{StoreTransaction, TransactionalStore};
pub use types::{InsertStatus, Row, WorkerStats};
