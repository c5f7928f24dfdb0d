//! Grid storage for gridshare.
//!
//! Stores [`GridDocument`]s in two independent partitions, one per
//! [`Visibility`]. Each partition assigns its own dense, 1-based,
//! monotonically increasing ids. Ids are never reused and rows are never
//! updated or deleted.
//!
//! # Storage Backends
//!
//! All backends implement the [`GridStore`] trait:
//!
//! - [`InMemoryGridStore`] -- `Vec`-backed partitions for tests and embedding
//! - [`LogGridStore`] -- one CRC-framed append-only log file per partition
//!
//! # Design Rules
//!
//! 1. `insert` returns only after the row is written (and, with
//!    [`SyncMode::EveryWrite`], fsynced).
//! 2. Id assignment is serialized per partition; concurrent inserts never
//!    share an id.
//! 3. A miss is `Ok(None)`, never an error.
//! 4. I/O and encoding failures are propagated, never retried here.
//! 5. Structured fields are persisted as self-describing JSON.
//!
//! [`GridDocument`]: gridshare_types::GridDocument
//! [`Visibility`]: gridshare_types::Visibility

pub mod error;
pub mod log;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use log::{LogGridStore, SyncMode};
pub use memory::InMemoryGridStore;
pub use traits::GridStore;
