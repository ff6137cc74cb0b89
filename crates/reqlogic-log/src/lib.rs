//! # Request Logic Log
//!
//! The transaction-log collaborator behind request logic. Signed actions are
//! appended to per-request channels; the log reports each entry with its
//! timestamp and confirmation state, and indexes channels by topic hash.
//!
//! ## Key Types
//!
//! - [`TransactionLog`] - The async trait for all log operations
//! - [`MemoryLog`] - In-memory log for tests and embedders
//! - [`LogEntry`] - A raw payload with its timestamp and [`EntryState`]
//! - [`PersistHandle`] - Resolves once a write is confirmed or fails
//!
//! ## Design Notes
//!
//! - **Append-only**: entries are never rewritten, only confirmed or dropped
//! - **No interpretation**: payloads are opaque bytes; parsing belongs to reconciliation
//! - **Eventual confirmation**: a write is pending until the backend confirms it

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{LogError, Result};
pub use memory::MemoryLog;
pub use traits::{
    ChannelEntries, EntryState, LogEntry, PersistHandle, PersistStatus, TimeRange, TransactionLog,
};
