//! # Request Logic Reconcile
//!
//! Rebuilds requests from the unordered, possibly duplicated and possibly
//! malformed entries of the transaction log.
//!
//! Every channel produces a [`ChannelReport`]: the confirmed request, what
//! the pending entries would change on top of it, and the entries that were
//! ignored along the way with the reason why.
//!
//! Folding a channel is pure and synchronous. [`Reconciler::reconcile_channels`]
//! fans channels out over blocking tokio tasks.

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod validate;

pub use config::EngineConfig;
pub use engine::{FoldOutcome, Reconciler};
pub use error::{ReconcileError, Result};
pub use report::{diff_pending, reasons, ChannelReport, IgnoredEntry, PendingRequest};
