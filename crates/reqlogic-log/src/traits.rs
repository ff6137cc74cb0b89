//! TransactionLog trait: the abstract interface to the append-only log.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use reqlogic_core::{ChannelId, TopicHash};

use crate::error::{LogError, Result};

/// Confirmation status of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    Confirmed,
    Pending,
}

/// One raw entry of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Expected to deserialize into an action; not guaranteed.
    pub payload: Bytes,
    pub state: EntryState,
    /// Seconds, as assigned by the log.
    pub timestamp: u64,
}

impl LogEntry {
    pub fn confirmed(payload: impl Into<Bytes>, timestamp: u64) -> Self {
        Self {
            payload: payload.into(),
            state: EntryState::Confirmed,
            timestamp,
        }
    }

    pub fn pending(payload: impl Into<Bytes>, timestamp: u64) -> Self {
        Self {
            payload: payload.into(),
            state: EntryState::Pending,
            timestamp,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == EntryState::Confirmed
    }
}

/// Entries grouped by channel.
pub type ChannelEntries = BTreeMap<ChannelId, Vec<LogEntry>>;

/// Inclusive bounds on a channel's last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl TimeRange {
    pub fn new(from: Option<u64>, to: Option<u64>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, timestamp: u64) -> bool {
        self.from.map_or(true, |from| timestamp >= from)
            && self.to.map_or(true, |to| timestamp <= to)
    }
}

/// Final outcome of a persisted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Confirmed,
    Failed(String),
}

/// Returned by [`TransactionLog::persist`].
///
/// The entry is visible as pending as soon as the handle exists.
#[derive(Debug)]
pub struct PersistHandle {
    pub channel: ChannelId,
    pub timestamp: u64,
    status: oneshot::Receiver<PersistStatus>,
}

impl PersistHandle {
    pub fn new(
        channel: ChannelId,
        timestamp: u64,
        status: oneshot::Receiver<PersistStatus>,
    ) -> Self {
        Self {
            channel,
            timestamp,
            status,
        }
    }

    /// Wait for the log to confirm or reject the write.
    pub async fn wait(self) -> Result<PersistStatus> {
        self.status
            .await
            .map_err(|_| LogError::Persist("log dropped the write before resolving it".into()))
    }
}

/// The TransactionLog trait: async interface to the append-only log.
///
/// # Design Notes
///
/// - **Unknown channels are empty**: reading a channel that was never written
///   returns no entries rather than an error.
/// - **Order is not guaranteed**: callers sort by timestamp themselves.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// All entries of one channel.
    async fn get_entries(&self, channel: &ChannelId) -> Result<Vec<LogEntry>>;

    /// Entries of every channel indexed under `topic`, optionally restricted
    /// to channels last updated within `range`.
    async fn get_entries_by_topic(
        &self,
        topic: &TopicHash,
        range: Option<TimeRange>,
    ) -> Result<ChannelEntries>;

    /// Union of [`get_entries_by_topic`](Self::get_entries_by_topic) over `topics`.
    async fn get_entries_by_topics(
        &self,
        topics: &[TopicHash],
        range: Option<TimeRange>,
    ) -> Result<ChannelEntries> {
        let mut merged = ChannelEntries::new();
        for topic in topics {
            for (channel, entries) in self.get_entries_by_topic(topic, range).await? {
                merged.entry(channel).or_insert(entries);
            }
        }
        Ok(merged)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Append `payload` to `channel` and index the channel under `topics`.
    async fn persist(
        &self,
        payload: Bytes,
        channel: &ChannelId,
        topics: &[TopicHash],
    ) -> Result<PersistHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range() {
        let open = TimeRange::default();
        assert!(open.contains(0));
        assert!(open.contains(u64::MAX));

        let range = TimeRange::new(Some(10), Some(20));
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
    }

    #[tokio::test]
    async fn test_handle_resolves() {
        let (tx, rx) = oneshot::channel();
        let handle = PersistHandle::new(ChannelId::from("01a"), 3, rx);
        tx.send(PersistStatus::Confirmed).unwrap();
        assert_eq!(handle.wait().await.unwrap(), PersistStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_handle_dropped_sender() {
        let (tx, rx) = oneshot::channel::<PersistStatus>();
        let handle = PersistHandle::new(ChannelId::from("01a"), 3, rx);
        drop(tx);
        assert!(matches!(handle.wait().await, Err(LogError::Persist(_))));
    }
}
