//! In-memory implementation of the TransactionLog trait.
//!
//! Writes are pending until confirmed through [`MemoryLog::confirm_channel`]
//! (or immediately, with [`MemoryLog::auto_confirm`]). Timestamps come from a
//! logical clock that advances by one second per write.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::debug;

use reqlogic_core::{ChannelId, TopicHash};

use crate::error::{LogError, Result};
use crate::traits::{
    ChannelEntries, EntryState, LogEntry, PersistHandle, PersistStatus, TimeRange, TransactionLog,
};

/// In-memory log. All data is lost when the log is dropped.
pub struct MemoryLog {
    inner: RwLock<MemoryLogInner>,
    auto_confirm: bool,
}

#[derive(Default)]
struct MemoryLogInner {
    channels: HashMap<ChannelId, Vec<StoredEntry>>,
    topics: HashMap<TopicHash, BTreeSet<ChannelId>>,
    /// Timestamp of the last write.
    clock: u64,
}

struct StoredEntry {
    entry: LogEntry,
    /// Present until the write is resolved.
    waiter: Option<oneshot::Sender<PersistStatus>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryLogInner::default()),
            auto_confirm: false,
        }
    }

    /// A log that confirms every write as soon as it is persisted.
    pub fn auto_confirm() -> Self {
        Self {
            auto_confirm: true,
            ..Self::new()
        }
    }

    /// Start the logical clock at `timestamp`.
    pub fn with_clock(self, timestamp: u64) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.clock = timestamp;
        }
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryLogInner>> {
        self.inner
            .read()
            .map_err(|_| LogError::Backend("memory log lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryLogInner>> {
        self.inner
            .write()
            .map_err(|_| LogError::Backend("memory log lock poisoned".into()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Test hooks
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a raw entry as-is, bypassing the clock.
    ///
    /// Useful for replaying foreign logs or injecting malformed payloads.
    pub fn insert_entry(
        &self,
        channel: &ChannelId,
        entry: LogEntry,
        topics: &[TopicHash],
    ) -> Result<()> {
        let mut inner = self.write()?;
        inner.clock = inner.clock.max(entry.timestamp);
        inner
            .channels
            .entry(channel.clone())
            .or_default()
            .push(StoredEntry { entry, waiter: None });
        for topic in topics {
            inner.topics.entry(*topic).or_default().insert(channel.clone());
        }
        Ok(())
    }

    /// Confirm every pending entry of `channel`. Returns how many were confirmed.
    pub fn confirm_channel(&self, channel: &ChannelId) -> Result<usize> {
        let mut inner = self.write()?;
        let entries = inner
            .channels
            .get_mut(channel)
            .ok_or_else(|| LogError::ChannelNotFound(channel.clone()))?;

        let mut confirmed = 0;
        for stored in entries.iter_mut().filter(|s| s.entry.state == EntryState::Pending) {
            stored.entry.state = EntryState::Confirmed;
            if let Some(waiter) = stored.waiter.take() {
                let _ = waiter.send(PersistStatus::Confirmed);
            }
            confirmed += 1;
        }
        debug!(channel = %channel, confirmed, "confirmed pending entries");
        Ok(confirmed)
    }

    /// Drop every pending entry of `channel`, failing their writes with `reason`.
    pub fn fail_pending(&self, channel: &ChannelId, reason: &str) -> Result<usize> {
        let mut inner = self.write()?;
        let entries = inner
            .channels
            .get_mut(channel)
            .ok_or_else(|| LogError::ChannelNotFound(channel.clone()))?;

        let before = entries.len();
        entries.retain_mut(|stored| {
            if stored.entry.state != EntryState::Pending {
                return true;
            }
            if let Some(waiter) = stored.waiter.take() {
                let _ = waiter.send(PersistStatus::Failed(reason.to_string()));
            }
            false
        });
        let failed = before - entries.len();
        debug!(channel = %channel, failed, reason, "failed pending entries");
        Ok(failed)
    }

    pub fn channel_count(&self) -> usize {
        self.read().map(|inner| inner.channels.len()).unwrap_or(0)
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLogInner {
    fn last_updated(&self, channel: &ChannelId) -> Option<u64> {
        self.channels
            .get(channel)?
            .iter()
            .map(|s| s.entry.timestamp)
            .max()
    }

    fn entries(&self, channel: &ChannelId) -> Vec<LogEntry> {
        self.channels
            .get(channel)
            .map(|entries| entries.iter().map(|s| s.entry.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TransactionLog for MemoryLog {
    async fn get_entries(&self, channel: &ChannelId) -> Result<Vec<LogEntry>> {
        Ok(self.read()?.entries(channel))
    }

    async fn get_entries_by_topic(
        &self,
        topic: &TopicHash,
        range: Option<TimeRange>,
    ) -> Result<ChannelEntries> {
        let inner = self.read()?;
        let range = range.unwrap_or_default();

        let mut result = ChannelEntries::new();
        if let Some(channels) = inner.topics.get(topic) {
            for channel in channels {
                match inner.last_updated(channel) {
                    Some(ts) if range.contains(ts) => {
                        result.insert(channel.clone(), inner.entries(channel));
                    }
                    _ => {}
                }
            }
        }
        Ok(result)
    }

    async fn persist(
        &self,
        payload: Bytes,
        channel: &ChannelId,
        topics: &[TopicHash],
    ) -> Result<PersistHandle> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.write()?;
        inner.clock += 1;
        let timestamp = inner.clock;

        let (state, waiter) = if self.auto_confirm {
            let _ = tx.send(PersistStatus::Confirmed);
            (EntryState::Confirmed, None)
        } else {
            (EntryState::Pending, Some(tx))
        };

        inner.channels.entry(channel.clone()).or_default().push(StoredEntry {
            entry: LogEntry {
                payload,
                state,
                timestamp,
            },
            waiter,
        });
        for topic in topics {
            inner.topics.entry(*topic).or_default().insert(channel.clone());
        }

        debug!(channel = %channel, timestamp, ?state, "persisted entry");
        Ok(PersistHandle::new(channel.clone(), timestamp, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str) -> ChannelId {
        ChannelId::from(id)
    }

    fn topic(name: &str) -> TopicHash {
        TopicHash::of(name).unwrap()
    }

    #[tokio::test]
    async fn test_persist_and_get() {
        let log = MemoryLog::new().with_clock(100);
        let handle = log
            .persist(Bytes::from_static(b"one"), &channel("01a"), &[])
            .await
            .unwrap();
        assert_eq!(handle.timestamp, 101);

        let entries = log.get_entries(&channel("01a")).await.unwrap();
        assert_eq!(entries, vec![LogEntry::pending(&b"one"[..], 101)]);
    }

    #[tokio::test]
    async fn test_unknown_channel_is_empty() {
        let log = MemoryLog::new();
        assert!(log.get_entries(&channel("01zz")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_resolves_handle() {
        let log = MemoryLog::new();
        let handle = log
            .persist(Bytes::from_static(b"one"), &channel("01a"), &[])
            .await
            .unwrap();

        assert_eq!(log.confirm_channel(&channel("01a")).unwrap(), 1);
        assert_eq!(handle.wait().await.unwrap(), PersistStatus::Confirmed);

        let entries = log.get_entries(&channel("01a")).await.unwrap();
        assert!(entries[0].is_confirmed());
    }

    #[tokio::test]
    async fn test_fail_pending_drops_entries() {
        let log = MemoryLog::new();
        log.insert_entry(&channel("01a"), LogEntry::confirmed(&b"kept"[..], 1), &[])
            .unwrap();
        let handle = log
            .persist(Bytes::from_static(b"dropped"), &channel("01a"), &[])
            .await
            .unwrap();

        assert_eq!(log.fail_pending(&channel("01a"), "rejected").unwrap(), 1);
        assert_eq!(
            handle.wait().await.unwrap(),
            PersistStatus::Failed("rejected".into())
        );
        assert_eq!(log.get_entries(&channel("01a")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_auto_confirm() {
        let log = MemoryLog::auto_confirm();
        let handle = log
            .persist(Bytes::from_static(b"one"), &channel("01a"), &[])
            .await
            .unwrap();
        assert_eq!(handle.wait().await.unwrap(), PersistStatus::Confirmed);
        assert!(log.get_entries(&channel("01a")).await.unwrap()[0].is_confirmed());
    }

    #[tokio::test]
    async fn test_confirm_unknown_channel() {
        let log = MemoryLog::new();
        assert_eq!(
            log.confirm_channel(&channel("01a")),
            Err(LogError::ChannelNotFound(channel("01a")))
        );
    }

    #[tokio::test]
    async fn test_topic_index() {
        let log = MemoryLog::new();
        log.persist(Bytes::from_static(b"a"), &channel("01a"), &[topic("x"), topic("y")])
            .await
            .unwrap();
        log.persist(Bytes::from_static(b"b"), &channel("01b"), &[topic("y")])
            .await
            .unwrap();

        let by_x = log.get_entries_by_topic(&topic("x"), None).await.unwrap();
        assert_eq!(by_x.keys().cloned().collect::<Vec<_>>(), vec![channel("01a")]);

        let by_y = log.get_entries_by_topic(&topic("y"), None).await.unwrap();
        assert_eq!(by_y.len(), 2);

        let by_both = log
            .get_entries_by_topics(&[topic("x"), topic("y")], None)
            .await
            .unwrap();
        assert_eq!(by_both.len(), 2);

        assert!(log.get_entries_by_topic(&topic("z"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_time_range_filters_on_last_update() {
        let log = MemoryLog::new();
        log.insert_entry(&channel("01a"), LogEntry::confirmed(&b"a1"[..], 10), &[topic("t")])
            .unwrap();
        log.insert_entry(&channel("01a"), LogEntry::confirmed(&b"a2"[..], 30), &[])
            .unwrap();
        log.insert_entry(&channel("01b"), LogEntry::confirmed(&b"b1"[..], 15), &[topic("t")])
            .unwrap();

        let range = Some(TimeRange::new(Some(20), None));
        let recent = log.get_entries_by_topic(&topic("t"), range).await.unwrap();
        assert_eq!(recent.keys().cloned().collect::<Vec<_>>(), vec![channel("01a")]);
        assert_eq!(recent[&channel("01a")].len(), 2);
    }
}
