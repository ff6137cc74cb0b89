//! The reconciliation engine.
//!
//! Rebuilds a request from the raw entries of its channel:
//!
//! 1. Sort entries chronologically
//! 2. Quarantine pending entries older than the newest confirmed entry
//! 3. Parse payloads into actions
//! 4. Drop duplicated actions (keep the first)
//! 5. Fold confirmed entries, then pending entries, through the state machine
//! 6. Diff the pending fold against the confirmed fold
//!
//! A failing entry never aborts the fold: it is quarantined with its reason
//! and the fold continues from the last good state.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::debug;

use reqlogic_core::{
    apply_action_to_request, Action, AdvancedLogic, ChannelId, ContentHash, Request,
};
use reqlogic_log::{ChannelEntries, LogEntry};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::report::{diff_pending, reasons, ChannelReport, IgnoredEntry};

/// Full results of both folds, before diffing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldOutcome {
    pub confirmed: Option<Request>,
    /// Confirmed state with the pending entries applied on top.
    pub pending: Option<Request>,
    pub ignored: Vec<IgnoredEntry>,
}

impl FoldOutcome {
    pub fn into_report(self) -> ChannelReport {
        let pending = diff_pending(self.confirmed.as_ref(), self.pending.as_ref());
        ChannelReport {
            confirmed: self.confirmed,
            pending,
            ignored: self.ignored,
        }
    }
}

/// Reconciles channels of the transaction log into requests.
///
/// Cheap to clone; clones share the advanced logic.
#[derive(Clone, Default)]
pub struct Reconciler {
    config: EngineConfig,
    advanced_logic: Option<Arc<dyn AdvancedLogic>>,
}

impl Reconciler {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            advanced_logic: None,
        }
    }

    pub fn with_advanced_logic(mut self, logic: Arc<dyn AdvancedLogic>) -> Self {
        self.advanced_logic = Some(logic);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn advanced_logic(&self) -> Option<&dyn AdvancedLogic> {
        self.advanced_logic.as_deref()
    }

    /// Run both folds over the entries of one channel.
    pub fn fold_channel(&self, channel: &ChannelId, mut entries: Vec<LogEntry>) -> FoldOutcome {
        let mut ignored = Vec::new();

        sort_chronologically(&mut entries);
        let entries = prune_stale_pending(entries, &mut ignored);
        let actions = parse_entries(entries, &mut ignored);
        let actions = dedup_actions(actions, &mut ignored);

        let (confirmed, pending): (Vec<_>, Vec<_>) =
            actions.into_iter().partition(|(_, entry)| entry.is_confirmed());

        let confirmed_state = self.fold(None, confirmed, &mut ignored);
        let pending_state = self.fold(confirmed_state.clone(), pending, &mut ignored);

        for quarantined in &ignored {
            debug!(
                channel = %channel,
                timestamp = quarantined.entry.timestamp,
                reason = %quarantined.reason,
                "ignored log entry"
            );
        }
        debug!(
            channel = %channel,
            confirmed = confirmed_state.is_some(),
            pending = pending_state != confirmed_state,
            ignored = ignored.len(),
            "reconciled channel"
        );

        FoldOutcome {
            confirmed: confirmed_state,
            pending: pending_state,
            ignored,
        }
    }

    /// Reconcile one channel into its report.
    pub fn reconcile_channel(&self, channel: &ChannelId, entries: Vec<LogEntry>) -> ChannelReport {
        self.fold_channel(channel, entries).into_report()
    }

    /// Reconcile every channel of `channels` in parallel.
    ///
    /// Each channel is folded on its own blocking task; results are merged by
    /// channel id. Channels that yield neither a confirmed nor a pending
    /// request are left out.
    pub async fn reconcile_channels(
        &self,
        channels: ChannelEntries,
    ) -> Result<BTreeMap<ChannelId, ChannelReport>> {
        let mut tasks = JoinSet::new();
        for (channel, entries) in channels {
            let reconciler = self.clone();
            tasks.spawn_blocking(move || {
                let report = reconciler.reconcile_channel(&channel, entries);
                (channel, report)
            });
        }

        let mut reports = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (channel, report) = joined?;
            if report.confirmed.is_none() && report.pending.is_none() {
                debug!(channel = %channel, ignored = report.ignored.len(), "no request in channel");
                continue;
            }
            reports.insert(channel, report);
        }
        Ok(reports)
    }

    fn fold(
        &self,
        mut state: Option<Request>,
        actions: Vec<(Action, LogEntry)>,
        ignored: &mut Vec<IgnoredEntry>,
    ) -> Option<Request> {
        for (action, entry) in actions {
            match apply_action_to_request(
                state.as_ref(),
                &action,
                entry.timestamp,
                &self.config.version_policy,
                self.advanced_logic(),
            ) {
                Ok(next) => state = Some(next),
                Err(e) => ignored.push(IgnoredEntry::new(e.to_string(), entry)),
            }
        }
        state
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("advanced_logic", &self.advanced_logic.is_some())
            .finish()
    }
}

/// Timestamp order. Ties put confirmed entries first, then compare payloads,
/// so the order never depends on how the log returned the entries.
fn sort_chronologically(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| b.is_confirmed().cmp(&a.is_confirmed()))
            .then_with(|| a.payload.cmp(&b.payload))
    });
}

/// Quarantine pending entries strictly older than the newest confirmed entry.
fn prune_stale_pending(entries: Vec<LogEntry>, ignored: &mut Vec<IgnoredEntry>) -> Vec<LogEntry> {
    let Some(newest_confirmed) = entries
        .iter()
        .filter(|e| e.is_confirmed())
        .map(|e| e.timestamp)
        .max()
    else {
        return entries;
    };

    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.is_confirmed() && entry.timestamp < newest_confirmed {
            ignored.push(IgnoredEntry::new(reasons::STALE_PENDING, entry));
        } else {
            kept.push(entry);
        }
    }
    kept
}

fn parse_entries(
    entries: Vec<LogEntry>,
    ignored: &mut Vec<IgnoredEntry>,
) -> Vec<(Action, LogEntry)> {
    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        match Action::from_slice(&entry.payload) {
            Ok(action) => parsed.push((action, entry)),
            Err(_) => ignored.push(IgnoredEntry::new(reasons::PARSING_ERROR, entry)),
        }
    }
    parsed
}

fn dedup_actions(
    actions: Vec<(Action, LogEntry)>,
    ignored: &mut Vec<IgnoredEntry>,
) -> Vec<(Action, LogEntry)> {
    let mut seen: HashSet<ContentHash> = HashSet::new();
    let mut unique = Vec::with_capacity(actions.len());
    for (action, entry) in actions {
        let Ok(hash) = action.content_hash() else {
            ignored.push(IgnoredEntry::new(reasons::PARSING_ERROR, entry));
            continue;
        };
        if seen.insert(hash) {
            unique.push((action, entry));
        } else {
            ignored.push(IgnoredEntry::new(reasons::DUPLICATED, entry));
        }
    }
    unique
}
