//! Reconciliation outputs and the pending/confirmed diff.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use reqlogic_core::{
    content_hash, Currency, Event, Identity, Request, RequestId, RequestState,
};
use reqlogic_log::LogEntry;

/// Quarantine reasons produced by the engine itself.
pub mod reasons {
    pub const STALE_PENDING: &str = "confirmed transaction newer than this pending transaction";
    pub const PARSING_ERROR: &str = "parsing error";
    pub const DUPLICATED: &str = "duplicated transaction";
}

/// An entry removed from the fold, with why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredEntry {
    pub reason: String,
    pub entry: LogEntry,
}

impl IgnoredEntry {
    pub fn new(reason: impl Into<String>, entry: LogEntry) -> Self {
        Self {
            reason: reason.into(),
            entry,
        }
    }
}

/// What pending entries would change on top of the confirmed request.
///
/// Only differing fields are set; `events` holds just the new events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RequestState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions_data: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl PendingRequest {
    /// Every field of `request`.
    pub fn from_request(request: &Request) -> Self {
        Self {
            version: Some(request.version.clone()),
            request_id: Some(request.request_id.clone()),
            creator: Some(request.creator.clone()),
            currency: Some(request.currency.clone()),
            state: Some(request.state),
            expected_amount: Some(request.expected_amount.clone()),
            payee: request.payee.clone(),
            payer: request.payer.clone(),
            extensions: Some(request.extensions.clone()),
            extensions_data: Some(request.extensions_data.clone()),
            events: Some(request.events.clone()),
            timestamp: request.timestamp,
            nonce: request.nonce,
        }
    }
}

/// Result of reconciling one channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub confirmed: Option<Request>,
    pub pending: Option<PendingRequest>,
    pub ignored: Vec<IgnoredEntry>,
}

/// Field-level difference between the pending and confirmed folds.
///
/// Fields are compared by content hash. With no confirmed request the whole
/// pending request is the diff; with no difference the result is `None`.
pub fn diff_pending(
    confirmed: Option<&Request>,
    pending: Option<&Request>,
) -> Option<PendingRequest> {
    let pending = pending?;
    let Some(confirmed) = confirmed else {
        return Some(PendingRequest::from_request(pending));
    };

    let (Ok(Value::Object(before)), Ok(Value::Object(after))) =
        (serde_json::to_value(confirmed), serde_json::to_value(pending))
    else {
        return Some(PendingRequest::from_request(pending));
    };

    let mut diff = Map::new();
    for (field, value) in after {
        let unchanged = before
            .get(&field)
            .map_or(false, |old| same_content(old, &value));
        if unchanged {
            continue;
        }
        if field == "events" {
            let new_events: Vec<Value> = match value {
                Value::Array(events) => events.into_iter().skip(confirmed.events.len()).collect(),
                _ => Vec::new(),
            };
            diff.insert(field, Value::Array(new_events));
        } else {
            diff.insert(field, value);
        }
    }

    if diff.is_empty() {
        return None;
    }
    serde_json::from_value(Value::Object(diff)).ok()
}

fn same_content(a: &Value, b: &Value) -> bool {
    match (content_hash(a), content_hash(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
