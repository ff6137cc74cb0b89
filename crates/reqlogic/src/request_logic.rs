//! RequestLogic: unified API over the request logic.
//!
//! Formats and signs actions, optionally validates them against the current
//! state of their channel, persists them to the transaction log, and reads
//! requests back by id or topic.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use reqlogic_core::topic::hash_topics;
use reqlogic_core::{
    apply_action_to_request, compute_request_id, format_accept, format_add_extensions_data,
    format_cancel, format_create, format_increase_expected_amount, format_reduce_expected_amount,
    get_request_id, Action, AdvancedLogic, AmountParameters, ChannelId, CreateParameters,
    Identity, RequestId, RequestParameters, SignatureProvider, TopicHash, VersionPolicy,
};
use reqlogic_log::{PersistHandle, TimeRange, TransactionLog};
use reqlogic_reconcile::{ChannelReport, EngineConfig, Reconciler};

use crate::error::{RequestLogicError, Result};

/// Configuration for RequestLogic.
#[derive(Debug, Clone, Default)]
pub struct RequestLogicConfig {
    /// Protocol versions produced and accepted.
    pub version_policy: VersionPolicy,
    /// Default of the `validate` flag of non-create operations.
    pub validate_before_persist: bool,
}

/// What a write returns: the request it targets and the pending write.
#[derive(Debug)]
pub struct Submitted {
    pub request_id: RequestId,
    pub action: Action,
    pub handle: PersistHandle,
}

/// The main RequestLogic struct.
///
/// Provides a unified API for:
/// - Creating requests and computing their ids ahead of time
/// - Accepting, cancelling, and changing the amount of requests
/// - Attaching extensions data
/// - Reading requests by id, by topic, or by several topics
pub struct RequestLogic<L: TransactionLog> {
    log: Arc<L>,
    signature_provider: Option<Arc<dyn SignatureProvider>>,
    reconciler: Reconciler,
    config: RequestLogicConfig,
}

impl<L: TransactionLog> RequestLogic<L> {
    pub fn new(log: L, config: RequestLogicConfig) -> Self {
        let reconciler = Reconciler::new(
            EngineConfig::default().with_version_policy(config.version_policy.clone()),
        );
        Self {
            log: Arc::new(log),
            signature_provider: None,
            reconciler,
            config,
        }
    }

    pub fn with_signature_provider(mut self, provider: Arc<dyn SignatureProvider>) -> Self {
        self.signature_provider = Some(provider);
        self
    }

    /// Run `logic` after every built-in handler, when writing and reading.
    pub fn with_advanced_logic(mut self, logic: Arc<dyn AdvancedLogic>) -> Self {
        self.reconciler = self.reconciler.with_advanced_logic(logic);
        self
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn config(&self) -> &RequestLogicConfig {
        &self.config
    }

    fn provider(&self) -> Result<&dyn SignatureProvider> {
        self.signature_provider
            .as_deref()
            .ok_or(RequestLogicError::NoSignatureProvider)
    }

    fn policy(&self) -> &VersionPolicy {
        &self.config.version_policy
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a request and index it under `topics`.
    ///
    /// The creation is always checked against an empty state first.
    pub async fn create_request<T: Serialize>(
        &self,
        params: CreateParameters,
        signer: &Identity,
        topics: &[T],
    ) -> Result<Submitted> {
        let action = format_create(params, signer, self.provider()?, self.policy())?;
        let request_id = get_request_id(&action)?;

        if let Err(e) = apply_action_to_request(
            None,
            &action,
            now_seconds(),
            self.policy(),
            self.reconciler.advanced_logic(),
        ) {
            warn!(request_id = %request_id, error = %e, "create rejected");
            return Err(e.into());
        }

        let topics = hash_topics(topics)?;
        self.persist(action, request_id, &topics).await
    }

    /// Request id a creation with these parameters would get.
    ///
    /// `params.timestamp` should be set, otherwise it defaults to now and the
    /// id will not match a later creation.
    pub fn compute_request_id(
        &self,
        params: CreateParameters,
        signer: &Identity,
    ) -> Result<RequestId> {
        Ok(compute_request_id(params, signer, self.provider()?, self.policy())?)
    }

    pub async fn accept_request(
        &self,
        params: RequestParameters,
        signer: &Identity,
        validate: Option<bool>,
    ) -> Result<Submitted> {
        let action = format_accept(params, signer, self.provider()?, self.policy())?;
        self.submit(action, validate).await
    }

    pub async fn cancel_request(
        &self,
        params: RequestParameters,
        signer: &Identity,
        validate: Option<bool>,
    ) -> Result<Submitted> {
        let action = format_cancel(params, signer, self.provider()?, self.policy())?;
        self.submit(action, validate).await
    }

    pub async fn increase_expected_amount_request(
        &self,
        params: AmountParameters,
        signer: &Identity,
        validate: Option<bool>,
    ) -> Result<Submitted> {
        let action =
            format_increase_expected_amount(params, signer, self.provider()?, self.policy())?;
        self.submit(action, validate).await
    }

    pub async fn reduce_expected_amount_request(
        &self,
        params: AmountParameters,
        signer: &Identity,
        validate: Option<bool>,
    ) -> Result<Submitted> {
        let action =
            format_reduce_expected_amount(params, signer, self.provider()?, self.policy())?;
        self.submit(action, validate).await
    }

    pub async fn add_extensions_data_request(
        &self,
        params: RequestParameters,
        signer: &Identity,
        validate: Option<bool>,
    ) -> Result<Submitted> {
        let action = format_add_extensions_data(params, signer, self.provider()?, self.policy())?;
        self.submit(action, validate).await
    }

    /// Persist an already signed action, validating it first if asked.
    pub async fn submit(&self, action: Action, validate: Option<bool>) -> Result<Submitted> {
        let request_id = get_request_id(&action)?;

        if validate.unwrap_or(self.config.validate_before_persist) {
            let entries = self.log.get_entries(&request_id).await?;
            let outcome = self.reconciler.fold_channel(&request_id, entries);
            if let Err(e) = self.reconciler.validate_against(&action, now_seconds(), &outcome) {
                warn!(
                    request_id = %request_id,
                    action = ?action.data.name,
                    error = %e,
                    "action rejected"
                );
                return Err(e.into());
            }
        }

        self.persist(action, request_id, &[]).await
    }

    async fn persist(
        &self,
        action: Action,
        request_id: RequestId,
        topics: &[TopicHash],
    ) -> Result<Submitted> {
        let payload = Bytes::from(action.to_vec()?);
        let handle = self.log.persist(payload, &request_id, topics).await?;
        debug!(
            request_id = %request_id,
            action = ?action.data.name,
            timestamp = handle.timestamp,
            topics = topics.len(),
            "persisted action"
        );
        Ok(Submitted {
            request_id,
            action,
            handle,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Rebuild one request from its channel.
    pub async fn get_request_from_id(&self, request_id: &RequestId) -> Result<ChannelReport> {
        let entries = self.log.get_entries(request_id).await?;
        Ok(self.reconciler.reconcile_channel(request_id, entries))
    }

    /// Rebuild every request indexed under `topic`.
    pub async fn get_requests_by_topic<T: Serialize + ?Sized>(
        &self,
        topic: &T,
        range: Option<TimeRange>,
    ) -> Result<BTreeMap<ChannelId, ChannelReport>> {
        let topic = TopicHash::of(topic)?;
        let channels = self.log.get_entries_by_topic(&topic, range).await?;
        Ok(self.reconciler.reconcile_channels(channels).await?)
    }

    /// Rebuild every request indexed under any of `topics`.
    pub async fn get_requests_by_multiple_topics<T: Serialize>(
        &self,
        topics: &[T],
        range: Option<TimeRange>,
    ) -> Result<BTreeMap<ChannelId, ChannelReport>> {
        if topics.is_empty() {
            return Err(RequestLogicError::InvalidInput("topics must not be empty".into()));
        }
        let topics = hash_topics(topics)?;
        let channels = self.log.get_entries_by_topics(&topics, range).await?;
        Ok(self.reconciler.reconcile_channels(channels).await?)
    }
}

fn now_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
