//! # Request Logic
//!
//! Unified API for requests: signed actions stored in an append-only
//! transaction log and folded back into request state when read.
//!
//! ## Overview
//!
//! - **Actions**: signed, versioned instructions (create, accept, cancel,
//!   change the expected amount, add extensions data)
//! - **Requests**: the state rebuilt by folding the actions of a channel
//! - **Channels**: one per request, keyed by the request id
//! - **Topics**: hashes under which channels are indexed for lookup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use reqlogic::core::{Amount, CreateParameters, Currency, EcdsaKeypair, EcdsaSignatureProvider};
//! use reqlogic::log::MemoryLog;
//! use reqlogic::{RequestLogic, RequestLogicConfig};
//!
//! async fn example() -> reqlogic::Result<()> {
//!     let mut provider = EcdsaSignatureProvider::new();
//!     let payee = provider.add_keypair(EcdsaKeypair::generate());
//!
//!     let logic = RequestLogic::new(MemoryLog::auto_confirm(), RequestLogicConfig::default())
//!         .with_signature_provider(Arc::new(provider));
//!
//!     let params = CreateParameters {
//!         currency: Some(Currency::eth()),
//!         expected_amount: Some(Amount::from("1000")),
//!         payee: Some(payee.clone()),
//!         ..Default::default()
//!     };
//!     let submitted = logic.create_request(params, &payee, &["invoices"]).await?;
//!
//!     let report = logic.get_request_from_id(&submitted.request_id).await?;
//!     println!("{:?}", report.confirmed);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `reqlogic::core` - Actions, requests, amounts, signatures
//! - `reqlogic::log` - Transaction log abstraction and in-memory log
//! - `reqlogic::reconcile` - Reconciliation engine

pub mod error;
pub mod request_logic;

pub use reqlogic_core as core;
pub use reqlogic_log as log;
pub use reqlogic_reconcile as reconcile;

pub use error::{RequestLogicError, Result};
pub use request_logic::{RequestLogic, RequestLogicConfig, Submitted};

pub use reqlogic_core::{
    Action, ActionName, AmountParameters, CreateParameters, Identity, Request, RequestId,
    RequestParameters, RequestState,
};
pub use reqlogic_reconcile::{ChannelReport, IgnoredEntry, PendingRequest};
