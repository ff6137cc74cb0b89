//! # Request Logic Core
//!
//! Pure primitives for request logic: signed actions, the request state
//! machine, amounts, identities, and canonical hashing.
//!
//! This crate contains no I/O, no storage, no networking. Every operation
//! takes a request snapshot by reference and returns a new one.
//!
//! ## Key Types
//!
//! - [`Action`] - A signed, versioned instruction
//! - [`Request`] - The aggregate rebuilt by folding actions
//! - [`Amount`] - Arbitrary-precision non-negative amount
//! - [`Identity`] / [`Role`] - Parties and their role in a request
//! - [`VersionPolicy`] - Which protocol versions are accepted
//!
//! ## Canonicalization
//!
//! Hashes and signatures cover deterministic CBOR. See [`canonical`] module.

pub mod action;
pub mod actions;
pub mod advanced;
pub mod amount;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod logic;
pub mod request;
pub mod signature;
pub mod topic;
pub mod types;
pub mod version;

pub use action::{
    create_action, get_request_id, get_role_in_action, get_signer_identity_from_action,
    get_version_from_action, is_action_version_supported, Action, ActionName, AmountParameters,
    CreateParameters, RequestParameters, UnsignedActionData,
};
pub use advanced::{AdvancedLogic, ContentDataExtension};
pub use amount::Amount;
pub use canonical::{canonical_bytes, content_hash, normalized_hash};
pub use crypto::{ContentHash, EcdsaKeypair};
pub use error::{LogicError, Result};
pub use identity::{are_equal, get_role, Identity, IdentityType, Parties, Role};
pub use logic::{
    apply_action_to_request, apply_actions, compute_request_id, format_accept,
    format_add_extensions_data, format_cancel, format_create, format_increase_expected_amount,
    format_reduce_expected_amount,
};
pub use request::{check_request, Event, EventParameters, Request};
pub use signature::{
    EcdsaSignatureProvider, Signature, SignatureMethod, SignatureParameters, SignatureProvider,
};
pub use topic::TopicHash;
pub use types::{ChannelId, Currency, CurrencyType, RequestId, RequestState};
pub use version::{is_supported, VersionPolicy, CURRENT_VERSION};
