//! # Request Logic Testkit
//!
//! Testing utilities for request logic.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: canonical encodings, digests and addresses with
//!   known expected outputs
//! - **Generators**: Proptest strategies for amounts, actions and whole
//!   channel histories
//! - **Fixtures**: deterministic parties and helpers that sign actions
//!
//! ## Golden Vectors
//!
//! ```rust
//! use reqlogic_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use reqlogic_testkit::{ChannelHistory, TestFixture};
//!
//! proptest! {
//!     #[test]
//!     fn history_folds(history: ChannelHistory) {
//!         let fixture = TestFixture::new();
//!         let (_, actions) = history.actions(&fixture);
//!         prop_assert!(!actions.is_empty());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use reqlogic_testkit::fixtures::{channel_of, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let create = fixture.create("1000");
//! let accept = fixture.accept(&channel_of(&create));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    channel_of, confirmed_entry, multi_party_fixtures, pending_entry, Party, TestFixture,
};
pub use generators::{ActionStep, ChannelHistory};
pub use vectors::{address_vectors, canonical_vectors, keccak_vectors, verify_all_vectors};
