//! Test fixtures and helpers.
//!
//! Deterministic parties and signed actions for integration tests.

use std::sync::Arc;

use serde_json::{json, Value};

use reqlogic::{RequestLogic, RequestLogicConfig};
use reqlogic_core::signature::sign_with_keypair;
use reqlogic_core::{
    get_request_id, Action, ActionName, Amount, ChannelId, CreateParameters, Currency,
    EcdsaKeypair, EcdsaSignatureProvider, Identity, UnsignedActionData, CURRENT_VERSION,
};
use reqlogic_log::{LogEntry, MemoryLog};

/// Default timestamp of fixture requests.
pub const TIMESTAMP: u64 = 1_544_426_030;

/// A keypair and the identity it signs as.
#[derive(Debug, Clone)]
pub struct Party {
    pub keypair: EcdsaKeypair,
    pub identity: Identity,
}

impl Party {
    /// Party with secret key `index + 1` (big-endian, 32 bytes).
    pub fn from_index(index: u8) -> Self {
        let mut secret = [0u8; 32];
        secret[31] = index.wrapping_add(1).max(1);
        let keypair =
            EcdsaKeypair::from_secret_bytes(&secret).expect("small secret keys are valid");
        let identity = Identity::ethereum(keypair.address());
        Self { keypair, identity }
    }

    /// Sign raw parameters under `name` at the current version.
    pub fn sign(&self, name: ActionName, parameters: Value) -> Action {
        let data = UnsignedActionData {
            name,
            parameters,
            version: CURRENT_VERSION.into(),
        };
        let signature = sign_with_keypair(&data, &self.keypair).expect("signing fixture action");
        Action { data, signature }
    }
}

/// A payee, a payer and a third party.
pub struct TestFixture {
    pub payee: Party,
    pub payer: Party,
    pub third_party: Party,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            payee: Party::from_index(0x10),
            payer: Party::from_index(0x21),
            third_party: Party::from_index(0x32),
        }
    }

    /// A provider that can sign for every party of the fixture.
    pub fn provider(&self) -> EcdsaSignatureProvider {
        let mut provider = EcdsaSignatureProvider::new();
        for party in [&self.payee, &self.payer, &self.third_party] {
            provider.add_keypair(party.keypair.clone());
        }
        provider
    }

    /// RequestLogic over `log`, signing for the fixture's parties.
    pub fn request_logic(
        &self,
        log: MemoryLog,
        config: RequestLogicConfig,
    ) -> RequestLogic<MemoryLog> {
        RequestLogic::new(log, config).with_signature_provider(Arc::new(self.provider()))
    }

    pub fn create_params(&self, expected_amount: &str) -> CreateParameters {
        CreateParameters {
            currency: Some(Currency::eth()),
            expected_amount: Some(Amount::from(expected_amount)),
            payee: Some(self.payee.identity.clone()),
            payer: Some(self.payer.identity.clone()),
            timestamp: Some(TIMESTAMP),
            ..Default::default()
        }
    }

    /// CREATE signed by the payee.
    pub fn create(&self, expected_amount: &str) -> Action {
        self.create_with(&self.create_params(expected_amount), &self.payee)
    }

    pub fn create_with(&self, params: &CreateParameters, signer: &Party) -> Action {
        let parameters = serde_json::to_value(params).expect("create parameters serialize");
        signer.sign(ActionName::Create, parameters)
    }

    /// ACCEPT signed by the payer.
    pub fn accept(&self, channel: &ChannelId) -> Action {
        self.payer.sign(ActionName::Accept, json!({ "requestId": channel }))
    }

    pub fn cancel(&self, channel: &ChannelId, signer: &Party) -> Action {
        signer.sign(ActionName::Cancel, json!({ "requestId": channel }))
    }

    /// INCREASE_EXPECTED_AMOUNT signed by the payer.
    pub fn increase(&self, channel: &ChannelId, delta: &str) -> Action {
        self.payer.sign(
            ActionName::IncreaseExpectedAmount,
            json!({ "requestId": channel, "deltaAmount": delta }),
        )
    }

    /// REDUCE_EXPECTED_AMOUNT signed by the payee.
    pub fn reduce(&self, channel: &ChannelId, delta: &str) -> Action {
        self.payee.sign(
            ActionName::ReduceExpectedAmount,
            json!({ "requestId": channel, "deltaAmount": delta }),
        )
    }

    pub fn add_extensions_data(
        &self,
        channel: &ChannelId,
        data: Vec<Value>,
        signer: &Party,
    ) -> Action {
        signer.sign(
            ActionName::AddExtensionsData,
            json!({ "requestId": channel, "extensionsData": data }),
        )
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create `count` distinct parties.
pub fn multi_party_fixtures(count: u8) -> Vec<Party> {
    (0..count).map(Party::from_index).collect()
}

/// The channel a CREATE action opens.
pub fn channel_of(create: &Action) -> ChannelId {
    get_request_id(create).expect("not a create action")
}

pub fn confirmed_entry(action: &Action, timestamp: u64) -> LogEntry {
    LogEntry::confirmed(payload(action), timestamp)
}

pub fn pending_entry(action: &Action, timestamp: u64) -> LogEntry {
    LogEntry::pending(payload(action), timestamp)
}

fn payload(action: &Action) -> Vec<u8> {
    action.to_vec().expect("serializing fixture action")
}
