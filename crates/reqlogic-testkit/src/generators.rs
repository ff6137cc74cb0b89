//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Value};

use reqlogic_core::{Action, ChannelId};
use reqlogic_log::LogEntry;

use crate::fixtures::{confirmed_entry, pending_entry, TestFixture};

/// A decimal non-negative integer, up to 40 digits.
pub fn amount() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("0".to_string()),
        "[1-9][0-9]{0,39}".prop_map(String::from),
    ]
}

/// Something that is not a non-negative integer.
pub fn invalid_amount() -> impl Strategy<Value = String> {
    prop_oneof![
        "-[1-9][0-9]{0,10}".prop_map(String::from),
        "[0-9]{1,5}\\.[0-9]{1,5}".prop_map(String::from),
        "[a-z]{1,8}".prop_map(String::from),
        Just(String::new()),
    ]
}

/// Between zero and three extension records.
pub fn extensions_data() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        ("[a-z]{1,8}", any::<u32>()).prop_map(|(id, value)| json!({ "id": id, "value": value })),
        0..=3,
    )
}

/// One action applied to an existing request.
#[derive(Debug, Clone)]
pub enum ActionStep {
    Accept,
    CancelByPayee,
    CancelByPayer,
    Increase(String),
    Reduce(String),
    AddExtensionsData(Vec<Value>),
}

impl Arbitrary for ActionStep {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let small_amount = "[1-9][0-9]{0,5}".prop_map(String::from);
        prop_oneof![
            Just(ActionStep::Accept),
            Just(ActionStep::CancelByPayee),
            Just(ActionStep::CancelByPayer),
            small_amount.clone().prop_map(ActionStep::Increase),
            small_amount.prop_map(ActionStep::Reduce),
            prop::collection::vec(
                "[a-z]{1,8}".prop_map(|id| json!({ "id": id })),
                1..=2
            )
            .prop_map(ActionStep::AddExtensionsData),
        ]
        .boxed()
    }
}

impl ActionStep {
    /// Sign this step for `channel` with the fixture's parties.
    pub fn to_action(&self, fixture: &TestFixture, channel: &ChannelId) -> Action {
        match self {
            ActionStep::Accept => fixture.accept(channel),
            ActionStep::CancelByPayee => fixture.cancel(channel, &fixture.payee),
            ActionStep::CancelByPayer => fixture.cancel(channel, &fixture.payer),
            ActionStep::Increase(delta) => fixture.increase(channel, delta),
            ActionStep::Reduce(delta) => fixture.reduce(channel, delta),
            ActionStep::AddExtensionsData(data) => {
                fixture.add_extensions_data(channel, data.clone(), &fixture.third_party)
            }
        }
    }
}

/// A channel history: a create for `expected_amount` followed by `steps`.
#[derive(Debug, Clone)]
pub struct ChannelHistory {
    pub expected_amount: String,
    pub steps: Vec<ActionStep>,
    /// Index from which entries are pending rather than confirmed.
    pub pending_from: usize,
}

impl Arbitrary for ChannelHistory {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            "[1-9][0-9]{0,8}",
            prop::collection::vec(any::<ActionStep>(), 0..8),
            any::<prop::sample::Index>(),
        )
            .prop_map(|(expected_amount, steps, index)| {
                let pending_from = index.index(steps.len() + 2);
                ChannelHistory {
                    expected_amount,
                    steps,
                    pending_from,
                }
            })
            .boxed()
    }
}

impl ChannelHistory {
    /// Signed actions in order, the create first.
    pub fn actions(&self, fixture: &TestFixture) -> (ChannelId, Vec<Action>) {
        let create = fixture.create(&self.expected_amount);
        let channel = crate::fixtures::channel_of(&create);
        let mut actions = vec![create];
        actions.extend(self.steps.iter().map(|step| step.to_action(fixture, &channel)));
        (channel, actions)
    }

    /// Log entries with distinct, increasing timestamps starting at `start`.
    ///
    /// Entries before `pending_from` are confirmed, the rest pending, so no
    /// pending entry is ever stale.
    pub fn entries(&self, fixture: &TestFixture, start: u64) -> (ChannelId, Vec<LogEntry>) {
        let (channel, actions) = self.actions(fixture);
        let entries = actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                let timestamp = start + i as u64;
                if i < self.pending_from {
                    confirmed_entry(action, timestamp)
                } else {
                    pending_entry(action, timestamp)
                }
            })
            .collect();
        (channel, entries)
    }
}
