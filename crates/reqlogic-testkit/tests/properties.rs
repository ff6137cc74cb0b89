//! Property tests of the request logic and the reconciliation engine.

use proptest::prelude::*;

use reqlogic_core::amount::{add, reduce};
use reqlogic_core::{
    apply_action_to_request, Amount, LogicError, Request, RequestState, VersionPolicy,
};
use reqlogic_log::LogEntry;
use reqlogic_reconcile::Reconciler;
use reqlogic_testkit::generators::{amount, extensions_data};
use reqlogic_testkit::{channel_of, confirmed_entry, ChannelHistory, TestFixture};

fn normalized(a: &str) -> String {
    Amount::from(a).to_decimal().unwrap()
}

/// Fold `history` action by action, keeping the last good state.
fn fold_history(fixture: &TestFixture, history: &ChannelHistory) -> Vec<Request> {
    let (_, actions) = history.actions(fixture);
    let policy = VersionPolicy::default();
    let mut states: Vec<Request> = Vec::new();
    for (i, action) in actions.iter().enumerate() {
        let timestamp = 100 + i as u64;
        if let Ok(next) = apply_action_to_request(states.last(), action, timestamp, &policy, None) {
            states.push(next);
        }
    }
    states
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reduce_undoes_add(a in amount(), b in amount()) {
        let (amount_a, amount_b) = (Amount::from(a.as_str()), Amount::from(b.as_str()));
        let sum = add(&amount_a, &amount_b).unwrap();
        prop_assert_eq!(reduce(&Amount::from(sum), &amount_b).unwrap(), normalized(&a));
    }

    #[test]
    fn reduce_below_zero_fails(a in amount(), b in amount()) {
        let (amount_a, amount_b) = (Amount::from(a.as_str()), Amount::from(b.as_str()));
        let bigger = amount_b.to_biguint().unwrap() > amount_a.to_biguint().unwrap();
        prop_assert_eq!(reduce(&amount_a, &amount_b).is_err(), bigger);
    }

    #[test]
    fn reconciliation_ignores_input_order(
        (channel, entries, shuffled) in any::<ChannelHistory>().prop_flat_map(|history| {
            let (channel, entries) = history.entries(&TestFixture::new(), 100);
            (Just(channel), Just(entries.clone()), Just(entries).prop_shuffle())
        })
    ) {
        let reconciler = Reconciler::default();
        prop_assert_eq!(
            reconciler.reconcile_channel(&channel, entries),
            reconciler.reconcile_channel(&channel, shuffled)
        );
    }

    #[test]
    fn replayed_increase_applies_once(
        expected in "[1-9][0-9]{0,12}",
        delta in "[1-9][0-9]{0,12}",
        replays in 1usize..4
    ) {
        let fixture = TestFixture::new();
        let create = fixture.create(&expected);
        let channel = channel_of(&create);
        let increase = fixture.increase(&channel, &delta);

        let mut entries = vec![confirmed_entry(&create, 10), confirmed_entry(&increase, 11)];
        let once = Reconciler::default().reconcile_channel(&channel, entries.clone());
        for i in 0..replays {
            entries.push(confirmed_entry(&increase, 12 + i as u64));
        }
        let replayed = Reconciler::default().reconcile_channel(&channel, entries);

        prop_assert_eq!(&once.confirmed, &replayed.confirmed);
        prop_assert_eq!(
            replayed.confirmed.unwrap().expected_amount,
            add(&Amount::from(expected.as_str()), &Amount::from(delta.as_str())).unwrap()
        );
        prop_assert_eq!(replayed.ignored.len(), replays);
    }

    #[test]
    fn extensions_data_never_shrinks(history: ChannelHistory) {
        let states = fold_history(&TestFixture::new(), &history);
        for pair in states.windows(2) {
            prop_assert!(pair[1].extensions_data.len() >= pair[0].extensions_data.len());
        }
    }

    #[test]
    fn only_the_payer_accepts(history: ChannelHistory) {
        let fixture = TestFixture::new();
        let states = fold_history(&fixture, &history);
        let request = states.last().unwrap();
        let channel = request.request_id.clone();
        let policy = VersionPolicy::default();

        for party in [&fixture.payee, &fixture.third_party] {
            let accept = party.sign(
                reqlogic_core::ActionName::Accept,
                serde_json::json!({ "requestId": channel }),
            );
            let err = apply_action_to_request(Some(request), &accept, 1_000, &policy, None)
                .unwrap_err();
            prop_assert!(matches!(err, LogicError::NotAuthorized(_)));
        }

        let accept = fixture.accept(&channel);
        let accepted = apply_action_to_request(Some(request), &accept, 1_000, &policy, None);
        prop_assert_eq!(accepted.is_ok(), request.state == RequestState::Created);
    }

    #[test]
    fn cancel_rights_depend_on_role(history: ChannelHistory) {
        let fixture = TestFixture::new();
        let states = fold_history(&fixture, &history);
        let request = states.last().unwrap();
        let channel = request.request_id.clone();
        let policy = VersionPolicy::default();

        let cancel = fixture.cancel(&channel, &fixture.payer);
        let by_payer = apply_action_to_request(Some(request), &cancel, 1_000, &policy, None);
        prop_assert_eq!(by_payer.is_ok(), request.state == RequestState::Created);

        let cancel = fixture.cancel(&channel, &fixture.payee);
        let by_payee = apply_action_to_request(Some(request), &cancel, 1_000, &policy, None);
        prop_assert_eq!(by_payee.is_ok(), request.state != RequestState::Cancelled);
    }

    #[test]
    fn malformed_pending_leaves_confirmed_alone(
        history: ChannelHistory,
        garbage in prop::collection::vec(any::<u8>(), 0..64)
    ) {
        let fixture = TestFixture::new();
        let (channel, entries) = history.entries(&fixture, 100);
        let clean = Reconciler::default().reconcile_channel(&channel, entries.clone());

        let mut dirty_entries = entries;
        dirty_entries.push(LogEntry::pending(garbage, 10_000));
        let dirty = Reconciler::default().reconcile_channel(&channel, dirty_entries);

        prop_assert_eq!(clean.confirmed, dirty.confirmed);
    }

    #[test]
    fn create_keeps_extensions_data(data in extensions_data()) {
        let fixture = TestFixture::new();
        let mut params = fixture.create_params("10");
        params.extensions_data = Some(data.clone());
        let create = fixture.create_with(&params, &fixture.payee);

        let policy = VersionPolicy::default();
        let request = apply_action_to_request(None, &create, 1, &policy, None).unwrap();
        prop_assert_eq!(request.extensions_data, data);
    }
}
