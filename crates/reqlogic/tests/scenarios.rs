//! End-to-end scenarios: direct application of actions and reconciliation of
//! channels read back from the transaction log.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use reqlogic::core::signature::sign_with_keypair;
use reqlogic::core::{
    apply_action_to_request, get_request_id, Amount, Currency, EcdsaKeypair,
    EcdsaSignatureProvider, LogicError, UnsignedActionData, VersionPolicy, CURRENT_VERSION,
};
use reqlogic::log::{LogEntry, MemoryLog};
use reqlogic::reconcile::reasons;
use reqlogic::{
    Action, ActionName, AmountParameters, CreateParameters, Identity, Request, RequestLogic,
    RequestLogicConfig, RequestParameters, RequestState,
};

const PAYEE_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000011";
const PAYER_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000022";
const EXPECTED_AMOUNT: &str = "123400000000000000";
const TIMESTAMP: u64 = 1_544_426_030;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn identity(key: &str) -> Identity {
    Identity::ethereum(EcdsaKeypair::from_hex(key).unwrap().address())
}

fn sign(name: ActionName, parameters: serde_json::Value, key: &str) -> Action {
    let data = UnsignedActionData {
        name,
        parameters,
        version: CURRENT_VERSION.into(),
    };
    let signature = sign_with_keypair(&data, &EcdsaKeypair::from_hex(key).unwrap()).unwrap();
    Action { data, signature }
}

fn create_params() -> CreateParameters {
    CreateParameters {
        currency: Some(Currency::eth()),
        expected_amount: Some(Amount::from(EXPECTED_AMOUNT)),
        payee: Some(identity(PAYEE_KEY)),
        payer: Some(identity(PAYER_KEY)),
        timestamp: Some(TIMESTAMP),
        ..Default::default()
    }
}

fn create_action() -> Action {
    sign(
        ActionName::Create,
        serde_json::to_value(create_params()).unwrap(),
        PAYEE_KEY,
    )
}

fn apply(
    request: Option<&Request>,
    action: &Action,
    timestamp: u64,
) -> reqlogic::core::Result<Request> {
    apply_action_to_request(request, action, timestamp, &VersionPolicy::default(), None)
}

fn reduce_action(request: &Request, delta: &str) -> Action {
    sign(
        ActionName::ReduceExpectedAmount,
        json!({ "requestId": request.request_id, "deltaAmount": delta }),
        PAYEE_KEY,
    )
}

#[test]
fn scenario_1_create_by_payee() -> Result<()> {
    let request = apply(None, &create_action(), TIMESTAMP)?;
    assert_eq!(request.state, RequestState::Created);
    assert_eq!(request.events.len(), 1);
    assert_eq!(request.expected_amount, EXPECTED_AMOUNT);
    Ok(())
}

#[test]
fn scenario_2_accept_by_payer() -> Result<()> {
    let request = apply(None, &create_action(), TIMESTAMP)?;
    let accept = sign(
        ActionName::Accept,
        json!({ "requestId": request.request_id }),
        PAYER_KEY,
    );
    let request = apply(Some(&request), &accept, TIMESTAMP + 1)?;
    assert_eq!(request.state, RequestState::Accepted);
    assert_eq!(request.events.len(), 2);
    Ok(())
}

#[test]
fn scenario_3_reduce_by_payee() -> Result<()> {
    let request = apply(None, &create_action(), TIMESTAMP)?;
    let reduce = reduce_action(&request, "100000000000000000");
    let request = apply(Some(&request), &reduce, TIMESTAMP + 1)?;
    assert_eq!(request.expected_amount, "23400000000000000");
    Ok(())
}

#[test]
fn scenario_4_reduce_below_zero() -> Result<()> {
    let request = apply(None, &create_action(), TIMESTAMP)?;
    let reduce = reduce_action(&request, "223400000000000000");
    let err = apply(Some(&request), &reduce, TIMESTAMP + 1).unwrap_err();
    assert_eq!(
        err,
        LogicError::InvalidAmount("result of reduce is not valid".into())
    );
    Ok(())
}

#[tokio::test]
async fn scenario_5_stale_pending_cancel() -> Result<()> {
    init_tracing();
    let log = MemoryLog::new();
    let create = create_action();
    let channel = get_request_id(&create)?;
    let cancel = sign(
        ActionName::Cancel,
        json!({ "requestId": channel }),
        PAYEE_KEY,
    );

    log.insert_entry(&channel, LogEntry::confirmed(create.to_vec()?, 20), &[])?;
    log.insert_entry(&channel, LogEntry::pending(cancel.to_vec()?, 10), &[])?;

    let logic = RequestLogic::new(log, RequestLogicConfig::default());
    let report = logic.get_request_from_id(&channel).await?;

    assert_eq!(report.confirmed.map(|r| r.state), Some(RequestState::Created));
    assert!(report.pending.is_none());
    assert_eq!(report.ignored.len(), 1);
    assert_eq!(report.ignored[0].reason, reasons::STALE_PENDING);
    Ok(())
}

#[tokio::test]
async fn scenario_6_duplicated_confirmed_entries() -> Result<()> {
    init_tracing();
    let log = MemoryLog::new();
    let create = create_action();
    let channel = get_request_id(&create)?;
    let payload = create.to_vec()?;

    log.insert_entry(&channel, LogEntry::confirmed(payload.clone(), 10), &[])?;
    log.insert_entry(&channel, LogEntry::confirmed(payload, 11), &[])?;

    let logic = RequestLogic::new(log, RequestLogicConfig::default());
    let report = logic.get_request_from_id(&channel).await?;

    let request = report.confirmed.expect("confirmed request");
    assert_eq!(request.events.len(), 1);
    assert_eq!(report.ignored.len(), 1);
    assert_eq!(report.ignored[0].reason, reasons::DUPLICATED);
    Ok(())
}

#[tokio::test]
async fn full_lifecycle_through_the_api() -> Result<()> {
    init_tracing();
    let mut provider = EcdsaSignatureProvider::new();
    let payee = provider.add_keypair(EcdsaKeypair::from_hex(PAYEE_KEY)?);
    let payer = provider.add_keypair(EcdsaKeypair::from_hex(PAYER_KEY)?);

    let config = RequestLogicConfig {
        validate_before_persist: true,
        ..Default::default()
    };
    let logic =
        RequestLogic::new(MemoryLog::new(), config).with_signature_provider(Arc::new(provider));

    let created = logic
        .create_request(create_params(), &payee, &[&payee, &payer])
        .await?;
    let id = created.request_id.clone();

    // Pending until the log confirms it.
    let report = logic.get_request_from_id(&id).await?;
    assert!(report.confirmed.is_none());
    assert_eq!(report.pending.and_then(|p| p.state), Some(RequestState::Created));

    logic.log().confirm_channel(&id)?;
    created.handle.wait().await?;

    logic
        .accept_request(RequestParameters::new(id.clone()), &payer, None)
        .await?;
    logic
        .increase_expected_amount_request(
            AmountParameters::new(id.clone(), "100000000000000000"),
            &payer,
            None,
        )
        .await?;

    let report = logic.get_request_from_id(&id).await?;
    let confirmed = report.confirmed.expect("confirmed request");
    assert_eq!(confirmed.state, RequestState::Created);
    let pending = report.pending.expect("pending changes");
    assert_eq!(pending.state, Some(RequestState::Accepted));
    assert_eq!(pending.expected_amount.as_deref(), Some("223400000000000000"));
    assert_eq!(pending.events.map(|e| e.len()), Some(2));

    logic.log().confirm_channel(&id)?;
    logic
        .add_extensions_data_request(
            RequestParameters::new(id.clone()).with_extensions_data(vec![json!({"id": "note"})]),
            &payer,
            None,
        )
        .await?;
    logic
        .cancel_request(RequestParameters::new(id.clone()), &payee, None)
        .await?;
    logic.log().confirm_channel(&id)?;

    // A cancelled request cannot be cancelled again.
    let err = logic
        .cancel_request(RequestParameters::new(id.clone()), &payee, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot cancel an already canceled request");

    let by_payer = logic.get_requests_by_topic(&payer, None).await?;
    let request = by_payer[&id].confirmed.clone().expect("confirmed request");
    assert_eq!(request.state, RequestState::Cancelled);
    assert_eq!(request.expected_amount, "223400000000000000");
    assert_eq!(request.extensions_data.len(), 1);
    assert_eq!(request.events.len(), 5);

    let by_both = logic.get_requests_by_multiple_topics(&[&payee, &payer], None).await?;
    assert_eq!(by_both.len(), 1);
    Ok(())
}
