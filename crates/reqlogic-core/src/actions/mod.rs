//! One state transition per action kind.
//!
//! Every handler validates its parameters and the signer's role, then returns
//! a new [`Request`](crate::request::Request) with the action's extension data
//! appended and one more event. The prior request is only ever borrowed.

pub mod accept;
pub mod add_extensions_data;
pub mod cancel;
pub mod create;
pub mod increase_expected_amount;
pub mod reduce_expected_amount;

use crate::amount::Amount;
use crate::error::{LogicError, Result};
use crate::request::Request;
use crate::types::RequestId;

fn require_request_id(request_id: Option<&RequestId>) -> Result<&RequestId> {
    match request_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(LogicError::action("requestId must be given")),
    }
}

/// The action must name the request it is applied to.
fn require_target(request_id: Option<&RequestId>, request: &Request) -> Result<()> {
    if require_request_id(request_id)? != &request.request_id {
        return Err(LogicError::action("requestId does not match the request"));
    }
    Ok(())
}

fn require_delta_amount(delta: Option<&Amount>) -> Result<&Amount> {
    let delta = delta.ok_or_else(|| LogicError::action("deltaAmount must be given"))?;
    if !delta.is_valid() {
        return Err(LogicError::InvalidAmount(
            "deltaAmount must be a string representing a positive integer".into(),
        ));
    }
    Ok(delta)
}
