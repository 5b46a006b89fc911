use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{ExecuteRequest, ExecuteResponse};
use crate::error::RoutingError;
use crate::model::execution::ExecutionStatus;
use crate::pipeline::{deposit, provisional, reserve};

/// `POST /routing/execute/v2` - promotes a provisional quote into a
/// reservation and issues deposit instructions for it. The execution record
/// itself isn't created until the deposit is confirmed (see the webhook
/// handler): until then the client only holds a reservation.
pub async fn post_execute(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    if req.quote_id.is_empty() || req.client_id.is_empty() {
        return Err(ApiError::BadRequest("quoteId and clientId are required".to_string()));
    }

    let provisional = provisional::get_provisional(state.store.as_ref(), state.clock.as_ref(), &req.quote_id)
        .await?;
    if provisional.route.is_none() {
        return Err(ApiError::BadRequest(format!("quote {} has no route", req.quote_id)));
    }

    let reserved = reserve::reserve(
        state.store.as_ref(),
        state.clock.as_ref(),
        &req.quote_id,
        &req.client_id,
        None,
    )
    .await?;

    let deposit_record = deposit::issue_deposit(
        state.store.as_ref(),
        state.clock.as_ref(),
        &state.config,
        &req.quote_id,
        &req.client_id,
        &reserved,
    )
    .await
    .map_err(|err| match err {
        RoutingError::InvalidQuote(msg) => ApiError::BadRequest(msg),
        other => ApiError::from(other),
    })?;

    Ok(Json(ExecuteResponse {
        reservation_id: reserved.reservation_id,
        quote_id: reserved.quote_id,
        status: ExecutionStatus::PendingApproval,
        deposit_instructions: deposit_record.instructions,
        reserved_until: reserved.reserved_until_ts,
        otc_reservation_id: reserved
            .otc_reservation_meta
            .and_then(|m| m.otc_reservation_id),
    }))
}
