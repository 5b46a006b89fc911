use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::types::{DepositWebhookRequest, WebhookResponse};
use crate::error::RoutingError;
use crate::model::execution::ExecutionStatus;
use crate::pipeline::{deposit, execution};

/// `POST /routing/webhooks/deposit` - the webhook contract never surfaces a
/// 4xx to the caller: an unknown reference is reported as
/// `{success: false}` with 200, not propagated as `ApiError::NotFound`.
pub async fn post_deposit_webhook(
    State(state): State<AppState>,
    Json(req): Json<DepositWebhookRequest>,
) -> Json<WebhookResponse> {
    let confirmed = deposit::confirm_deposit(
        state.store.as_ref(),
        state.clock.as_ref(),
        &req.payment_reference,
        req.amount_received,
        req.bank_tx_id,
    )
    .await;

    let record = match confirmed {
        Ok(record) => record,
        Err(RoutingError::NotFound(msg)) | Err(RoutingError::Expired(msg)) => {
            println!("[webhook] deposit confirmation rejected: {msg}");
            return Json(WebhookResponse { success: false, deposit_id: None, execution_id: None });
        }
        Err(err) => {
            eprintln!("[webhook] deposit confirmation failed: {err}");
            return Json(WebhookResponse { success: false, deposit_id: None, execution_id: None });
        }
    };

    let exec_key = format!("execution:quote:{}", record.quote_id);
    let existing = match state.store.get(&exec_key).await {
        Some(execution_id) => execution::get_execution(state.store.as_ref(), &execution_id).await.ok(),
        None => None,
    };

    let exec_record = match existing {
        Some(rec) => rec,
        None => {
            let Some((route, fallback_route)) = reconstruct_route(&state, &record.quote_id).await else {
                return Json(WebhookResponse {
                    success: true,
                    deposit_id: Some(record.deposit_id.clone()),
                    execution_id: None,
                });
            };
            execution::create_execution(
                state.store.as_ref(),
                state.clock.as_ref(),
                &record.quote_id,
                &record.deposit_id,
                route,
                fallback_route,
            )
            .await
        }
    };

    if exec_record.status == ExecutionStatus::PendingApproval {
        let mut rec = exec_record.clone();
        if rec.begin_execution_via_deposit() {
            execution::save_record(state.store.as_ref(), &rec).await;
        }
    }

    let execution_id = exec_record.execution_id.clone();
    tokio::spawn(execution::drive_execution(
        state.store.clone(),
        state.clock.clone(),
        state.executor.clone(),
        execution_id.clone(),
    ));

    Json(WebhookResponse {
        success: true,
        deposit_id: Some(record.deposit_id),
        execution_id: Some(execution_id),
    })
}

/// Deposit records don't carry the route - it lives on the reservation,
/// which has already been consumed by the time the webhook fires. Routes
/// (and the runner-up fallback route alongside them) are looked up from the
/// reserved record's quote id while it's still within its TTL; once it's
/// gone there's nothing left to execute against.
async fn reconstruct_route(
    state: &AppState,
    quote_id: &str,
) -> Option<(crate::model::route::Route, Option<crate::model::route::Route>)> {
    let reserved =
        crate::pipeline::reserve::get_reserved(state.store.as_ref(), state.clock.as_ref(), quote_id)
            .await
            .ok()?;
    let route = reserved.route?;
    Some((route, reserved.fallback_route))
}
