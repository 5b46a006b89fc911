use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{StatusQuery, StatusResponse};
use crate::pipeline::execution;

/// `GET /routing/status?executionId=...`
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let record = execution::get_execution(state.store.as_ref(), &query.execution_id).await?;

    Ok(Json(StatusResponse {
        execution_id: record.execution_id,
        status: record.status,
        route: record.route,
        transaction_hashes: (!record.tx_hashes.is_empty()).then_some(record.tx_hashes),
        current_step: Some(record.current_step),
        completed_at: record.completed_ts,
        error: record.error,
    }))
}
