use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::types::HealthResponse;

/// `GET /routing/health` - ambient liveness probe.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        now_ms: state.clock.now_ms(),
        last_fast_prefetch_tick_ms: state.prefetch.last_fast_tick_ms(),
        last_slow_prefetch_tick_ms: state.prefetch.last_slow_tick_ms(),
    })
}
