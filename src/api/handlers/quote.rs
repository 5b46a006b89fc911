use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{QuoteRequest, QuoteResponse, QuoteSummary};
use crate::model::provisional::QuoteType;
use crate::model::route::Route;
use crate::pipeline::provisional::store_provisional;
use crate::router::settling_legs;
use crate::scoring::score_route;

/// A route's quote type follows its steps: any non-DEX step makes it at
/// least partly OTC; an all-DEX route is pure DEX.
fn quote_type_for(route: &Route) -> QuoteType {
    let has_otc = route.steps.iter().any(|s| s.chain_id == 0);
    let has_dex = route.steps.iter().any(|s| s.chain_id != 0);
    match (has_otc, has_dex) {
        (true, true) => QuoteType::OtcDex,
        (true, false) => QuoteType::Otc,
        (false, _) => QuoteType::Dex,
    }
}

/// `POST /routing/quote/v2` - finds the best route, scores it, and persists
/// the result as an addressable provisional quote. An empty `quotes: []` is
/// a valid response, not an error: only malformed requests return 400.
pub async fn post_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<(axum::http::StatusCode, Json<QuoteResponse>), ApiError> {
    if req.amount_in <= 0.0 {
        return Err(ApiError::BadRequest("amountIn must be positive".to_string()));
    }
    if req.from_token.is_empty() || req.to_token.is_empty() {
        return Err(ApiError::BadRequest("fromToken and toToken are required".to_string()));
    }

    let (result, legs) = state
        .router
        .get_best_route_with_legs(
            req.amount_in,
            &req.from_token,
            &req.to_token,
            &req.intermediates,
            req.min_expiry_ms,
        )
        .await;

    let Some(route) = result.route else {
        return Ok((axum::http::StatusCode::OK, Json(QuoteResponse { quotes: Vec::new() })));
    };

    let settling: Vec<&crate::model::quote::EdgeQuote> = settling_legs(&legs);
    let scored = score_route(&state.config, &req.from_token, &req.to_token, route.total_out, &settling);
    let quote_type = quote_type_for(&route);
    let amount_out = route.total_out;
    let fee_bps = Some(route.total_fees_bps);
    let fallback_route = result.fallback_route;

    let provisional = store_provisional(
        state.store.as_ref(),
        state.clock.as_ref(),
        Some(route),
        fallback_route,
        req.amount_in,
        amount_out,
        scored.net_output,
        fee_bps,
        scored.scoring_meta.clone(),
        quote_type,
    )
    .await;

    let summary = QuoteSummary {
        quote_id: provisional.quote_id,
        route: provisional.route,
        amount_out,
        net_amount_out: provisional.net_amount_out,
        expiry_ts: provisional.expiry_ts,
        quote_type: provisional.quote_type,
        confidence: scored.scoring_meta.confidence,
        scoring_meta: provisional.scoring_meta,
    };

    Ok((axum::http::StatusCode::OK, Json(QuoteResponse { quotes: vec![summary] })))
}
