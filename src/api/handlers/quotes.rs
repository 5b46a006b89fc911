use axum::extract::{Query, State};
use axum::Json;

use crate::api::state::AppState;
use crate::api::types::QuotesByPairQuery;
use crate::model::quote::EdgeQuote;

/// `GET /routing/quotes?fromToken=&toToken=` - raw cache inspection, no
/// scoring or routing applied.
pub async fn get_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuotesByPairQuery>,
) -> Json<Vec<EdgeQuote>> {
    Json(state.cache.get_cached_by_pair(&query.from_token, &query.to_token).await)
}
