use serde::{Deserialize, Serialize};

use crate::model::deposit::DepositInstructions;
use crate::model::provisional::ScoringMeta;
use crate::model::route::Route;

// ── Request types ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub amount_in: f64,
    pub from_token: String,
    pub to_token: String,
    #[serde(default)]
    pub intermediates: Vec<String>,
    pub min_expiry_ms: Option<i64>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub quote_id: String,
    pub client_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositWebhookRequest {
    pub payment_reference: String,
    pub amount_received: f64,
    #[serde(default)]
    pub bank_tx_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub execution_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesByPairQuery {
    pub from_token: String,
    pub to_token: String,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub quote_id: String,
    pub route: Option<Route>,
    pub amount_out: f64,
    pub net_amount_out: f64,
    pub expiry_ts: i64,
    #[serde(rename = "type")]
    pub quote_type: crate::model::provisional::QuoteType,
    pub confidence: f64,
    pub scoring_meta: ScoringMeta,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quotes: Vec<QuoteSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub reservation_id: String,
    pub quote_id: String,
    pub status: crate::model::execution::ExecutionStatus,
    pub deposit_instructions: DepositInstructions,
    pub reserved_until: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otc_reservation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub execution_id: String,
    pub status: crate::model::execution::ExecutionStatus,
    pub route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hashes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub now_ms: i64,
    pub last_fast_prefetch_tick_ms: i64,
    pub last_slow_prefetch_tick_ms: i64,
}
