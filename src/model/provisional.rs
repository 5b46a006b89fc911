use serde::{Deserialize, Serialize};

use super::route::Route;

/// Default TTL for a provisional quote: 15 seconds.
pub const PROVISIONAL_TTL_MS: i64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteType {
    Otc,
    Dex,
    #[serde(rename = "OTC+DEX")]
    OtcDex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringMeta {
    pub settlement_days: f64,
    pub counterparty_risk: f64,
    pub time_penalty: f64,
    pub confidence: f64,
}

/// A scored route made addressable for a bounded window (see
/// `PROVISIONAL_TTL_MS`). `route` is `None` for a request that found no
/// viable path — an absent route is still a valid (empty) quote record,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionalQuote {
    pub quote_id: String,
    pub route: Option<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_route: Option<Route>,
    pub amount_in: f64,
    pub amount_out: f64,
    pub net_amount_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_bps: Option<u32>,
    pub expiry_ts: i64,
    pub created_ts: i64,
    #[serde(rename = "type")]
    pub quote_type: QuoteType,
    pub scoring_meta: ScoringMeta,
}

impl ProvisionalQuote {
    pub fn is_live(&self, now_ms: i64) -> bool {
        now_ms < self.expiry_ts
    }
}
