use serde::{Deserialize, Serialize};

use super::provisional::{ProvisionalQuote, QuoteType, ScoringMeta};
use super::route::Route;

/// Default TTL for a reserved quote: 300 seconds.
pub const RESERVED_TTL_MS: i64 = 300_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtcReservationMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otc_reservation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_instructions: Option<String>,
}

/// A provisional promoted by a client's intent to execute. Carries every
/// provisional field plus reservation bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedQuote {
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

    pub reservation_id: String,
    pub reserved_by_client: String,
    pub reserved_until_ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otc_reservation_meta: Option<OtcReservationMeta>,
}

impl ReservedQuote {
    pub fn from_provisional(
        provisional: ProvisionalQuote,
        reservation_id: String,
        reserved_by_client: String,
        reserved_until_ts: i64,
        otc_reservation_meta: Option<OtcReservationMeta>,
    ) -> Self {
        ReservedQuote {
            quote_id: provisional.quote_id,
            route: provisional.route,
            fallback_route: provisional.fallback_route,
            amount_in: provisional.amount_in,
            amount_out: provisional.amount_out,
            net_amount_out: provisional.net_amount_out,
            fee_bps: provisional.fee_bps,
            expiry_ts: provisional.expiry_ts,
            created_ts: provisional.created_ts,
            quote_type: provisional.quote_type,
            scoring_meta: provisional.scoring_meta,
            reservation_id,
            reserved_by_client,
            reserved_until_ts,
            otc_reservation_meta,
        }
    }

    pub fn is_live(&self, now_ms: i64) -> bool {
        now_ms < self.reserved_until_ts
    }

    pub fn requires_otc_reservation(&self) -> bool {
        matches!(self.quote_type, QuoteType::Otc | QuoteType::OtcDex)
    }
}
