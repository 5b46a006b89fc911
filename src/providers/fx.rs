use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::quote::EdgeQuote;
use crate::scoring::default_settlement_meta;

/// Raw ask/bid/mid for one FX pair as returned by the upstream feed.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct FxRate {
    pub ask: f64,
    pub bid: f64,
    pub mid: f64,
}

fn round_bps(spread_bps: f64) -> u32 {
    spread_bps.round().max(0.0) as u32
}

/// Builds the forward edge `(from -> to)` from a raw rate.
pub fn build_edge(
    venue_id: &str,
    from_token: &str,
    to_token: &str,
    rate: FxRate,
    now_ms: i64,
) -> EdgeQuote {
    let spread_bps = (rate.ask - rate.bid) / rate.mid * 10_000.0;
    EdgeQuote {
        venue_id: venue_id.to_string(),
        venue_kind: crate::model::quote::VenueKind::Fx,
        from_token: from_token.to_string(),
        to_token: to_token.to_string(),
        amount_in: 1.0,
        amount_out: rate.ask,
        max_amount_in: None,
        fee_bps: Some(round_bps(spread_bps / 2.0)),
        expiry_ts: now_ms + 60_000,
        last_updated_ts: now_ms,
        deposit_address: None,
        settlement_meta: Some(default_settlement_meta(from_token, to_token)),
    }
}

/// Synthesises the inverse edge `(to -> from)` from the same raw rate,
/// per `inverseAsk = 1/bid`, `inverseBid = 1/ask`.
pub fn build_inverse_edge(
    venue_id: &str,
    from_token: &str,
    to_token: &str,
    rate: FxRate,
    now_ms: i64,
) -> EdgeQuote {
    let inverse_ask = 1.0 / rate.bid;
    let inverse_bid = 1.0 / rate.ask;
    let inverse_mid = 1.0 / rate.mid;
    let inverse_spread_bps = (inverse_ask - inverse_bid) / inverse_mid * 10_000.0;
    EdgeQuote {
        venue_id: venue_id.to_string(),
        venue_kind: crate::model::quote::VenueKind::Fx,
        from_token: to_token.to_string(),
        to_token: from_token.to_string(),
        amount_in: 1.0,
        amount_out: inverse_ask,
        max_amount_in: None,
        fee_bps: Some(round_bps(inverse_spread_bps / 2.0)),
        expiry_ts: now_ms + 60_000,
        last_updated_ts: now_ms,
        deposit_address: None,
        settlement_meta: Some(default_settlement_meta(to_token, from_token)),
    }
}

/// Process-local cache of the most recently successful quote per
/// `(from, to)`, used to degrade gracefully on partial provider outages.
/// Single-writer (the fetch loop); a plain mutex-guarded map is sufficient.
pub struct LastKnownGood {
    entries: Mutex<HashMap<(String, String), EdgeQuote>>,
}

impl LastKnownGood {
    pub fn new() -> Self {
        LastKnownGood {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn update(&self, quote: EdgeQuote) {
        let key = (quote.from_token.clone(), quote.to_token.clone());
        self.entries.lock().unwrap().insert(key, quote);
    }

    pub fn get(&self, from_token: &str, to_token: &str) -> Option<EdgeQuote> {
        self.entries
            .lock()
            .unwrap()
            .get(&(from_token.to_string(), to_token.to_string()))
            .cloned()
    }

    pub fn all(&self) -> Vec<EdgeQuote> {
        self.entries.lock().unwrap().values().cloned().collect()
    }
}

impl Default for LastKnownGood {
    fn default() -> Self {
        Self::new()
    }
}
