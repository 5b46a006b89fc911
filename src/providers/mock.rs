use async_trait::async_trait;

use super::QuoteProvider;
use crate::clock::Clock;
use crate::model::quote::{EdgeQuote, SettlementMeta, VenueKind};
use std::sync::Arc;

/// A single hand-curated quote to seed the mock provider with. The
/// provider stamps `expiryTs`/`lastUpdatedTs` fresh on every fetch rather
/// than baking them into the fixture, so the fixture reads as a rate, not a
/// point-in-time snapshot.
#[derive(Debug, Clone)]
pub struct MockEdge {
    pub venue_id: String,
    pub venue_kind: VenueKind,
    pub from_token: String,
    pub to_token: String,
    pub amount_in: f64,
    pub amount_out: f64,
    pub max_amount_in: Option<f64>,
    pub fee_bps: Option<u32>,
    pub settlement_meta: Option<SettlementMeta>,
}

/// Returns a fixed catalog of quotes with a fresh TTL on every call. OTC
/// shape gets `expiryTs = now + 30s`; DEX shape gets `now + 5s`.
pub struct MockProvider {
    venue_id: String,
    edges: Vec<MockEdge>,
    clock: Arc<dyn Clock>,
}

impl MockProvider {
    pub fn new(venue_id: impl Into<String>, edges: Vec<MockEdge>, clock: Arc<dyn Clock>) -> Self {
        MockProvider {
            venue_id: venue_id.into(),
            edges,
            clock,
        }
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    fn venue_id(&self) -> &str {
        &self.venue_id
    }

    fn is_fast(&self) -> bool {
        true
    }

    async fn fetch_quotes(&self) -> Vec<EdgeQuote> {
        let now = self.clock.now_ms();
        self.edges
            .iter()
            .map(|edge| {
                let ttl_ms = if edge.venue_id.starts_with("dex:") {
                    5_000
                } else {
                    30_000
                };
                EdgeQuote {
                    venue_id: edge.venue_id.clone(),
                    venue_kind: edge.venue_kind,
                    from_token: edge.from_token.clone(),
                    to_token: edge.to_token.clone(),
                    amount_in: edge.amount_in,
                    amount_out: edge.amount_out,
                    max_amount_in: edge.max_amount_in,
                    fee_bps: edge.fee_bps,
                    expiry_ts: now + ttl_ms,
                    last_updated_ts: now,
                    deposit_address: None,
                    settlement_meta: edge.settlement_meta.clone(),
                }
            })
            .collect()
    }
}
