use async_trait::async_trait;

use super::QuoteProvider;
use crate::clock::Clock;
use crate::model::quote::{EdgeQuote, VenueKind};
use std::sync::Arc;

/// One on-chain pool quoted by a `DexProvider`.
#[derive(Debug, Clone)]
pub struct DexPool {
    pub pool_id: String,
    pub from_token: String,
    pub to_token: String,
    pub amount_in: f64,
    pub amount_out: f64,
    pub fee_bps: Option<u32>,
}

/// DEX-shaped feed: on-chain stablecoin swap quotes with a short 5s TTL,
/// invoked on the fast tier alongside the static/mock provider. The
/// `dex:` venue prefix is what the router and cache use to route these
/// quotes to the `routing:edge:solana:*` keyspace and to stamp
/// `chainId = 101`.
pub struct DexProvider {
    venue_id: String,
    pools: Vec<DexPool>,
    clock: Arc<dyn Clock>,
}

impl DexProvider {
    pub fn new(venue_id: impl Into<String>, pools: Vec<DexPool>, clock: Arc<dyn Clock>) -> Self {
        let venue_id = venue_id.into();
        assert!(
            venue_id.starts_with("dex:"),
            "DexProvider venue_id must use the dex: prefix, got {venue_id}"
        );
        DexProvider { venue_id, pools, clock }
    }
}

#[async_trait]
impl QuoteProvider for DexProvider {
    fn venue_id(&self) -> &str {
        &self.venue_id
    }

    fn is_fast(&self) -> bool {
        true
    }

    async fn fetch_quotes(&self) -> Vec<EdgeQuote> {
        let now = self.clock.now_ms();
        self.pools
            .iter()
            .map(|pool| EdgeQuote {
                venue_id: format!("dex:{}", pool.pool_id),
                venue_kind: VenueKind::Dex,
                from_token: pool.from_token.clone(),
                to_token: pool.to_token.clone(),
                amount_in: pool.amount_in,
                amount_out: pool.amount_out,
                max_amount_in: None,
                fee_bps: pool.fee_bps,
                expiry_ts: now + 5_000,
                last_updated_ts: now,
                deposit_address: None,
                settlement_meta: None,
            })
            .collect()
    }
}
