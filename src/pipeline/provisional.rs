use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Result, RoutingError};
use crate::model::provisional::{ProvisionalQuote, QuoteType, ScoringMeta, PROVISIONAL_TTL_MS};
use crate::model::route::Route;
use crate::store::KeyValueStore;

fn prov_key(quote_id: &str) -> String {
    format!("quote:prov:{quote_id}")
}

/// Writes a scored route as an addressable provisional quote with a 15s
/// TTL. `route` is `None` for a request that found no viable path - an
/// absent route is still a valid (empty) quote record, not an error.
#[allow(clippy::too_many_arguments)]
pub async fn store_provisional(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    route: Option<Route>,
    fallback_route: Option<Route>,
    amount_in: f64,
    amount_out: f64,
    net_amount_out: f64,
    fee_bps: Option<u32>,
    scoring_meta: ScoringMeta,
    quote_type: QuoteType,
) -> ProvisionalQuote {
    let now = clock.now_ms();
    let quote = ProvisionalQuote {
        quote_id: Uuid::new_v4().to_string(),
        route,
        fallback_route,
        amount_in,
        amount_out,
        net_amount_out,
        fee_bps,
        expiry_ts: now + PROVISIONAL_TTL_MS,
        created_ts: now,
        quote_type,
        scoring_meta,
    };
    let key = prov_key(&quote.quote_id);
    let json = serde_json::to_string(&quote).expect("ProvisionalQuote always serializes");
    store.set(&key, &json, Some(PROVISIONAL_TTL_MS)).await;
    quote
}

/// Reads a provisional quote by id. An expired record is treated as
/// absent, per the cache-expiry contract.
pub async fn get_provisional(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    quote_id: &str,
) -> Result<ProvisionalQuote> {
    let key = prov_key(quote_id);
    let raw = store
        .get(&key)
        .await
        .ok_or_else(|| RoutingError::not_found(format!("no provisional quote {quote_id}")))?;
    let quote: ProvisionalQuote = serde_json::from_str(&raw)
        .map_err(|e| RoutingError::Internal(format!("corrupt provisional record {quote_id}: {e}")))?;
    if !quote.is_live(clock.now_ms()) {
        return Err(RoutingError::Expired(format!("provisional quote {quote_id} expired")));
    }
    Ok(quote)
}

pub async fn delete_provisional(store: &dyn KeyValueStore, quote_id: &str) {
    store.del(&prov_key(quote_id)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;

    fn scoring_meta() -> ScoringMeta {
        ScoringMeta { settlement_days: 0.1, counterparty_risk: 0.001, time_penalty: 1.0, confidence: 0.9 }
    }

    #[tokio::test]
    async fn round_trips_while_live_then_expires() {
        let clock = Arc::new(FixedClock::new(0));
        let store = MemoryStore::new(clock.clone());
        let quote = store_provisional(&store, clock.as_ref(), None, None, 1000.0, 920.0, 900.0, Some(30), scoring_meta(), QuoteType::Otc).await;

        let found = get_provisional(&store, clock.as_ref(), &quote.quote_id).await.unwrap();
        assert_eq!(found.quote_id, quote.quote_id);

        clock.advance_ms(PROVISIONAL_TTL_MS + 1);
        let err = get_provisional(&store, clock.as_ref(), &quote.quote_id).await.unwrap_err();
        assert!(matches!(err, RoutingError::Expired(_)));
    }
}
