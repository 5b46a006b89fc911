use std::sync::Arc;

use crate::clock::Clock;
use crate::model::quote::EdgeQuote;
use crate::store::KeyValueStore;

const OTC_PREFIX: &str = "otc:quotes";
const DEX_PREFIX: &str = "routing:edge:solana";

fn otc_key(from: &str, to: &str, venue_id: &str) -> String {
    format!("{OTC_PREFIX}:{from}:{to}:{venue_id}")
}

fn dex_key(from: &str, to: &str, venue_id: &str) -> String {
    format!("{DEX_PREFIX}:{from}:{to}:{venue_id}")
}

/// Picks the keyspace family for a quote based on its venue id, mirroring
/// the router's `is_dex_venue` convention.
fn key_for(quote: &EdgeQuote) -> String {
    if quote.is_dex_venue() {
        dex_key(&quote.from_token, &quote.to_token, &quote.venue_id)
    } else {
        otc_key(&quote.from_token, &quote.to_token, &quote.venue_id)
    }
}

/// Uniform key-value interface over cached per-edge quotes. Never returns
/// errors to callers - a parse failure on a single record is logged and the
/// record is dropped, not propagated.
pub struct EdgeCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl EdgeCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        EdgeCache { store, clock }
    }

    /// TTL is `max(1s, expiryTs - now)`, never zero or negative.
    fn ttl_ms(&self, expiry_ts: i64) -> i64 {
        (expiry_ts - self.clock.now_ms()).max(1_000)
    }

    pub async fn put_quote(&self, quote: &EdgeQuote) {
        let key = key_for(quote);
        let ttl = self.ttl_ms(quote.expiry_ts);
        match serde_json::to_string(quote) {
            Ok(json) => self.store.set(&key, &json, Some(ttl)).await,
            Err(err) => eprintln!("[cache] failed to serialize quote for {key}: {err}"),
        }
    }

    pub async fn put_quote_batch(&self, quotes: &[EdgeQuote]) {
        let mut entries = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let key = key_for(quote);
            let ttl = self.ttl_ms(quote.expiry_ts);
            match serde_json::to_string(quote) {
                Ok(json) => entries.push((key, json, Some(ttl))),
                Err(err) => eprintln!("[cache] failed to serialize quote for {key}: {err}"),
            }
        }
        if !entries.is_empty() {
            self.store.mset(entries).await;
        }
    }

    /// All keys under both families for the pair `(from, to)`.
    pub async fn scan_by_pair(&self, from: &str, to: &str) -> Vec<String> {
        let mut keys = self.store.scan_prefix(&format!("{OTC_PREFIX}:{from}:{to}:")).await;
        keys.extend(
            self.store
                .scan_prefix(&format!("{DEX_PREFIX}:{from}:{to}:"))
                .await,
        );
        keys
    }

    /// Parses and returns every live quote cached for `(from, to)`. Records
    /// that fail to parse are dropped with a warning.
    pub async fn get_cached_by_pair(&self, from: &str, to: &str) -> Vec<EdgeQuote> {
        let keys = self.scan_by_pair(from, to).await;
        if keys.is_empty() {
            return Vec::new();
        }
        let values = self.store.mget(&keys).await;
        let mut quotes = Vec::with_capacity(values.len());
        for (key, value) in keys.iter().zip(values.into_iter()) {
            let Some(raw) = value else { continue };
            match serde_json::from_str::<EdgeQuote>(&raw) {
                Ok(quote) => quotes.push(quote),
                Err(err) => eprintln!("[cache] dropping unparsable record at {key}: {err}"),
            }
        }
        quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::quote::VenueKind;
    use crate::store::MemoryStore;

    fn quote(venue_id: &str, from: &str, to: &str, expiry_ts: i64) -> EdgeQuote {
        EdgeQuote {
            venue_id: venue_id.into(),
            venue_kind: VenueKind::Otc,
            from_token: from.into(),
            to_token: to.into(),
            amount_in: 1000.0,
            amount_out: 920.0,
            max_amount_in: None,
            fee_bps: Some(30),
            expiry_ts,
            last_updated_ts: 0,
            deposit_address: None,
            settlement_meta: None,
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips_live_quotes() {
        let clock = Arc::new(FixedClock::new(0));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        let cache = EdgeCache::new(store, clock);

        cache.put_quote(&quote("otc:x", "USDC", "EUR", 30_000)).await;
        let found = cache.get_cached_by_pair("USDC", "EUR").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].venue_id, "otc:x");
    }

    #[tokio::test]
    async fn expired_quotes_are_absent() {
        let clock = Arc::new(FixedClock::new(0));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        let cache = EdgeCache::new(store, clock.clone());

        cache.put_quote(&quote("otc:x", "USDC", "EUR", 1_000)).await;
        clock.advance_ms(2_000);
        assert!(cache.get_cached_by_pair("USDC", "EUR").await.is_empty());
    }

    #[tokio::test]
    async fn dex_and_otc_venues_land_in_distinct_keyspaces() {
        let clock = Arc::new(FixedClock::new(0));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        let cache = EdgeCache::new(store.clone(), clock);

        cache
            .put_quote_batch(&[
                quote("otc:x", "USDC", "EUR", 30_000),
                quote("dex:raydium", "USDC", "EUR", 30_000),
            ])
            .await;
        let keys = cache.scan_by_pair("USDC", "EUR").await;
        assert!(keys.iter().any(|k| k.starts_with("otc:quotes:USDC:EUR:")));
        assert!(keys.iter().any(|k| k.starts_with("routing:edge:solana:USDC:EUR:")));
        assert_eq!(cache.get_cached_by_pair("USDC", "EUR").await.len(), 2);
    }
}
