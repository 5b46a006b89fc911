use std::sync::Arc;

use futures::future::join_all;

use crate::cache::EdgeCache;
use crate::clock::Clock;
use crate::model::quote::EdgeQuote;
use crate::model::route::{Route, RouteStep};

/// The default intermediate tokens tried when a caller supplies none. The
/// 3-hop search only ever pairs the first two of these as its mid tokens
/// (§4.4), so the canonical DEX-middle route (USDC -> EURC) needs both
/// ahead of USDT here.
const DEFAULT_INTERMEDIATES: [&str; 3] = ["USDC", "EURC", "USDT"];

pub struct RouteResult {
    pub route: Option<Route>,
    /// The best runner-up route found during the same enumeration, by
    /// `totalOut` - carried through the pipeline as `ExecutionRecord`'s
    /// `fallbackRoute` (§3) for the driver's single retry attempt (§4.6.f).
    pub fallback_route: Option<Route>,
    pub considered_quotes: usize,
}

/// Resolves `(amount, from, to, intermediates?)` into the best reachable
/// route of 1-3 hops over the current edge cache. Stateless between calls:
/// every invocation tracks its own best candidate, never a shared field.
pub struct Router {
    cache: Arc<EdgeCache>,
    clock: Arc<dyn Clock>,
}

impl Router {
    pub fn new(cache: Arc<EdgeCache>, clock: Arc<dyn Clock>) -> Self {
        Router { cache, clock }
    }

    fn candidate_intermediates(intermediates: &[String]) -> Vec<String> {
        if intermediates.is_empty() {
            DEFAULT_INTERMEDIATES.iter().map(|s| s.to_string()).collect()
        } else {
            intermediates.to_vec()
        }
    }

    /// The single best live quote for `(from, to)` given `amount_in` entering
    /// the leg, per the §4.4 per-leg filter and output computation. Returns
    /// the constructed step alongside how many candidate quotes were
    /// examined, so callers can accumulate `consideredQuotes`.
    async fn best_leg(
        &self,
        from: &str,
        to: &str,
        amount_in: f64,
        min_expiry_ms: i64,
    ) -> (Option<(RouteStep, EdgeQuote)>, usize) {
        let now = self.clock.now_ms();
        let quotes = self.cache.get_cached_by_pair(from, to).await;
        let considered = quotes.len();

        let mut best: Option<(RouteStep, EdgeQuote)> = None;
        for quote in quotes {
            if !quote.is_live(now, min_expiry_ms) {
                continue;
            }
            if let Some(max_in) = quote.max_amount_in {
                if amount_in > max_in {
                    continue;
                }
            }
            let Some(amount_out) = quote.compute_output(amount_in) else {
                continue;
            };
            if amount_out <= 0.0 {
                continue;
            }
            let is_better = best
                .as_ref()
                .map(|(step, _)| amount_out > step.amount_out)
                .unwrap_or(true);
            if is_better {
                let (chain_id, duration_ms) = if quote.is_dex_venue() {
                    (101, 30_000)
                } else {
                    (0, 0)
                };
                let step = RouteStep {
                    from_token: from.to_string(),
                    to_token: to.to_string(),
                    venue_id: quote.venue_id.clone(),
                    chain_id,
                    amount_in,
                    amount_out,
                    fee_bps: quote.fee_bps,
                    estimated_duration_ms: duration_ms,
                };
                best = Some((step, quote));
            }
        }
        (best, considered)
    }

    /// Resolves the best route, discarding the backing quotes. Most callers
    /// (e.g. `/routing/quotes` inspection) only need the route itself.
    pub async fn get_best_route(
        &self,
        amount_in: f64,
        from_token: &str,
        to_token: &str,
        intermediates: &[String],
        min_expiry_ms: Option<i64>,
    ) -> RouteResult {
        self.get_best_route_with_legs(amount_in, from_token, to_token, intermediates, min_expiry_ms)
            .await
            .0
    }

    /// Like `get_best_route`, but also returns the OTC/FX quotes backing
    /// each step of the winning route, for the settlement scorer to apply
    /// its time/counterparty discount against.
    pub async fn get_best_route_with_legs(
        &self,
        amount_in: f64,
        from_token: &str,
        to_token: &str,
        intermediates: &[String],
        min_expiry_ms: Option<i64>,
    ) -> (RouteResult, Vec<EdgeQuote>) {
        match self
            .enumerate(amount_in, from_token, to_token, intermediates, min_expiry_ms)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                eprintln!("[router] enumeration failed for {from_token}->{to_token}: {err}");
                (RouteResult { route: None, fallback_route: None, considered_quotes: 0 }, Vec::new())
            }
        }
    }

    async fn enumerate(
        &self,
        amount_in: f64,
        from_token: &str,
        to_token: &str,
        intermediates: &[String],
        min_expiry_ms: Option<i64>,
    ) -> anyhow::Result<(RouteResult, Vec<EdgeQuote>)> {
        let min_expiry_ms = min_expiry_ms.unwrap_or(0);
        let candidates = Self::candidate_intermediates(intermediates);
        let now = self.clock.now_ms();

        let mut considered_quotes = 0usize;
        let mut best_route: Option<Route> = None;
        let mut best_legs: Vec<EdgeQuote> = Vec::new();
        let mut fallback_route: Option<Route> = None;

        let mut consider = |considered: usize, route: Option<Route>, legs: Vec<EdgeQuote>| {
            considered_quotes += considered;
            if let Some(route) = route {
                let better = best_route
                    .as_ref()
                    .map(|b| route.total_out > b.total_out)
                    .unwrap_or(true);
                if better {
                    if let Some(prev_best) = best_route.take() {
                        fallback_route = Some(prev_best);
                    }
                    best_route = Some(route);
                    best_legs = legs;
                } else {
                    let better_fallback = fallback_route
                        .as_ref()
                        .map(|f| route.total_out > f.total_out)
                        .unwrap_or(true);
                    if better_fallback {
                        fallback_route = Some(route);
                    }
                }
            }
        };

        // 1-hop
        let (direct, direct_considered) =
            self.best_leg(from_token, to_token, amount_in, min_expiry_ms).await;
        match direct {
            Some((step, quote)) => {
                consider(direct_considered, Route::from_steps(vec![step], 1.0, now), vec![quote]);
            }
            None => consider(direct_considered, None, Vec::new()),
        }

        // 2-hop: for each eligible intermediate, load both legs concurrently.
        let two_hop_mids: Vec<&String> = candidates
            .iter()
            .filter(|mid| mid.as_str() != from_token && mid.as_str() != to_token)
            .collect();

        let two_hop_futures = two_hop_mids.into_iter().map(|mid| {
            let mid = mid.clone();
            async move {
                let (leg1, c1) = self.best_leg(from_token, &mid, amount_in, min_expiry_ms).await;
                let Some((step1, quote1)) = leg1 else {
                    return (c1 + 0, None, Vec::new());
                };
                let (leg2, c2) = self.best_leg(&mid, to_token, step1.amount_out, min_expiry_ms).await;
                let Some((step2, quote2)) = leg2 else {
                    return (c1 + c2, None, Vec::new());
                };
                let route = Route::from_steps(vec![step1, step2], 1.0, now);
                (c1 + c2, route, vec![quote1, quote2])
            }
        });
        for (considered, route, legs) in join_all(two_hop_futures).await {
            consider(considered, route, legs);
        }

        // 3-hop: ordered pairs of distinct intermediates drawn from the
        // first two elements of the candidate set, bounding the search.
        if candidates.len() >= 2 {
            let pair_mids = [
                (candidates[0].clone(), candidates[1].clone()),
                (candidates[1].clone(), candidates[0].clone()),
            ];
            let three_hop_futures = pair_mids.into_iter().filter(|(mid1, mid2)| {
                mid1 != mid2
                    && mid1.as_str() != from_token
                    && mid1.as_str() != to_token
                    && mid2.as_str() != from_token
                    && mid2.as_str() != to_token
            }).map(|(mid1, mid2)| async move {
                let (leg1, c1) = self.best_leg(from_token, &mid1, amount_in, min_expiry_ms).await;
                let Some((step1, quote1)) = leg1 else {
                    return (c1, None, Vec::new());
                };
                let (leg2, c2) = self.best_leg(&mid1, &mid2, step1.amount_out, min_expiry_ms).await;
                let Some((step2, quote2)) = leg2 else {
                    return (c1 + c2, None, Vec::new());
                };
                let (leg3, c3) = self.best_leg(&mid2, to_token, step2.amount_out, min_expiry_ms).await;
                let Some((step3, quote3)) = leg3 else {
                    return (c1 + c2 + c3, None, Vec::new());
                };
                let route = Route::from_steps(vec![step1, step2, step3], 1.0, now);
                (c1 + c2 + c3, route, vec![quote1, quote2, quote3])
            });
            for (considered, route, legs) in join_all(three_hop_futures).await {
                consider(considered, route, legs);
            }
        }

        let route = best_route.map(|mut r| {
            r.timestamp = now;
            r
        });
        Ok((RouteResult { route, fallback_route, considered_quotes }, best_legs))
    }
}

/// Filters the quotes backing a route's steps down to the subset carrying
/// settlement metadata (DEX legs settle atomically and carry none).
pub fn settling_legs(legs: &[EdgeQuote]) -> Vec<&EdgeQuote> {
    legs.iter().filter(|q| q.settlement_meta.is_some()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::quote::VenueKind;
    use crate::store::MemoryStore;

    fn quote(venue_id: &str, from: &str, to: &str, amount_in: f64, amount_out: f64, fee_bps: Option<u32>) -> EdgeQuote {
        EdgeQuote {
            venue_id: venue_id.into(),
            venue_kind: if venue_id.starts_with("dex:") { VenueKind::Dex } else { VenueKind::Otc },
            from_token: from.into(),
            to_token: to.into(),
            amount_in,
            amount_out,
            max_amount_in: None,
            fee_bps,
            expiry_ts: 60_000,
            last_updated_ts: 0,
            deposit_address: None,
            settlement_meta: None,
        }
    }

    async fn router_with(quotes: Vec<EdgeQuote>) -> Router {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(0));
        let store: Arc<dyn crate::store::KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        let cache = Arc::new(EdgeCache::new(store, clock.clone()));
        cache.put_quote_batch(&quotes).await;
        Router::new(cache, clock)
    }

    #[tokio::test]
    async fn s1_direct_otc_route() {
        let router = router_with(vec![quote("otc:x", "USDC", "EUR", 1000.0, 920.0, Some(30))]).await;
        let result = router.get_best_route(1000.0, "USDC", "EUR", &[], Some(5000)).await;
        let route = result.route.unwrap();
        assert_eq!(route.steps.len(), 1);
        assert!((route.total_out - 917.24).abs() < 1e-6);
    }

    #[tokio::test]
    async fn s2_two_hop_via_stablecoin() {
        let router = router_with(vec![
            quote("otc:1", "BRL", "USDC", 10_000.0, 2000.0, Some(40)),
            quote("otc:2", "USDC", "EUR", 2000.0, 1840.0, Some(30)),
        ])
        .await;
        let result = router.get_best_route(10_000.0, "BRL", "EUR", &[], Some(0)).await;
        let route = result.route.unwrap();
        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.total_fees_bps, 70);
        assert!((route.total_out - 1826.65).abs() < 0.5);
    }

    #[tokio::test]
    async fn s3_three_hop_with_dex_middle_tags_chain_id() {
        let router = router_with(vec![
            quote("otc:a", "BRL", "USDC", 10_000.0, 2000.0, Some(10)),
            quote("dex:raydium", "USDC", "EURC", 2000.0, 1996.0, Some(20)),
            quote("otc:b", "EURC", "EUR", 1996.0, 1990.0, Some(20)),
        ])
        .await;
        let result = router.get_best_route(10_000.0, "BRL", "EUR", &[], Some(0)).await;
        let route = result.route.unwrap();
        assert_eq!(route.steps.len(), 3);
        assert_eq!(route.steps[1].chain_id, 101);
        assert_eq!(route.steps[1].estimated_duration_ms, 30_000);
    }

    #[tokio::test]
    async fn unknown_pair_returns_null_route() {
        let router = router_with(vec![]).await;
        let result = router.get_best_route(100.0, "ZZZ", "YYY", &[], None).await;
        assert!(result.route.is_none());
        assert_eq!(result.considered_quotes, 0);
    }

    #[tokio::test]
    async fn max_amount_in_excludes_oversized_request() {
        let mut q = quote("otc:x", "USDC", "EUR", 1000.0, 920.0, Some(30));
        q.max_amount_in = Some(500.0);
        let router = router_with(vec![q]).await;
        let result = router.get_best_route(1000.0, "USDC", "EUR", &[], None).await;
        assert!(result.route.is_none());
    }
}
