use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use futures::future::join_all;
use tokio::time::{Duration, interval};

use crate::cache::EdgeCache;
use crate::clock::Clock;
use crate::providers::QuoteProvider;

/// Drives two independent cadences over a configured provider list: a fast
/// tier (static/mock, DEX) and a slow tier (rate-limited HTTP FX feeds).
/// Each tier runs as its own background task, started alongside the HTTP
/// listener and outliving individual requests.
pub struct PrefetchOrchestrator {
    cache: Arc<EdgeCache>,
    providers: Vec<Arc<dyn QuoteProvider>>,
    clock: Arc<dyn Clock>,
    fast_period: Duration,
    slow_period: Duration,
    last_fast_tick_ms: Arc<AtomicI64>,
    last_slow_tick_ms: Arc<AtomicI64>,
}

impl PrefetchOrchestrator {
    pub fn new(
        cache: Arc<EdgeCache>,
        providers: Vec<Arc<dyn QuoteProvider>>,
        clock: Arc<dyn Clock>,
        fast_period: Duration,
        slow_period: Duration,
    ) -> Self {
        PrefetchOrchestrator {
            cache,
            providers,
            clock,
            fast_period,
            slow_period,
            last_fast_tick_ms: Arc::new(AtomicI64::new(0)),
            last_slow_tick_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn last_fast_tick_ms(&self) -> i64 {
        self.last_fast_tick_ms.load(Ordering::Relaxed)
    }

    pub fn last_slow_tick_ms(&self) -> i64 {
        self.last_slow_tick_ms.load(Ordering::Relaxed)
    }

    fn tier(&self, fast: bool) -> Vec<Arc<dyn QuoteProvider>> {
        self.providers
            .iter()
            .filter(|p| p.is_fast() == fast)
            .cloned()
            .collect()
    }

    /// Invokes every provider in `tier` concurrently and writes the union of
    /// their returned quotes into the cache. A provider failure is isolated
    /// to that provider's empty/partial result; it never cancels siblings.
    async fn run_tick(cache: &EdgeCache, tier: &[Arc<dyn QuoteProvider>], tag: &str) {
        let started = std::time::Instant::now();
        let results = join_all(tier.iter().map(|p| {
            let p = p.clone();
            async move {
                let quotes = p.fetch_quotes().await;
                (p.venue_id().to_string(), quotes)
            }
        }))
        .await;

        let mut total_quotes = 0usize;
        for (venue_id, quotes) in &results {
            total_quotes += quotes.len();
            if quotes.is_empty() {
                println!("[prefetch:{tag}] {venue_id} returned 0 quotes this tick");
            }
        }

        let all_quotes: Vec<_> = results.into_iter().flat_map(|(_, q)| q).collect();
        cache.put_quote_batch(&all_quotes).await;

        println!(
            "[prefetch:{tag}] {} providers, {total_quotes} quotes, {:?}",
            tier.len(),
            started.elapsed()
        );
    }

    /// Spawns both tiers as independent background tasks and performs an
    /// eager warm-up fetch on each before returning, so the cache is warm
    /// before the first router request.
    pub async fn spawn(self: Arc<Self>) {
        let fast_tier = self.tier(true);
        let slow_tier = self.tier(false);

        Self::run_tick(&self.cache, &fast_tier, "fast").await;
        self.last_fast_tick_ms.store(self.clock.now_ms(), Ordering::Relaxed);
        Self::run_tick(&self.cache, &slow_tier, "slow").await;
        self.last_slow_tick_ms.store(self.clock.now_ms(), Ordering::Relaxed);

        let fast_self = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(fast_self.fast_period);
            ticker.tick().await; // consume the immediate first tick; warm-up above already ran it
            loop {
                ticker.tick().await;
                let tier = fast_self.tier(true);
                Self::run_tick(&fast_self.cache, &tier, "fast").await;
                fast_self
                    .last_fast_tick_ms
                    .store(fast_self.clock.now_ms(), Ordering::Relaxed);
            }
        });

        let slow_self = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(slow_self.slow_period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let tier = slow_self.tier(false);
                Self::run_tick(&slow_self.cache, &tier, "slow").await;
                slow_self
                    .last_slow_tick_ms
                    .store(slow_self.clock.now_ms(), Ordering::Relaxed);
            }
        });
    }
}
