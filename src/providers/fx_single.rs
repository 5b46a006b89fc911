use std::time::Duration;

use async_trait::async_trait;

use super::fx::{build_edge, build_inverse_edge, FxRate, LastKnownGood};
use super::QuoteProvider;
use crate::clock::Clock;
use crate::config::FxPairConfig;
use crate::model::quote::EdgeQuote;
use std::sync::Arc;

const RATE_LIMIT_PAUSE: Duration = Duration::from_millis(1_200);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-pair-per-request HTTP FX feed with strict rate limiting: a
/// ≥1.2s pause between consecutive pair fetches within one cycle.
pub struct FxSingleProvider {
    venue_id: String,
    base_url: String,
    api_key: Option<String>,
    pairs: Vec<FxPairConfig>,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    last_known_good: LastKnownGood,
}

impl FxSingleProvider {
    pub fn new(
        venue_id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        pairs: Vec<FxPairConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        FxSingleProvider {
            venue_id: venue_id.into(),
            base_url: base_url.into(),
            api_key,
            pairs,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client builds with static config"),
            clock,
            last_known_good: LastKnownGood::new(),
        }
    }

    async fn fetch_pair(&self, pair: &FxPairConfig) -> anyhow::Result<FxRate> {
        let mut req = self.client.get(format!(
            "{}/rate?from={}&to={}",
            self.base_url, pair.from_token, pair.to_token
        ));
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json::<FxRate>().await?)
    }
}

#[async_trait]
impl QuoteProvider for FxSingleProvider {
    fn venue_id(&self) -> &str {
        &self.venue_id
    }

    fn is_fast(&self) -> bool {
        false
    }

    async fn fetch_quotes(&self) -> Vec<EdgeQuote> {
        let mut fresh = Vec::new();
        let mut any_success = false;

        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(RATE_LIMIT_PAUSE).await;
            }
            let now = self.clock.now_ms();
            match self.fetch_pair(pair).await {
                Ok(rate) => {
                    any_success = true;
                    let forward = build_edge(&self.venue_id, &pair.from_token, &pair.to_token, rate, now);
                    let inverse =
                        build_inverse_edge(&self.venue_id, &pair.from_token, &pair.to_token, rate, now);
                    self.last_known_good.update(forward.clone());
                    self.last_known_good.update(inverse.clone());
                    fresh.push(forward);
                    fresh.push(inverse);
                }
                Err(err) => {
                    eprintln!(
                        "[provider:{}] pair {}->{} failed: {err}",
                        self.venue_id, pair.from_token, pair.to_token
                    );
                    if let Some(cached) = self.last_known_good.get(&pair.from_token, &pair.to_token) {
                        fresh.push(cached);
                    }
                    if let Some(cached) = self.last_known_good.get(&pair.to_token, &pair.from_token) {
                        fresh.push(cached);
                    }
                }
            }
        }

        if !any_success && fresh.is_empty() {
            let cached = self.last_known_good.all();
            if !cached.is_empty() {
                println!(
                    "[provider:{}] total fetch failure this cycle, falling back to {} cached quotes",
                    self.venue_id,
                    cached.len()
                );
            }
            return cached;
        }

        fresh
    }
}
