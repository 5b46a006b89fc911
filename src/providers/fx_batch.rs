use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::fx::{build_edge, build_inverse_edge, FxRate, LastKnownGood};
use super::QuoteProvider;
use crate::clock::Clock;
use crate::config::FxPairConfig;
use crate::model::quote::EdgeQuote;
use std::sync::Arc;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct BatchRateEntry {
    from: String,
    to: String,
    #[serde(flatten)]
    rate: FxRate,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    rates: Vec<BatchRateEntry>,
}

/// Multi-pair-per-request batched HTTP FX feed: one request covers every
/// configured pair, so there is no intra-cycle rate-limit pause to respect.
pub struct FxBatchProvider {
    venue_id: String,
    base_url: String,
    api_key: Option<String>,
    pairs: Vec<FxPairConfig>,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    last_known_good: LastKnownGood,
}

impl FxBatchProvider {
    pub fn new(
        venue_id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        pairs: Vec<FxPairConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        FxBatchProvider {
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

    async fn fetch_all(&self) -> anyhow::Result<BatchResponse> {
        let pairs_query: Vec<String> = self
            .pairs
            .iter()
            .map(|p| format!("{}-{}", p.from_token, p.to_token))
            .collect();
        let mut req = self
            .client
            .get(format!("{}/rates", self.base_url))
            .query(&[("pairs", pairs_query.join(","))]);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json::<BatchResponse>().await?)
    }
}

#[async_trait]
impl QuoteProvider for FxBatchProvider {
    fn venue_id(&self) -> &str {
        &self.venue_id
    }

    fn is_fast(&self) -> bool {
        false
    }

    async fn fetch_quotes(&self) -> Vec<EdgeQuote> {
        let now = self.clock.now_ms();
        match self.fetch_all().await {
            Ok(batch) => {
                let mut fresh = Vec::with_capacity(batch.rates.len() * 2);
                for entry in batch.rates {
                    let forward = build_edge(&self.venue_id, &entry.from, &entry.to, entry.rate, now);
                    let inverse = build_inverse_edge(&self.venue_id, &entry.from, &entry.to, entry.rate, now);
                    self.last_known_good.update(forward.clone());
                    self.last_known_good.update(inverse.clone());
                    fresh.push(forward);
                    fresh.push(inverse);
                }
                fresh
            }
            Err(err) => {
                let cached = self.last_known_good.all();
                if cached.is_empty() {
                    eprintln!("[provider:{}] batch fetch failed with no cache: {err}", self.venue_id);
                } else {
                    println!(
                        "[provider:{}] batch fetch failed ({err}), falling back to {} cached quotes",
                        self.venue_id,
                        cached.len()
                    );
                }
                cached
            }
        }
    }
}
