pub mod dex;
pub mod fx;
pub mod fx_batch;
pub mod fx_single;
pub mod mock;

use async_trait::async_trait;

use crate::model::quote::EdgeQuote;

/// A pull-mode adapter that produces a fresh snapshot of the quotes it
/// knows about. Providers are stateless between calls except for an
/// optional in-process last-known-good cache (see `fx_single`/`fx_batch`).
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn venue_id(&self) -> &str;

    /// `true` for providers invoked on the orchestrator's fast tier
    /// (static/mock, DEX); `false` for rate-limited HTTP FX feeds.
    fn is_fast(&self) -> bool;

    async fn fetch_quotes(&self) -> Vec<EdgeQuote>;
}
