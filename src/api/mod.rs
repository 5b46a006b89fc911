pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router as AxumRouter;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::EdgeCache;
use crate::clock::{Clock, SystemClock};
use crate::config::RoutingConfig;
use crate::executor::SimulatedExecutor;
use crate::prefetch::PrefetchOrchestrator;
use crate::providers::dex::{DexPool, DexProvider};
use crate::providers::fx_batch::FxBatchProvider;
use crate::providers::fx_single::FxSingleProvider;
use crate::providers::mock::{MockEdge, MockProvider};
use crate::providers::QuoteProvider;
use crate::router::Router as EdgeRouter;
use crate::store::MemoryStore;
use state::AppState;

/// The fast-tier static/mock catalog plus a DEX pool feed, alongside the
/// slow-tier single-pair HTTP FX provider configured from `config.fx_pairs`.
/// A real deployment would swap `MockProvider`'s fixture for a live OTC
/// desk feed; everything downstream is agnostic to where quotes come from.
fn build_provider_fleet(config: &RoutingConfig, clock: Arc<dyn Clock>) -> Vec<Arc<dyn QuoteProvider>> {
    let mock = MockProvider::new(
        "otc:crossflow-desk",
        vec![
            MockEdge {
                venue_id: "otc:crossflow-desk".into(),
                venue_kind: crate::model::quote::VenueKind::Otc,
                from_token: "BRL".into(),
                to_token: "USDC".into(),
                amount_in: 10_000.0,
                amount_out: 2_000.0,
                max_amount_in: Some(500_000.0),
                fee_bps: Some(40),
                settlement_meta: Some(crate::scoring::default_settlement_meta("BRL", "USDC")),
            },
            MockEdge {
                venue_id: "otc:crossflow-desk".into(),
                venue_kind: crate::model::quote::VenueKind::Otc,
                from_token: "USDC".into(),
                to_token: "EUR".into(),
                amount_in: 1_000.0,
                amount_out: 920.0,
                max_amount_in: Some(500_000.0),
                fee_bps: Some(30),
                settlement_meta: Some(crate::scoring::default_settlement_meta("USDC", "EUR")),
            },
        ],
        clock.clone(),
    );

    let dex = DexProvider::new(
        "dex:raydium",
        vec![DexPool {
            pool_id: "raydium-usdc-eurc".into(),
            from_token: "USDC".into(),
            to_token: "EURC".into(),
            amount_in: 1_000.0,
            amount_out: 998.0,
            fee_bps: Some(20),
        }],
        clock.clone(),
    );

    // The primary feed is the rate-limited single-pair provider, which
    // gives per-pair last-known-good fallback (see §8 S6); the batched feed
    // is a second independent source under the same venue family, giving
    // the cache a redundant write if the single-pair feed degrades.
    let fx_single = FxSingleProvider::new(
        "fx:single",
        config.fx_endpoint_base_url.clone(),
        config.fx_api_key.clone(),
        config.fx_pairs.clone(),
        clock.clone(),
    );
    let fx_batch = FxBatchProvider::new(
        "fx:batch",
        config.fx_endpoint_base_url.clone(),
        config.fx_api_key.clone(),
        config.fx_pairs.clone(),
        clock,
    );

    vec![Arc::new(mock), Arc::new(dex), Arc::new(fx_single), Arc::new(fx_batch)]
}

pub async fn build_state(config: RoutingConfig) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let cache = Arc::new(EdgeCache::new(store.clone(), clock.clone()));
    let router = Arc::new(EdgeRouter::new(cache.clone(), clock.clone()));
    let executor = Arc::new(SimulatedExecutor::new());
    let config = Arc::new(config);

    let providers = build_provider_fleet(&config, clock.clone());
    let prefetch = Arc::new(PrefetchOrchestrator::new(
        cache.clone(),
        providers,
        clock.clone(),
        std::time::Duration::from_millis(config.fast_prefetch_period_ms),
        std::time::Duration::from_millis(config.slow_prefetch_period_ms),
    ));
    prefetch.clone().spawn().await;

    AppState::new(store, cache, router, clock, config, executor, prefetch)
}

pub async fn serve(host: &str, port: u16, config: RoutingConfig) -> Result<()> {
    let state = build_state(config).await;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = AxumRouter::new()
        .route("/routing/quote/v2", post(handlers::quote::post_quote))
        .route("/routing/execute/v2", post(handlers::execute::post_execute))
        .route("/routing/webhooks/deposit", post(handlers::webhook::post_deposit_webhook))
        .route("/routing/status", get(handlers::status::get_status))
        .route("/routing/quotes", get(handlers::quotes::get_quotes))
        .route("/routing/health", get(handlers::health::get_health))
        .layer(cors)
        .with_state(state);

    let addr = format!("{host}:{port}");
    println!("crossflow-router listening on {addr}");
    println!("  Health: GET  http://{addr}/routing/health");
    println!("  Quote:  POST http://{addr}/routing/quote/v2");
    println!("  Status: GET  http://{addr}/routing/status?executionId=...");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown_tx = std::sync::Mutex::new(Some(shutdown_tx));
    ctrlc::set_handler(move || {
        if let Some(tx) = shutdown_tx.lock().unwrap().take() {
            let _ = tx.send(());
        }
    })
    .context("installing ctrl-c handler")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
            println!("crossflow-router shutting down");
        })
        .await
        .context("running server")?;

    Ok(())
}
