//! End-to-end HTTP flow tests, exercising the full axum stack over a real
//! TCP listener bound to an ephemeral port (no mocked `tower::Service`
//! plumbing - this mirrors what a client actually sees).

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router as AxumRouter;
use crossflow_router::api::handlers;
use crossflow_router::api::state::AppState;
use crossflow_router::config::RoutingConfig;
use serde_json::{json, Value};

/// Builds the same route table as `api::serve`, minus the CORS layer and
/// ctrl-c wiring that only matter to a standalone process.
fn build_app(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/routing/quote/v2", post(handlers::quote::post_quote))
        .route("/routing/execute/v2", post(handlers::execute::post_execute))
        .route("/routing/webhooks/deposit", post(handlers::webhook::post_deposit_webhook))
        .route("/routing/status", get(handlers::status::get_status))
        .route("/routing/quotes", get(handlers::quotes::get_quotes))
        .route("/routing/health", get(handlers::health::get_health))
        .with_state(state)
}

/// Spins up the full service (in-memory store, live prefetch loops) bound
/// to `127.0.0.1:0` and returns its base URL. The prefetch loops hit
/// `fx.example.internal`, which never resolves in a sandboxed test
/// environment - that's fine, a failed provider fetch degrades to an empty
/// tick rather than panicking (see `PrefetchOrchestrator::run_tick`).
async fn spawn_server() -> String {
    let config = RoutingConfig {
        fast_prefetch_period_ms: 3_600_000,
        slow_prefetch_period_ms: 3_600_000,
        ..RoutingConfig::default()
    };
    let state = crossflow_router::api::build_state(config).await;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn health_reports_ok_and_prefetch_ticks() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/routing/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["nowMs"].as_i64().unwrap() > 0);
    // The orchestrator runs its warm-up tick synchronously before `serve`
    // returns, so both tiers have already ticked once by the time the
    // listener accepts its first request.
    assert!(body["lastFastPrefetchTickMs"].as_i64().unwrap() > 0);
    assert!(body["lastSlowPrefetchTickMs"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn quote_rejects_malformed_request() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/routing/quote/v2"))
        .json(&json!({ "amountIn": -5.0, "fromToken": "BRL", "toToken": "USDC" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn quote_with_no_route_returns_empty_array_not_an_error() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/routing/quote/v2"))
        .json(&json!({ "amountIn": 100.0, "fromToken": "ZZZ", "toToken": "YYY" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["quotes"].as_array().unwrap().len(), 0);
}

/// The full S4 scenario from the spec: quote -> execute (reservation +
/// deposit instructions) -> confirm deposit via webhook -> poll status
/// until the simulated executor finishes the route's two OTC hops.
#[tokio::test]
async fn quote_execute_deposit_drives_to_completion() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let quote_resp: Value = client
        .post(format!("{base}/routing/quote/v2"))
        .json(&json!({ "amountIn": 10_000.0, "fromToken": "BRL", "toToken": "EUR" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quotes = quote_resp["quotes"].as_array().unwrap();
    assert_eq!(quotes.len(), 1);
    let quote_id = quotes[0]["quoteId"].as_str().unwrap().to_string();
    assert!(quotes[0]["route"]["steps"].as_array().unwrap().len() >= 1);

    let execute_resp: Value = client
        .post(format!("{base}/routing/execute/v2"))
        .json(&json!({ "quoteId": quote_id, "clientId": "client-1" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(execute_resp["status"], "PENDING_APPROVAL");
    let payment_reference = execute_resp["depositInstructions"]["paymentReference"]
        .as_str()
        .unwrap()
        .to_string();
    let amount = execute_resp["depositInstructions"]["amount"].as_f64().unwrap();

    let webhook_resp: Value = client
        .post(format!("{base}/routing/webhooks/deposit"))
        .json(&json!({ "paymentReference": payment_reference, "amountReceived": amount }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(webhook_resp["success"], true);
    let execution_id = webhook_resp["executionId"].as_str().unwrap().to_string();

    // SimulatedExecutor sleeps ~2s per step; the BRL->USDC->EUR mock route
    // is two OTC hops, so poll with enough headroom for both.
    let mut status_body = Value::Null;
    for _ in 0..40 {
        let resp: Value = client
            .get(format!("{base}/routing/status?executionId={execution_id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let status = resp["status"].as_str().unwrap().to_string();
        status_body = resp;
        if status == "COMPLETED" || status == "FAILED" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    assert_eq!(status_body["status"], "COMPLETED");
    assert!(status_body["transactionHashes"].as_array().unwrap().len() >= 1);
}

#[tokio::test]
async fn webhook_unknown_reference_reports_failure_not_404() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/routing/webhooks/deposit"))
        .json(&json!({ "paymentReference": "no-such-ref", "amountReceived": 100.0 }))
        .send()
        .await
        .unwrap();

    // Contract: always 200, regardless of whether the reference is known.
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn status_for_unknown_execution_is_404() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/routing/status?executionId=nonexistent"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn cached_quotes_by_pair_reflects_prefetched_edges() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/routing/quotes?fromToken=BRL&toToken=USDC"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let cached = body.as_array().unwrap();
    assert!(!cached.is_empty());
    assert_eq!(cached[0]["fromToken"], "BRL");
}
