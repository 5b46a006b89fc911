use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

fn default_volatility_params() -> HashMap<String, f64> {
    let mut m = HashMap::new();
    m.insert("BRL/USDC".to_string(), 0.008);
    m.insert("USDC/BRL".to_string(), 0.008);
    m.insert("MXN/USDC".to_string(), 0.006);
    m.insert("USDC/MXN".to_string(), 0.006);
    m.insert("NGN/USDC".to_string(), 0.012);
    m.insert("USDC/NGN".to_string(), 0.012);
    m.insert("USDC/EUR".to_string(), 0.003);
    m.insert("EUR/USDC".to_string(), 0.003);
    m.insert("USDC/EURC".to_string(), 0.001);
    m.insert("EURC/USDC".to_string(), 0.001);
    m
}

fn default_counterparty_risk() -> HashMap<String, f64> {
    let mut m = HashMap::new();
    m.insert("otc:x".to_string(), 0.001);
    m.insert("otc:default".to_string(), 0.001);
    m
}

fn default_deposit_accounts() -> HashMap<String, HashMap<String, String>> {
    let mut m = HashMap::new();
    let mut pix = HashMap::new();
    pix.insert("pixKey".to_string(), "crossflow@payments.example".to_string());
    pix.insert("beneficiary".to_string(), "Crossflow Payments Ltda".to_string());
    m.insert("pix".to_string(), pix);
    let mut spei = HashMap::new();
    spei.insert("clabe".to_string(), "002010077777777771".to_string());
    spei.insert("beneficiary".to_string(), "Crossflow Payments SA de CV".to_string());
    m.insert("spei".to_string(), spei);
    let mut bank = HashMap::new();
    bank.insert("iban".to_string(), "GB29CROS60161331926819".to_string());
    bank.insert("beneficiary".to_string(), "Crossflow Payments Ltd".to_string());
    m.insert("bank_transfer".to_string(), bank);
    let mut wire = HashMap::new();
    wire.insert("swift".to_string(), "CROSGB2L".to_string());
    wire.insert("beneficiary".to_string(), "Crossflow Payments Ltd".to_string());
    m.insert("wire_transfer".to_string(), wire);
    let mut onchain = HashMap::new();
    onchain.insert("address".to_string(), "So11111111111111111111111111111111111111112".to_string());
    m.insert("on_chain".to_string(), onchain);
    m
}

/// A single configured HTTP FX pair: `fromToken`/`toToken` plus the upstream
/// identifier the provider uses to look it up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxPairConfig {
    pub from_token: String,
    pub to_token: String,
}

fn default_fx_pairs() -> Vec<FxPairConfig> {
    vec![
        FxPairConfig { from_token: "BRL".into(), to_token: "USD".into() },
        FxPairConfig { from_token: "MXN".into(), to_token: "USD".into() },
        FxPairConfig { from_token: "EUR".into(), to_token: "USD".into() },
    ]
}

/// Process-wide configuration, loaded once at startup from an optional file
/// plus environment overrides. Every field has a usable default so the
/// service runs out of the box against the static/mock provider and the
/// in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub fast_prefetch_period_ms: u64,
    pub slow_prefetch_period_ms: u64,
    pub volatility_params: HashMap<String, f64>,
    pub counterparty_risk_defaults: HashMap<String, f64>,
    pub default_counterparty_risk: f64,
    pub deposit_accounts: HashMap<String, HashMap<String, String>>,
    pub fx_endpoint_base_url: String,
    pub fx_api_key: Option<String>,
    pub fx_pairs: Vec<FxPairConfig>,
    pub http_bind_addr: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            fast_prefetch_period_ms: 30_000,
            slow_prefetch_period_ms: 60_000,
            volatility_params: default_volatility_params(),
            counterparty_risk_defaults: default_counterparty_risk(),
            default_counterparty_risk: 0.001,
            deposit_accounts: default_deposit_accounts(),
            fx_endpoint_base_url: "https://fx.example.internal".to_string(),
            fx_api_key: None,
            fx_pairs: default_fx_pairs(),
            http_bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl RoutingConfig {
    /// Loads defaults, then overlays an optional JSON config file, then
    /// environment variables (`CROSSFLOW_*`). Missing file or missing env
    /// vars are not errors - each layer only overrides what it sets.
    pub fn load(config_path: Option<&str>) -> anyhow::Result<RoutingConfig> {
        let mut config = RoutingConfig::default();

        if let Some(path) = config_path {
            match std::fs::read_to_string(path) {
                Ok(raw) => {
                    config = serde_json::from_str(&raw)
                        .map_err(|e| anyhow::anyhow!("invalid config file {path}: {e}"))?;
                }
                Err(err) => {
                    println!("[config] no config file at {path} ({err}), using defaults");
                }
            }
        }

        if let Ok(v) = env::var("CROSSFLOW_FAST_PREFETCH_PERIOD_MS") {
            config.fast_prefetch_period_ms = v.parse().unwrap_or(config.fast_prefetch_period_ms);
        }
        if let Ok(v) = env::var("CROSSFLOW_SLOW_PREFETCH_PERIOD_MS") {
            config.slow_prefetch_period_ms = v.parse().unwrap_or(config.slow_prefetch_period_ms);
        }
        if let Ok(v) = env::var("CROSSFLOW_FX_ENDPOINT_BASE_URL") {
            config.fx_endpoint_base_url = v;
        }
        if let Ok(v) = env::var("CROSSFLOW_FX_API_KEY") {
            config.fx_api_key = Some(v);
        }
        if let Ok(v) = env::var("CROSSFLOW_HTTP_BIND_ADDR") {
            config.http_bind_addr = v;
        }

        Ok(config)
    }

    pub fn volatility_for(&self, from_token: &str, to_token: &str) -> f64 {
        self.volatility_params
            .get(&format!("{from_token}/{to_token}"))
            .copied()
            .unwrap_or(0.005)
    }

    pub fn counterparty_risk_for(&self, venue_id: &str) -> f64 {
        self.counterparty_risk_defaults
            .get(venue_id)
            .copied()
            .unwrap_or(self.default_counterparty_risk)
    }
}
