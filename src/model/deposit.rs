use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default TTL for a deposit record: 1 hour.
pub const DEPOSIT_TTL_MS: i64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositMethod {
    Pix,
    Spei,
    BankTransfer,
    WireTransfer,
    OnChain,
}

impl DepositMethod {
    /// PIX for BRL, SPEI for MXN, bank_transfer for USD/EUR, bank_transfer
    /// as the general fallback.
    pub fn for_source_token(token: &str) -> DepositMethod {
        match token.to_uppercase().as_str() {
            "BRL" => DepositMethod::Pix,
            "MXN" => DepositMethod::Spei,
            "USD" | "EUR" => DepositMethod::BankTransfer,
            _ => DepositMethod::BankTransfer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DepositStatus {
    Pending,
    Confirmed,
    Failed,
    Expired,
}

/// Payload returned to the client describing how to pay off-chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositInstructions {
    pub method: DepositMethod,
    pub account_details: HashMap<String, String>,
    pub amount: f64,
    /// Unique within the deposit's TTL window.
    pub payment_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_data: Option<String>,
    pub deposit_expiry_ts: i64,
}

/// The persisted record bound first by `payment_reference`, later by
/// `deposit_id`. At most one record per `payment_reference` is active at a
/// time (the cache TTL enforces this in practice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    pub deposit_id: String,
    pub quote_id: String,
    pub client_id: String,
    pub amount_expected: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_received: Option<f64>,
    pub instructions: DepositInstructions,
    pub status: DepositStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_tx_id: Option<String>,
    pub payment_reference: String,
}

impl DepositRecord {
    /// `|received - expected| <= 0.1% * expected`. Mismatches outside this
    /// tolerance are still accepted (warned, not rejected) per the pipeline's
    /// deposit-confirmation design — small overages/undershoots from banking
    /// fees are expected.
    pub fn within_tolerance(&self, amount_received: f64) -> bool {
        let tolerance = self.amount_expected * 0.001;
        (amount_received - self.amount_expected).abs() <= tolerance
    }
}
