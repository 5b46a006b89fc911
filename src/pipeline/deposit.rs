use uuid::Uuid;

use crate::clock::Clock;
use crate::config::RoutingConfig;
use crate::error::{Result, RoutingError};
use crate::model::deposit::{DepositInstructions, DepositMethod, DepositRecord, DepositStatus, DEPOSIT_TTL_MS};
use crate::model::reserved::ReservedQuote;
use crate::qrcode::build_pix_payload;
use crate::store::KeyValueStore;

fn deposit_key(deposit_id: &str) -> String {
    format!("deposit:{deposit_id}")
}

fn deposit_ref_key(payment_reference: &str) -> String {
    format!("deposit:ref:{payment_reference}")
}

fn method_config_key(method: DepositMethod) -> &'static str {
    match method {
        DepositMethod::Pix => "pix",
        DepositMethod::Spei => "spei",
        DepositMethod::BankTransfer => "bank_transfer",
        DepositMethod::WireTransfer => "wire_transfer",
        DepositMethod::OnChain => "on_chain",
    }
}

fn truncate(s: &str, n: usize) -> &str {
    let end = s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len());
    &s[..end]
}

/// Issues deposit instructions for a freshly reserved quote, persisting the
/// record under both `deposit:{depositId}` and the `deposit:ref:*` index
/// used by webhook confirmation.
pub async fn issue_deposit(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    config: &RoutingConfig,
    quote_id: &str,
    client_id: &str,
    reserved: &ReservedQuote,
) -> Result<DepositRecord> {
    let route = reserved
        .route
        .as_ref()
        .ok_or_else(|| RoutingError::InvalidQuote(format!("quote {quote_id} has no route")))?;

    let payment_reference = format!(
        "r{}-{}",
        truncate(&reserved.reservation_id, 8),
        truncate(client_id, 8)
    );
    let method = DepositMethod::for_source_token(&route.from_token);
    let account_details = config
        .deposit_accounts
        .get(method_config_key(method))
        .cloned()
        .unwrap_or_default();

    let qr_code_data = if method == DepositMethod::Pix {
        let pix_key = account_details.get("pixKey").cloned().unwrap_or_default();
        let beneficiary = account_details
            .get("beneficiary")
            .cloned()
            .unwrap_or_else(|| "CROSSFLOW".to_string());
        Some(build_pix_payload(&pix_key, &beneficiary, "SAO PAULO", reserved.amount_in, &payment_reference))
    } else {
        None
    };

    let instructions = DepositInstructions {
        method,
        account_details,
        amount: reserved.amount_in,
        payment_reference: payment_reference.clone(),
        qr_code_data,
        deposit_expiry_ts: reserved.reserved_until_ts,
    };

    let deposit_id = Uuid::new_v4().to_string();
    let record = DepositRecord {
        deposit_id: deposit_id.clone(),
        quote_id: quote_id.to_string(),
        client_id: client_id.to_string(),
        amount_expected: reserved.amount_in,
        amount_received: None,
        instructions,
        status: DepositStatus::Pending,
        received_at: None,
        bank_tx_id: None,
        payment_reference: payment_reference.clone(),
    };

    let json = serde_json::to_string(&record).expect("DepositRecord always serializes");
    store.set(&deposit_key(&deposit_id), &json, Some(DEPOSIT_TTL_MS)).await;
    store
        .set(&deposit_ref_key(&payment_reference), &deposit_id, Some(DEPOSIT_TTL_MS))
        .await;

    Ok(record)
}

/// Resolves a deposit by its `paymentReference` and applies a confirmation.
/// Idempotent on `paymentReference`: if the record is already `CONFIRMED`,
/// the existing record is returned unchanged rather than re-triggering
/// execution.
pub async fn confirm_deposit(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    payment_reference: &str,
    amount_received: f64,
    bank_tx_id: Option<String>,
) -> Result<DepositRecord> {
    let deposit_id = store
        .get(&deposit_ref_key(payment_reference))
        .await
        .ok_or_else(|| RoutingError::not_found(format!("no deposit for reference {payment_reference}")))?;

    let raw = store
        .get(&deposit_key(&deposit_id))
        .await
        .ok_or_else(|| RoutingError::not_found(format!("deposit record {deposit_id} missing")))?;
    let mut record: DepositRecord = serde_json::from_str(&raw)
        .map_err(|e| RoutingError::Internal(format!("corrupt deposit record {deposit_id}: {e}")))?;

    if record.status == DepositStatus::Confirmed {
        return Ok(record);
    }

    if !record.within_tolerance(amount_received) {
        println!(
            "[pipeline] deposit {deposit_id} amount {amount_received} outside 0.1% tolerance of expected {} (accepted anyway)",
            record.amount_expected
        );
    }

    record.status = DepositStatus::Confirmed;
    record.amount_received = Some(amount_received);
    record.received_at = Some(clock.now_ms());
    record.bank_tx_id = bank_tx_id;

    let json = serde_json::to_string(&record).expect("DepositRecord always serializes");
    store.set(&deposit_key(&deposit_id), &json, Some(DEPOSIT_TTL_MS)).await;
    Ok(record)
}
