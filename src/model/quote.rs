use serde::{Deserialize, Serialize};

/// Which kind of venue produced an edge quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VenueKind {
    Otc,
    Dex,
    Fx,
}

/// Settlement-risk metadata attached to a quote. OTC and FX quotes carry
/// this; on-chain DEX quotes generally don't need it (settlement is atomic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementMeta {
    pub settlement_days: f64,
    pub counterparty_risk: f64,
    pub supports_reservation: bool,
    #[serde(default)]
    pub payment_methods: Vec<String>,
}

/// A unit of pricing information from one venue for one directed token pair.
///
/// `amount_in`/`amount_out` fix a reference size and its output; callers
/// scale through `rate()` for other amounts. A quote with `amount_in <= 0`
/// has no defined rate and must be treated as invalid by every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeQuote {
    pub venue_id: String,
    pub venue_kind: VenueKind,
    pub from_token: String,
    pub to_token: String,
    pub amount_in: f64,
    pub amount_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount_in: Option<f64>,
    /// Basis points, 0..=10000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_bps: Option<u32>,
    pub expiry_ts: i64,
    pub last_updated_ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_meta: Option<SettlementMeta>,
}

impl EdgeQuote {
    /// `amountOut / amountIn`. Undefined (returns `None`) if `amount_in <= 0`.
    pub fn rate(&self) -> Option<f64> {
        if self.amount_in > 0.0 {
            Some(self.amount_out / self.amount_in)
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.amount_in > 0.0
            && self.amount_out > 0.0
            && self.expiry_ts > self.last_updated_ts
            && self.fee_bps.is_none_or(|f| f <= 10_000)
    }

    pub fn is_live(&self, now_ms: i64, min_expiry_ms: i64) -> bool {
        self.expiry_ts > now_ms + min_expiry_ms
    }

    /// `true` if this quote's venue is on-chain (`venueId` begins with `dex:`).
    pub fn is_dex_venue(&self) -> bool {
        self.venue_id.starts_with("dex:")
    }

    /// Apply this quote to an amount entering the leg: gross output then the
    /// venue's fee. `gross = x * rate`; `net = gross - gross * feeBps/10000`.
    pub fn compute_output(&self, amount_in: f64) -> Option<f64> {
        let rate = self.rate()?;
        let gross = amount_in * rate;
        let net = match self.fee_bps {
            Some(bps) => gross - gross * (bps as f64) / 10_000.0,
            None => gross,
        };
        Some(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(amount_in: f64, amount_out: f64, fee_bps: Option<u32>) -> EdgeQuote {
        EdgeQuote {
            venue_id: "otc:x".into(),
            venue_kind: VenueKind::Otc,
            from_token: "USDC".into(),
            to_token: "EUR".into(),
            amount_in,
            amount_out,
            max_amount_in: None,
            fee_bps,
            expiry_ts: 10_000,
            last_updated_ts: 1_000,
            deposit_address: None,
            settlement_meta: None,
        }
    }

    #[test]
    fn rate_undefined_for_non_positive_amount_in() {
        assert_eq!(quote(0.0, 100.0, None).rate(), None);
        assert_eq!(quote(-1.0, 100.0, None).rate(), None);
    }

    #[test]
    fn compute_output_applies_rate_then_fee() {
        // a0=1000, b0=920, f=30bps, x=1000 => 1000 * 0.92 * (1 - 0.003) = 917.24
        let q = quote(1000.0, 920.0, Some(30));
        let out = q.compute_output(1000.0).unwrap();
        assert!((out - 917.24).abs() < 1e-6);
    }

    #[test]
    fn compute_output_scales_with_any_positive_x() {
        let q = quote(1000.0, 920.0, Some(30));
        for x in [1.0, 250.0, 10_000.0] {
            let out = q.compute_output(x).unwrap();
            let expected = x * (920.0 / 1000.0) * (1.0 - 30.0 / 10_000.0);
            assert!((out - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn validity_requires_positive_amounts_and_sane_expiry() {
        assert!(quote(1000.0, 920.0, Some(30)).is_valid());
        assert!(!quote(0.0, 920.0, None).is_valid());
        assert!(!quote(1000.0, 0.0, None).is_valid());
        let mut bad_expiry = quote(1000.0, 920.0, None);
        bad_expiry.expiry_ts = bad_expiry.last_updated_ts;
        assert!(!bad_expiry.is_valid());
        let mut bad_fee = quote(1000.0, 920.0, Some(10_001));
        bad_fee.expiry_ts = 20_000;
        assert!(!bad_fee.is_valid());
    }
}
