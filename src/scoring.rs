use crate::config::RoutingConfig;
use crate::model::provisional::ScoringMeta;
use crate::model::quote::EdgeQuote;

/// A net output plus the metadata that explains the discount applied to
/// reach it. Kept separate from `ScoringMeta` so callers that only need the
/// number don't have to thread the whole record through.
pub struct ScoredOutput {
    pub net_output: f64,
    pub scoring_meta: ScoringMeta,
}

/// Discounts `gross_output` for settlement-delay and counterparty risk.
/// `leg_quotes` is the set of OTC/FX quotes participating in the route - DEX
/// legs settle atomically and carry no settlement metadata, so they're
/// simply absent from this set, not represented with zeros.
pub fn score_route(
    config: &RoutingConfig,
    from_token: &str,
    to_token: &str,
    gross_output: f64,
    leg_quotes: &[&EdgeQuote],
) -> ScoredOutput {
    let max_settlement_days = leg_quotes
        .iter()
        .filter_map(|q| q.settlement_meta.as_ref().map(|m| m.settlement_days))
        .fold(0.0_f64, f64::max);

    let avg_counterparty_risk = if leg_quotes.is_empty() {
        0.001
    } else {
        let sum: f64 = leg_quotes
            .iter()
            .map(|q| {
                q.settlement_meta
                    .as_ref()
                    .map(|m| m.counterparty_risk)
                    .unwrap_or_else(|| config.counterparty_risk_for(&q.venue_id))
            })
            .sum();
        sum / leg_quotes.len() as f64
    };

    let daily_vol = config.volatility_for(from_token, to_token);
    let risk_factor = 1.0;
    let time_penalty = gross_output * daily_vol * max_settlement_days.sqrt() * risk_factor;
    let counterparty_discount = gross_output * avg_counterparty_risk;
    let net_output = (gross_output - time_penalty - counterparty_discount).max(0.0);

    let confidence =
        (1.0 - max_settlement_days * 0.1 - avg_counterparty_risk * 10.0).clamp(0.5, 1.0);

    ScoredOutput {
        net_output,
        scoring_meta: ScoringMeta {
            settlement_days: max_settlement_days,
            counterparty_risk: avg_counterparty_risk,
            time_penalty,
            confidence,
        },
    }
}

/// The default settlement-meta rule FX providers apply when synthesising
/// quotes, per the token classification in §4.5.
pub fn default_settlement_meta(from_token: &str, to_token: &str) -> crate::model::quote::SettlementMeta {
    use crate::model::quote::SettlementMeta;

    const STABLES: [&str; 3] = ["USDC", "USDT", "EURC"];
    const FIAT: [&str; 3] = ["BRL", "MXN", "NGN"];

    if STABLES.contains(&from_token) || STABLES.contains(&to_token) {
        SettlementMeta {
            settlement_days: 0.5,
            counterparty_risk: 0.0001,
            supports_reservation: false,
            payment_methods: vec!["bank_transfer".to_string()],
        }
    } else if FIAT.contains(&from_token) || FIAT.contains(&to_token) {
        SettlementMeta {
            settlement_days: 1.0,
            counterparty_risk: 0.001,
            supports_reservation: true,
            payment_methods: vec!["bank_transfer".to_string()],
        }
    } else {
        SettlementMeta {
            settlement_days: 0.5,
            counterparty_risk: 0.0005,
            supports_reservation: false,
            payment_methods: vec!["bank_transfer".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quote::VenueKind;

    fn otc_quote(settlement_days: f64, counterparty_risk: f64) -> EdgeQuote {
        EdgeQuote {
            venue_id: "otc:x".into(),
            venue_kind: VenueKind::Otc,
            from_token: "USDC".into(),
            to_token: "EUR".into(),
            amount_in: 1000.0,
            amount_out: 920.0,
            max_amount_in: None,
            fee_bps: Some(30),
            expiry_ts: 30_000,
            last_updated_ts: 0,
            deposit_address: None,
            settlement_meta: Some(crate::model::quote::SettlementMeta {
                settlement_days,
                counterparty_risk,
                supports_reservation: true,
                payment_methods: vec!["pix".into()],
            }),
        }
    }

    #[test]
    fn s1_applies_time_and_counterparty_discount() {
        let config = RoutingConfig::default();
        let quote = otc_quote(0.1, 0.001);
        let scored = score_route(&config, "USDC", "EUR", 917.24, &[&quote]);
        let expected_penalty = 917.24 * config.volatility_for("USDC", "EUR") * 0.1_f64.sqrt();
        let expected_discount = 917.24 * 0.001;
        let expected_net = 917.24 - expected_penalty - expected_discount;
        assert!((scored.net_output - expected_net).abs() < 1e-9);
        assert_eq!(scored.scoring_meta.settlement_days, 0.1);
    }

    #[test]
    fn confidence_never_drops_below_half() {
        let config = RoutingConfig::default();
        let quote = otc_quote(10.0, 0.2);
        let scored = score_route(&config, "USDC", "EUR", 1000.0, &[&quote]);
        assert_eq!(scored.scoring_meta.confidence, 0.5);
    }

    #[test]
    fn empty_leg_set_uses_default_counterparty_risk() {
        let config = RoutingConfig::default();
        let scored = score_route(&config, "USDC", "EUR", 1000.0, &[]);
        assert_eq!(scored.scoring_meta.counterparty_risk, 0.001);
        assert_eq!(scored.scoring_meta.settlement_days, 0.0);
    }

    #[test]
    fn stable_pair_gets_low_risk_settlement_meta() {
        let meta = default_settlement_meta("USDC", "EUR");
        assert_eq!(meta.settlement_days, 0.5);
        assert_eq!(meta.counterparty_risk, 0.0001);
    }

    #[test]
    fn fiat_pair_gets_one_day_settlement_meta() {
        let meta = default_settlement_meta("BRL", "USDC");
        assert_eq!(meta.settlement_days, 1.0);
        assert_eq!(meta.counterparty_risk, 0.001);
    }
}
