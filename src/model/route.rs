use serde::{Deserialize, Serialize};

/// One hop of a route: a single (fromToken, toToken, venue) conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub from_token: String,
    pub to_token: String,
    pub venue_id: String,
    pub chain_id: u64,
    pub amount_in: f64,
    pub amount_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_bps: Option<u32>,
    pub estimated_duration_ms: u64,
}

/// An ordered list of 1-3 hops from `from_token` to `to_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub from_token: String,
    pub to_token: String,
    pub steps: Vec<RouteStep>,
    pub total_in: f64,
    pub total_out: f64,
    pub effective_rate: f64,
    pub total_fees_bps: u32,
    pub confidence: f64,
    pub timestamp: i64,
}

impl Route {
    /// Build a route from its steps, computing the aggregate fields.
    /// `total_fees_bps` is the *sum* of per-step fees, a telemetry-only
    /// lower-bound summary — it is never re-applied to the output.
    pub fn from_steps(steps: Vec<RouteStep>, confidence: f64, timestamp: i64) -> Option<Route> {
        let first = steps.first()?;
        let last = steps.last()?;
        let total_in = first.amount_in;
        let total_out = last.amount_out;
        let total_fees_bps: u32 = steps.iter().filter_map(|s| s.fee_bps).sum();
        let effective_rate = if total_in > 0.0 {
            total_out / total_in
        } else {
            0.0
        };
        Some(Route {
            from_token: first.from_token.clone(),
            to_token: last.to_token.clone(),
            steps,
            total_in,
            total_out,
            effective_rate,
            total_fees_bps,
            confidence,
            timestamp,
        })
    }

    /// Structural invariant: each step's `toToken` matches the next step's
    /// `fromToken`, and each step's output feeds the next step's input.
    pub fn is_structurally_valid(&self) -> bool {
        if self.steps.is_empty() {
            return false;
        }
        if self.steps.first().unwrap().from_token != self.from_token {
            return false;
        }
        if self.steps.last().unwrap().to_token != self.to_token {
            return false;
        }
        self.steps.windows(2).all(|w| {
            w[0].to_token == w[1].from_token && (w[0].amount_out - w[1].amount_in).abs() < 1e-9
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(from: &str, to: &str, amount_in: f64, amount_out: f64) -> RouteStep {
        RouteStep {
            from_token: from.into(),
            to_token: to.into(),
            venue_id: "otc:x".into(),
            chain_id: 0,
            amount_in,
            amount_out,
            fee_bps: Some(10),
            estimated_duration_ms: 0,
        }
    }

    #[test]
    fn from_steps_computes_aggregates() {
        let route = Route::from_steps(
            vec![
                step("BRL", "USDC", 10_000.0, 2000.0),
                step("USDC", "EUR", 2000.0, 1840.0),
            ],
            0.9,
            1000,
        )
        .unwrap();
        assert_eq!(route.from_token, "BRL");
        assert_eq!(route.to_token, "EUR");
        assert_eq!(route.total_in, 10_000.0);
        assert_eq!(route.total_out, 1840.0);
        assert_eq!(route.total_fees_bps, 20);
        assert!(route.is_structurally_valid());
    }

    #[test]
    fn mismatched_chain_is_invalid() {
        let mut route =
            Route::from_steps(vec![step("BRL", "USDC", 10_000.0, 2000.0)], 1.0, 0).unwrap();
        route.steps.push(step("EUR", "USD", 2000.0, 1999.0));
        assert!(!route.is_structurally_valid());
    }
}
