use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::model::route::RouteStep;

/// Performs a single route step and reports back the settlement hash.
/// Implemented in production by the (absent) on-chain/OTC-settlement
/// driver; a mock returning a random hash after a short delay is the
/// reference implementation used here and in tests.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, step: &RouteStep) -> anyhow::Result<String>;
}

/// Waits ~2s, then returns a random hex transaction hash. Never fails -
/// callers that want to exercise the fallback path use a scripted double
/// instead (see `tests/`).
pub struct SimulatedExecutor {
    delay: Duration,
}

impl SimulatedExecutor {
    pub fn new() -> Self {
        SimulatedExecutor { delay: Duration::from_millis(2_000) }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepExecutor for SimulatedExecutor {
    async fn execute(&self, step: &RouteStep) -> anyhow::Result<String> {
        tokio::time::sleep(self.delay).await;
        let mut rng = rand::rng();
        let bytes: [u8; 32] = rng.random();
        let hash = bytes.iter().map(|b| format!("{b:02x}")).collect::<String>();
        println!(
            "[executor] settled {}->{} via {} (step amountIn={})",
            step.from_token, step.to_token, step.venue_id, step.amount_in
        );
        Ok(format!("0x{hash}"))
    }
}
