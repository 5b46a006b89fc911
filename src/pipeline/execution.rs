use std::sync::Arc;

use rand::Rng;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Result, RoutingError};
use crate::executor::StepExecutor;
use crate::model::execution::{ExecutionRecord, ExecutionStatus};
use crate::model::route::Route;
use crate::store::KeyValueStore;

const EXECUTION_TTL_MS: i64 = 86_400_000;

fn exec_key(execution_id: &str) -> String {
    format!("exec:{execution_id}")
}

fn exec_by_quote_key(quote_id: &str) -> String {
    format!("execution:quote:{quote_id}")
}

fn random_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

async fn save(store: &dyn KeyValueStore, record: &ExecutionRecord) {
    let json = serde_json::to_string(record).expect("ExecutionRecord always serializes");
    store.set(&exec_key(&record.execution_id), &json, Some(EXECUTION_TTL_MS)).await;
}

/// Public entry point for handlers that mutate a record outside this
/// module's own lifecycle functions (e.g. the deposit webhook's implicit
/// approval transition).
pub async fn save_record(store: &dyn KeyValueStore, record: &ExecutionRecord) {
    save(store, record).await;
}

/// Creates an execution record for a confirmed deposit. Routes containing a
/// non-DEX (OTC) step require explicit approval before stepping begins.
pub async fn create_execution(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    quote_id: &str,
    deposit_id: &str,
    route: Route,
    fallback_route: Option<Route>,
) -> ExecutionRecord {
    let approval_token = if ExecutionRecord::requires_approval(&route) {
        Some(random_token())
    } else {
        None
    };
    let execution_id = Uuid::new_v4().to_string();
    let record = ExecutionRecord::new(
        execution_id.clone(),
        quote_id.to_string(),
        deposit_id.to_string(),
        route,
        fallback_route,
        clock.now_ms(),
        approval_token,
    );
    save(store, &record).await;
    store
        .set(&exec_by_quote_key(quote_id), &execution_id, Some(EXECUTION_TTL_MS))
        .await;
    record
}

pub async fn get_execution(store: &dyn KeyValueStore, execution_id: &str) -> Result<ExecutionRecord> {
    let raw = store
        .get(&exec_key(execution_id))
        .await
        .ok_or_else(|| RoutingError::not_found(format!("no execution {execution_id}")))?;
    serde_json::from_str(&raw)
        .map_err(|e| RoutingError::Internal(format!("corrupt execution record {execution_id}: {e}")))
}

pub async fn approve_execution(
    store: &dyn KeyValueStore,
    execution_id: &str,
    token: &str,
) -> Result<ExecutionRecord> {
    let mut record = get_execution(store, execution_id).await?;
    if !record.approve(token) {
        return Err(RoutingError::InvalidQuote(format!(
            "execution {execution_id} could not be approved with the given token"
        )));
    }
    save(store, &record).await;
    Ok(record)
}

/// Drives an `EXECUTING` record through its route's steps, one at a time,
/// via the injected `StepExecutor`. Fire-and-forget: callers spawn this and
/// return immediately with the record's current (pre-drive) state.
pub async fn drive_execution(
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    executor: Arc<dyn StepExecutor>,
    execution_id: String,
) {
    loop {
        let mut record = match get_execution(store.as_ref(), &execution_id).await {
            Ok(r) => r,
            Err(err) => {
                eprintln!("[pipeline] execution driver could not load {execution_id}: {err}");
                return;
            }
        };
        if record.status != ExecutionStatus::Executing {
            return;
        }

        let mut step_failed = false;
        while record.current_step < record.route.steps.len() {
            let step = record.route.steps[record.current_step].clone();
            match executor.execute(&step).await {
                Ok(tx_hash) => {
                    record.tx_hashes.push(tx_hash);
                    record.current_step += 1;
                    save(store.as_ref(), &record).await;
                }
                Err(err) => {
                    println!("[pipeline] step {} failed for execution {execution_id}: {err}", record.current_step);
                    step_failed = true;
                    break;
                }
            }
        }

        if !step_failed {
            record.complete(clock.now_ms());
            save(store.as_ref(), &record).await;
            println!("[pipeline] execution {execution_id} completed with {} tx hashes", record.tx_hashes.len());
            return;
        }

        if record.can_use_fallback() && record.enter_fallback() {
            save(store.as_ref(), &record).await;
            println!("[pipeline] execution {execution_id} entering fallback route");
            continue;
        }

        record.fail("step execution failed and no fallback is available".to_string(), clock.now_ms());
        save(store.as_ref(), &record).await;
        println!("[pipeline] execution {execution_id} failed terminally");
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::route::RouteStep;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn route_with_steps(n: usize) -> Route {
        let steps: Vec<RouteStep> = (0..n)
            .map(|i| RouteStep {
                from_token: format!("T{i}"),
                to_token: format!("T{}", i + 1),
                venue_id: "dex:x".into(),
                chain_id: 101,
                amount_in: 100.0,
                amount_out: 99.0,
                fee_bps: Some(10),
                estimated_duration_ms: 0,
            })
            .collect();
        Route::from_steps(steps, 1.0, 0).unwrap()
    }

    struct ScriptedExecutor {
        fail_on_step: Option<usize>,
        calls: AtomicUsize,
        seen_amounts: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl StepExecutor for ScriptedExecutor {
        async fn execute(&self, step: &RouteStep) -> anyhow::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_amounts.lock().unwrap().push(step.amount_in);
            if self.fail_on_step == Some(call) {
                anyhow::bail!("simulated failure");
            }
            Ok(format!("0xhash{call}"))
        }
    }

    #[tokio::test]
    async fn drives_every_step_to_completion() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(0));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        let record =
            create_execution(store.as_ref(), clock.as_ref(), "q1", "d1", route_with_steps(2), None).await;
        let executor: Arc<dyn StepExecutor> = Arc::new(ScriptedExecutor {
            fail_on_step: None,
            calls: AtomicUsize::new(0),
            seen_amounts: Mutex::new(Vec::new()),
        });

        drive_execution(store.clone(), clock.clone(), executor, record.execution_id.clone()).await;

        let done = get_execution(store.as_ref(), &record.execution_id).await.unwrap();
        assert_eq!(done.status, ExecutionStatus::Completed);
        assert_eq!(done.tx_hashes.len(), 2);
    }

    #[tokio::test]
    async fn s5_fallback_retry_resets_current_step_and_succeeds() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(0));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        // primary route's 2nd step fails (index 1 => call index 1)
        let record = create_execution(
            store.as_ref(),
            clock.as_ref(),
            "q1",
            "d1",
            route_with_steps(2),
            Some(route_with_steps(1)),
        )
        .await;
        let executor: Arc<dyn StepExecutor> = Arc::new(ScriptedExecutor {
            fail_on_step: Some(1),
            calls: AtomicUsize::new(0),
            seen_amounts: Mutex::new(Vec::new()),
        });

        drive_execution(store.clone(), clock.clone(), executor, record.execution_id.clone()).await;

        let done = get_execution(store.as_ref(), &record.execution_id).await.unwrap();
        assert_eq!(done.status, ExecutionStatus::Completed);
        assert!(done.used_fallback);
        assert_eq!(done.tx_hashes.len(), 1);
    }

    #[tokio::test]
    async fn fails_terminally_when_no_fallback_available() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(0));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        let record =
            create_execution(store.as_ref(), clock.as_ref(), "q1", "d1", route_with_steps(1), None).await;
        let executor: Arc<dyn StepExecutor> = Arc::new(ScriptedExecutor {
            fail_on_step: Some(0),
            calls: AtomicUsize::new(0),
            seen_amounts: Mutex::new(Vec::new()),
        });

        drive_execution(store.clone(), clock.clone(), executor, record.execution_id.clone()).await;

        let done = get_execution(store.as_ref(), &record.execution_id).await.unwrap();
        assert_eq!(done.status, ExecutionStatus::Failed);
    }

    fn otc_route_with_steps(n: usize) -> Route {
        let steps: Vec<RouteStep> = (0..n)
            .map(|i| RouteStep {
                from_token: format!("T{i}"),
                to_token: format!("T{}", i + 1),
                venue_id: "otc:x".into(),
                chain_id: 0,
                amount_in: 100.0,
                amount_out: 99.0,
                fee_bps: Some(10),
                estimated_duration_ms: 0,
            })
            .collect();
        Route::from_steps(steps, 1.0, 0).unwrap()
    }

    #[tokio::test]
    async fn approve_execution_transitions_pending_to_executing() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(0));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(clock.clone()));
        let record =
            create_execution(store.as_ref(), clock.as_ref(), "q1", "d1", otc_route_with_steps(1), None).await;
        assert_eq!(record.status, ExecutionStatus::PendingApproval);
        let token = record.approval_token.clone().unwrap();

        let wrong = approve_execution(store.as_ref(), &record.execution_id, "wrong-token").await;
        assert!(wrong.is_err());

        let approved = approve_execution(store.as_ref(), &record.execution_id, &token).await.unwrap();
        assert_eq!(approved.status, ExecutionStatus::Executing);
    }
}
