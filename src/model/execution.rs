use serde::{Deserialize, Serialize};

use super::route::Route;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    PendingApproval,
    Executing,
    Completed,
    Failed,
}

/// Tracks a reserved quote through on-chain/off-chain execution. Persists
/// past the execution TTL window so `/routing/status` can still answer for
/// a completed or failed transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub execution_id: String,
    pub quote_id: String,
    pub deposit_id: String,
    pub route: Route,
    /// The runner-up route found alongside `route` at quote time (§3). Taken
    /// by `enter_fallback` on the record's single permitted retry; absent
    /// once consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_route: Option<Route>,
    pub status: ExecutionStatus,
    pub current_step: usize,
    #[serde(default)]
    pub tx_hashes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `true` once a fallback route has been attempted. Capped at one
    /// fallback per execution; a second failure after fallback is terminal.
    #[serde(default)]
    pub used_fallback: bool,
    pub created_ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_ts: Option<i64>,
    /// Set when the record is created in `PENDING_APPROVAL`; must match the
    /// token presented to `approveExecution` before the record can advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_token: Option<String>,
}

impl ExecutionRecord {
    /// `route` containing at least one non-DEX (OTC) step requires an
    /// explicit approval step before execution begins.
    pub fn requires_approval(route: &Route) -> bool {
        route.steps.iter().any(|s| s.chain_id == 0)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        execution_id: String,
        quote_id: String,
        deposit_id: String,
        route: Route,
        fallback_route: Option<Route>,
        created_ts: i64,
        approval_token: Option<String>,
    ) -> Self {
        let status = if approval_token.is_some() {
            ExecutionStatus::PendingApproval
        } else {
            ExecutionStatus::Executing
        };
        ExecutionRecord {
            execution_id,
            quote_id,
            deposit_id,
            route,
            fallback_route,
            status,
            current_step: 0,
            tx_hashes: Vec::new(),
            error: None,
            used_fallback: false,
            created_ts,
            completed_ts: None,
            approval_token,
        }
    }

    /// Advances `PENDING_APPROVAL -> EXECUTING` if `token` matches the
    /// record's `approval_token`. Returns `false` (no state change) on a
    /// mismatch or if the record isn't awaiting approval.
    pub fn approve(&mut self, token: &str) -> bool {
        if self.status != ExecutionStatus::PendingApproval {
            return false;
        }
        if self.approval_token.as_deref() != Some(token) {
            return false;
        }
        self.status = ExecutionStatus::Executing;
        true
    }

    /// Confirmed deposit arrival is itself treated as authorization to
    /// proceed: the webhook path moves a `PENDING_APPROVAL` record straight
    /// to `EXECUTING` without requiring a separate `approveExecution` call.
    /// A no-op once already `EXECUTING` or terminal.
    pub fn begin_execution_via_deposit(&mut self) -> bool {
        if self.status != ExecutionStatus::PendingApproval {
            return false;
        }
        self.status = ExecutionStatus::Executing;
        true
    }

    pub fn complete(&mut self, now_ms: i64) {
        self.status = ExecutionStatus::Completed;
        self.completed_ts = Some(now_ms);
    }

    /// Marks the record terminally failed. Callers decide beforehand whether
    /// a fallback route should be substituted and retried instead of calling
    /// this - once failed, a record never re-enters `EXECUTING`.
    pub fn fail(&mut self, error: String, now_ms: i64) {
        self.status = ExecutionStatus::Failed;
        self.error = Some(error);
        self.completed_ts = Some(now_ms);
    }

    /// Rebinds this record to its persisted `fallback_route`, resetting step
    /// progress. Only valid once: `can_use_fallback` must be checked first.
    /// Returns `false` (no state change) if no fallback route is present.
    pub fn enter_fallback(&mut self) -> bool {
        let Some(route) = self.fallback_route.take() else {
            return false;
        };
        self.route = route;
        self.current_step = 0;
        self.tx_hashes.clear();
        self.used_fallback = true;
        self.status = ExecutionStatus::Executing;
        true
    }

    pub fn can_use_fallback(&self) -> bool {
        !self.used_fallback && self.fallback_route.is_some()
    }
}
