//! log-audit (approval request/response/timeout, node start/complete) and
//! persist-results-to-db (spec §4.6).
//!
//! Most nodes are logged by the function-router itself as a side effect of
//! `/external-event`; planner, timer, approval, and loop nodes bypass the
//! function-router entirely (they never call `execute-action`), so this
//! module writes their audit rows to `workflow_execution_logs` directly,
//! grounded in the teacher's `db/repositories/workflow_repo.rs` call style.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::db::{AuditRepository, ExecutionLogStatus, ExecutionStatus};

use super::{ActivityResult, Activities};

/// Node kinds that bypass function-router and so need a direct audit
/// write rather than riding along with `/external-event` (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectAuditNodeKind {
    Planner,
    Timer,
    Approval,
    Loop,
    ChildWorkflow,
}

impl DirectAuditNodeKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Timer => "timer",
            Self::Approval => "approval",
            Self::Loop => "loop",
            Self::ChildWorkflow => "child-workflow",
        }
    }
}

impl Activities {
    /// Forward an audit event to function-router's `/external-event`, used
    /// for node kinds that go through `execute-action` already (approval
    /// request/response/timeout, ordinary node start/complete).
    pub async fn log_audit_external(&self, execution_id: &str, node_id: &str, event: &str, detail: &Value) -> ActivityResult<()> {
        let url = self.config.function_router_invoke_url("/external-event");
        let body = serde_json::json!({
            "execution_id": execution_id,
            "node_id": node_id,
            "event": event,
            "detail": detail,
        });
        debug!(execution_id, node_id, event, "log-audit (external)");
        self.http.post(url).json(&body).send().await?;
        Ok(())
    }

    /// Write a `workflow_execution_logs` row directly for node kinds that
    /// bypass function-router (spec §4.6).
    #[allow(clippy::too_many_arguments)]
    pub async fn log_audit_direct(
        &self,
        execution_id: &str,
        node_id: &str,
        node_name: &str,
        kind: DirectAuditNodeKind,
        input: Value,
        output: Value,
        error: Option<String>,
        started_at: chrono::DateTime<Utc>,
    ) -> ActivityResult<()> {
        let status = if error.is_some() { ExecutionLogStatus::Error } else { ExecutionLogStatus::Success };
        let duration_ms = Utc::now().signed_duration_since(started_at).num_milliseconds();
        debug!(execution_id, node_id, node_type = kind.as_str(), "log-audit (direct)");
        AuditRepository::log_node(
            &self.db,
            execution_id,
            node_id,
            node_name,
            kind.as_str(),
            kind.as_str(),
            status,
            input,
            output,
            error,
            started_at,
            Some(duration_ms),
        )
        .await?;
        Ok(())
    }

    /// `persist-results-to-db`: the single terminal write to
    /// `workflow_executions` (spec §4.6, §5).
    pub async fn persist_results_to_db(
        &self,
        execution_id: &str,
        output: Value,
        succeeded: bool,
        duration_ms: i64,
    ) -> ActivityResult<()> {
        let status = if succeeded { ExecutionStatus::Success } else { ExecutionStatus::Error };
        debug!(execution_id, succeeded, "persist-results-to-db");
        AuditRepository::persist_terminal_result(&self.db, execution_id, output, status, duration_ms).await?;
        Ok(())
    }
}
