//! Row types for the audit tables (spec §6).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `workflow_execution_logs.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ExecutionLogStatus {
    Running,
    Success,
    Error,
}

/// `workflow_executions.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// One row of `workflow_execution_logs`: per-node audit trail for
/// planner/timer/approval/loop/child-workflow nodes (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowExecutionLog {
    pub id: Uuid,
    pub execution_id: String,
    pub node_id: String,
    pub node_name: String,
    pub node_type: String,
    pub activity_name: String,
    pub status: ExecutionLogStatus,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
    pub error: Option<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub duration: Option<i64>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// One row of `workflow_executions`, written once at terminal outcome
/// (spec §6, §5 "dbExecutionId row is written by exactly one activity
/// path per terminal outcome").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowExecutionRow {
    pub id: String,
    pub output: serde_json::Value,
    pub status: ExecutionStatus,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub duration: i64,
}
