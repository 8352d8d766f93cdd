//! Audit persistence (spec §6 "Audit DB").
//!
//! Grounded in the teacher's `db::connection` / `db::repositories`
//! split, retargeted to the two Postgres tables spec.md §6 specifies:
//! `workflow_execution_logs` (one row per planner/timer/approval/loop/
//! child-workflow node) and `workflow_executions` (one row updated once
//! at terminal outcome).

pub mod connection;
pub mod error;
pub mod models;
pub mod repository;

pub use connection::{DatabaseConnection, DatabasePool, PoolStatistics};
pub use error::{DatabaseError, DbResult};
pub use models::{ExecutionLogStatus, ExecutionStatus, WorkflowExecutionLog, WorkflowExecutionRow};
pub use repository::AuditRepository;
