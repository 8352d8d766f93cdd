//! Crate-level error type for the workflow orchestrator.
//!
//! Lower layers (`db`, `activities`, `api`) define their own `thiserror`
//! enums and convert into this one at the boundary where the interpreter
//! or planner calls them.

use thiserror::Error;

/// Errors that can occur while interpreting or scheduling a workflow.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A node, instance, or graph definition referenced by id was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed node configuration (missing `actionType`, blank `set-state`
    /// key, bad `loopStartNodeId`, ...). See spec §7 kind 1.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A node-level activity call returned `{success:false}` and the node's
    /// `continueOnError` did not suppress it. See spec §7 kind 2.
    #[error("activity error: {0}")]
    Activity(String),

    /// The whole instance is terminating because an approval was rejected.
    #[error("workflow rejected at {node_id}: {reason}")]
    Rejected { node_id: String, reason: String },

    /// An approval, agent, or planner-approval suspension elapsed its timer.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A child workflow reported failure; the error is surfaced into the
    /// parent node's output.
    #[error("child workflow failed: {0}")]
    ChildFailed(String),

    /// Any error bubbling up from the façade/persistence layers.
    #[error("activity call failed: {0}")]
    ActivityCall(#[from] crate::activities::ActivityError),

    /// Persistence errors from the audit/state layer.
    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected internal failures (spec §7 kind 6,
    /// "infrastructure error").
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
