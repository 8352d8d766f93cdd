//! Activity Contracts (spec §4.6).
//!
//! Thin, side-effecting façades used from the Interpreter and Planner
//! Workflow. Each is built over `reqwest` against the Dapr sidecar HTTP
//! API, grounded in the teacher's client-façade style
//! (`client/client.rs`'s request/response correlation, `db/connection.rs`'s
//! resource-lifecycle conventions) but retargeted from a bespoke WebSocket
//! tool protocol to the plain HTTP request/response contracts spec.md §6
//! names for the function-router, agent services, state store, and
//! pub/sub transport.

pub mod agent;
pub mod audit;
pub mod callback;
pub mod function_router;
pub mod pubsub;
pub mod state_store;

use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::db::DatabasePool;

/// Errors from an activity façade call (spec §7 kind 2 "Activity error").
#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("activity {name} returned success=false: {message}")]
    Failed { name: String, message: String },

    #[error("unexpected response shape from {name}: {detail}")]
    BadResponse { name: String, detail: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

pub type ActivityResult<T> = std::result::Result<T, ActivityError>;

/// Shared HTTP client, resolved config, and audit DB pool, cloned cheaply
/// into every façade.
#[derive(Clone)]
pub struct Activities {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<Config>,
    pub(crate) db: DatabasePool,
}

impl Activities {
    pub fn new(config: Arc<Config>, db: DatabasePool) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            db,
        }
    }
}

/// Standard `{success, data, error, duration_ms}` envelope most activities
/// return (spec §4.6 "execute-action").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct ActivityOutcome {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub pause: Option<serde_json::Value>,
}
