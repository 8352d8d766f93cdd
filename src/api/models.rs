//! Request/response DTOs for the HTTP surface (spec §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{GraphDefinition, Phase, RuntimeStatus};

/// `GET /health`, `GET /api/v2/health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

impl HealthResponse {
    pub fn new(status: impl Into<String>, database: impl Into<String>) -> Self {
        Self { status: status.into(), database: database.into() }
    }
}

/// `POST /api/v2/workflows` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct StartWorkflowRequest {
    pub definition: GraphDefinition,
    #[serde(default, rename = "triggerData")]
    pub trigger_data: Value,
    #[serde(default)]
    pub integrations: Option<Value>,
    #[serde(default, rename = "dbExecutionId")]
    pub db_execution_id: Option<String>,
}

/// `POST /api/v2/workflows` response body.
#[derive(Debug, Clone, Serialize)]
pub struct StartWorkflowResponse {
    #[serde(rename = "instanceId")]
    pub instance_id: String,
    #[serde(rename = "workflowId")]
    pub workflow_id: String,
    pub status: &'static str,
}

/// `GET /api/v2/workflows/{id}/status`, `GET /api/workflows/{id}/status`
/// response body.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatusResponse {
    #[serde(rename = "instanceId")]
    pub instance_id: String,
    #[serde(rename = "runtimeStatus")]
    pub runtime_status: RuntimeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "currentNodeId", skip_serializing_if = "Option::is_none")]
    pub current_node_id: Option<String>,
    #[serde(rename = "currentNodeName", skip_serializing_if = "Option::is_none")]
    pub current_node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `POST /api/v2/workflows/{id}/events` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RaiseEventRequest {
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(default, rename = "eventData")]
    pub event_data: Value,
}

/// `POST /api/workflows` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct StartPlannerRequest {
    pub feature_request: String,
    #[serde(default)]
    pub parent_execution_id: Option<String>,
}

/// `POST /api/workflows/{id}/approve` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub approved: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `GET /api/workflows` list item.
#[derive(Debug, Clone, Serialize)]
pub struct PlannerSummary {
    pub workflow_id: String,
    pub feature_request: String,
    pub runtime_status: RuntimeStatus,
}
