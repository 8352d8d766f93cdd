//! Stream event shape forwarded to connected WebSocket clients (spec §6
//! `GET /ws`): mirrors the CloudEvent payloads `Activities::publish_event`
//! publishes to `workflow.stream`, rather than modelling a parallel enum
//! of every possible event shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "workflowId")]
    pub workflow_id: String,
    pub data: Value,
    pub time: String,
}

impl StreamEvent {
    pub fn phase_changed(workflow_id: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: "phase_changed".to_string(),
            workflow_id: workflow_id.into(),
            data,
            time: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_changed_serializes_with_type_and_workflow_id() {
        let event = StreamEvent::phase_changed("wf-1", serde_json::json!({"phase": "planning"}));
        let json = event.to_json().unwrap();
        assert!(json.contains("phase_changed"));
        assert!(json.contains("wf-1"));
        assert!(json.contains("planning"));
    }
}
