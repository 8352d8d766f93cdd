//! publish-event / publish-phase-changed (spec §4.6).
//!
//! Publishes a CloudEvents-shaped payload to the configured pub/sub topic.
//! `workflow.stream` is additionally mirrored into the state store as an
//! append-only list capped at 500 entries (spec §6 "Pub/sub topics").

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{ActivityResult, Activities};

pub const TOPIC_WORKFLOW_STREAM: &str = "workflow.stream";
pub const TOPIC_WORKFLOW_EVENTS: &str = "workflow.events";

const STREAM_HISTORY_CAP: usize = 500;

#[derive(Debug, Serialize)]
struct CloudEvent<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    source: &'a str,
    data: &'a Value,
    time: String,
    specversion: &'static str,
    datacontenttype: &'static str,
    #[serde(rename = "workflowId")]
    workflow_id: &'a str,
}

impl Activities {
    /// Publish an arbitrary CloudEvent to `topic`.
    pub async fn publish_event(
        &self,
        topic: &str,
        event_type: &str,
        workflow_id: &str,
        data: &Value,
    ) -> ActivityResult<()> {
        let url = self.config.pubsub_publish_url(topic);
        let envelope = CloudEvent {
            event_type,
            source: "workflow-orchestrator",
            data,
            time: chrono::Utc::now().to_rfc3339(),
            specversion: "1.0",
            datacontenttype: "application/json",
            workflow_id,
        };
        debug!(topic, event_type, workflow_id, "publish-event");
        self.http.post(&url).json(&envelope).send().await?;
        Ok(())
    }

    /// Publish a `CustomStatus`-shaped progress event to `workflow.stream`
    /// and append it to the mirrored state-store history, capped at 500
    /// entries (spec §6).
    pub async fn publish_phase_changed(
        &self,
        workflow_id: &str,
        phase: &str,
        progress: u8,
        message: &str,
    ) -> ActivityResult<()> {
        let data = serde_json::json!({
            "phase": phase,
            "progress": progress,
            "message": message,
        });
        self.publish_event(TOPIC_WORKFLOW_STREAM, "phase_changed", workflow_id, &data)
            .await?;

        let key = format!("workflow-events-{}", workflow_id);
        let mut history: Vec<Value> = self.get_state(&key).await?.unwrap_or_default();
        history.push(data);
        if history.len() > STREAM_HISTORY_CAP {
            let excess = history.len() - STREAM_HISTORY_CAP;
            history.drain(0..excess);
        }
        self.set_state(&key, &serde_json::to_value(&history)?).await?;
        Ok(())
    }
}
