//! send-ap-callback / send-ap-step-update (spec §4.6).
//!
//! POSTs flow status to an external flow-run endpoint. Distinct from the
//! Dapr-mediated façades: the URL is supplied by the caller (taken from
//! the workflow's own config) rather than resolved against the Dapr
//! sidecar, since the flow-run endpoint lives outside the Dapr mesh.

use serde_json::Value;
use tracing::debug;

use super::{ActivityResult, Activities};

impl Activities {
    pub async fn send_ap_callback(&self, callback_url: &str, status: &Value) -> ActivityResult<()> {
        debug!(callback_url, "send-ap-callback");
        self.http.post(callback_url).json(status).send().await?;
        Ok(())
    }

    pub async fn send_ap_step_update(&self, callback_url: &str, step_id: &str, status: &Value) -> ActivityResult<()> {
        let body = serde_json::json!({ "step_id": step_id, "status": status });
        debug!(callback_url, step_id, "send-ap-step-update");
        self.http.post(callback_url).json(&body).send().await?;
        Ok(())
    }
}
