//! execute-action (spec §4.6).
//!
//! POSTs a resolved action node's config to the function-router's
//! `/execute` endpoint and returns its `{success, data, error, duration_ms,
//! pause?}` envelope.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{ActivityOutcome, ActivityResult, Activities};

#[derive(Debug, Serialize)]
struct ExecuteActionRequest<'a> {
    function_slug: &'a str,
    execution_id: &'a str,
    workflow_id: &'a str,
    node_id: &'a str,
    node_name: &'a str,
    input: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    integration_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    integrations: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_execution_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    connection_external_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_outputs: Option<&'a Value>,
}

pub struct ExecuteActionParams<'a> {
    pub action_type: &'a str,
    pub execution_id: &'a str,
    pub workflow_id: &'a str,
    pub node_id: &'a str,
    pub node_name: &'a str,
    pub input: &'a Value,
    pub integration_id: Option<&'a str>,
    pub integrations: Option<&'a Value>,
    pub db_execution_id: Option<&'a str>,
    pub connection_external_id: Option<&'a str>,
    pub node_outputs: Option<&'a Value>,
}

impl Activities {
    pub async fn execute_action(&self, params: ExecuteActionParams<'_>) -> ActivityResult<ActivityOutcome> {
        let url = self.config.function_router_invoke_url("/execute");
        let body = ExecuteActionRequest {
            function_slug: params.action_type,
            execution_id: params.execution_id,
            workflow_id: params.workflow_id,
            node_id: params.node_id,
            node_name: params.node_name,
            input: params.input,
            integration_id: params.integration_id,
            integrations: params.integrations,
            db_execution_id: params.db_execution_id,
            connection_external_id: params.connection_external_id,
            node_outputs: params.node_outputs,
        };
        debug!(node_id = params.node_id, action_type = params.action_type, "execute-action");
        let outcome: ActivityOutcome = self.http.post(url).json(&body).send().await?.json().await?;
        Ok(outcome)
    }
}
