//! call-agent-run / call-durable-agent-run / call-mastra-agent-run /
//! call-planner-plan / call-planner-workflow / call-planner-continue /
//! call-planner-approve (spec §4.6).
//!
//! POSTs to the corresponding collaborator service and returns its
//! `{success, workflow_id, ...}` envelope verbatim as a `serde_json::Value`
//! — callers reach into the fields they need rather than this module
//! modelling every service's response shape.

use serde_json::Value;
use tracing::debug;

use super::{ActivityError, ActivityResult, Activities};

fn require_success(name: &str, body: Value) -> ActivityResult<Value> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("activity reported failure")
            .to_string();
        return Err(ActivityError::Failed { name: name.to_string(), message });
    }
    Ok(body)
}

impl Activities {
    async fn post_function_router(&self, name: &str, path: &str, body: &Value) -> ActivityResult<Value> {
        let url = self.config.function_router_invoke_url(path);
        debug!(name, path, "call-agent");
        let resp: Value = self.http.post(url).json(body).send().await?.json().await?;
        require_success(name, resp)
    }

    async fn post_planner(&self, name: &str, path: &str, body: &Value) -> ActivityResult<Value> {
        let url = self.config.planner_invoke_url(path);
        debug!(name, path, "call-planner");
        let resp: Value = self.http.post(url).json(body).send().await?.json().await?;
        require_success(name, resp)
    }

    pub async fn call_agent_run(&self, agent_id: &str, input: &Value) -> ActivityResult<Value> {
        self.post_function_router(
            "call-agent-run",
            "/agent-run",
            &serde_json::json!({ "agent_id": agent_id, "input": input }),
        )
        .await
    }

    pub async fn call_durable_agent_run(&self, agent_id: &str, input: &Value) -> ActivityResult<Value> {
        self.post_function_router(
            "call-durable-agent-run",
            "/durable-agent-run",
            &serde_json::json!({ "agent_id": agent_id, "input": input }),
        )
        .await
    }

    pub async fn call_mastra_agent_run(&self, agent_id: &str, input: &Value) -> ActivityResult<Value> {
        self.post_function_router(
            "call-mastra-agent-run",
            "/mastra-agent-run",
            &serde_json::json!({ "agent_id": agent_id, "input": input }),
        )
        .await
    }

    pub async fn call_planner_plan(&self, feature_request: &Value) -> ActivityResult<Value> {
        self.post_planner(
            "call-planner-plan",
            "/plan",
            &serde_json::json!({ "feature_request": feature_request }),
        )
        .await
    }

    /// Runs the execution phase of the Planner Workflow (spec §4.4 phase
    /// 4): hands the approved task list to the planner's execution agent.
    pub async fn call_planner_execute(&self, workflow_id: &str, tasks: &Value) -> ActivityResult<Value> {
        self.post_planner(
            "call-planner-execute",
            "/execute",
            &serde_json::json!({ "workflow_id": workflow_id, "tasks": tasks }),
        )
        .await
    }

    pub async fn call_planner_workflow(&self, feature_request: &Value, parent_execution_id: Option<&str>) -> ActivityResult<Value> {
        self.post_planner(
            "call-planner-workflow",
            "/workflow",
            &serde_json::json!({
                "feature_request": feature_request,
                "parent_execution_id": parent_execution_id,
            }),
        )
        .await
    }

    pub async fn call_planner_continue(&self, workflow_id: &str, event: &str, payload: &Value) -> ActivityResult<Value> {
        self.post_planner(
            "call-planner-continue",
            "/continue",
            &serde_json::json!({ "workflow_id": workflow_id, "event": event, "payload": payload }),
        )
        .await
    }

    pub async fn call_planner_approve(&self, workflow_id: &str, approved: bool, reason: Option<&str>) -> ActivityResult<Value> {
        self.post_planner(
            "call-planner-approve",
            "/approve",
            &serde_json::json!({ "workflow_id": workflow_id, "approved": approved, "reason": reason }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_success_passes_through_successful_body() {
        let body = serde_json::json!({"success": true, "workflow_id": "wf-1"});
        let result = require_success("call-agent-run", body.clone()).unwrap();
        assert_eq!(result, body);
    }

    #[test]
    fn require_success_rejects_failed_body() {
        let body = serde_json::json!({"success": false, "error": "boom"});
        let err = require_success("call-agent-run", body).unwrap_err();
        assert!(matches!(err, ActivityError::Failed { .. }));
    }
}
