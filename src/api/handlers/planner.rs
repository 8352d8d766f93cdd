//! Planner orchestrator HTTP surface (spec §6 "planner orchestrator"),
//! including the singular `/api/workflow/...` aliases spec.md names
//! alongside the plural routes.

use rand::distributions::Alphanumeric;
use rand::Rng;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use tracing::warn;

use crate::api::error::ApiResult;
use crate::api::models::{ApproveRequest, PlannerSummary, StartPlannerRequest, StartWorkflowResponse, WorkflowStatusResponse};
use crate::api::response;
use crate::api::routes::AppState;
use crate::model::PlannerInstance;
use crate::planner;

const WORKFLOW_INDEX_KEY: &str = "workflow_index";

fn new_workflow_id() -> String {
    let epoch_ms = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(7).map(char::from).collect();
    format!("planner-{}-{}", epoch_ms, suffix)
}

fn meta_key(workflow_id: &str) -> String {
    format!("planner-meta-{}", workflow_id)
}

/// `POST /api/workflows`, `POST /api/workflow`
pub async fn start(State(state): State<AppState>, Json(req): Json<StartPlannerRequest>) -> impl IntoResponse {
    let workflow_id = new_workflow_id();
    let instance = PlannerInstance {
        instance_id: workflow_id.clone(),
        feature_request: req.feature_request,
        parent_execution_id: req.parent_execution_id,
        tasks: vec![],
    };

    state.ctx.schedule(&workflow_id).await;

    if let Err(e) = state
        .activities
        .set_state(&meta_key(&workflow_id), &serde_json::json!({ "feature_request": instance.feature_request }))
        .await
    {
        warn!(error = %e, workflow_id, "failed to persist planner metadata");
    }

    let mut index: Vec<String> = state.activities.get_state(WORKFLOW_INDEX_KEY).await.unwrap_or_default().unwrap_or_default();
    index.push(workflow_id.clone());
    if let Ok(value) = serde_json::to_value(&index) {
        if let Err(e) = state.activities.set_state(WORKFLOW_INDEX_KEY, &value).await {
            warn!(error = %e, "failed to append to workflow index");
        }
    }

    let activities = state.activities.clone();
    let ctx = state.ctx.clone();
    tokio::spawn(async move {
        planner::run(&instance, &activities, ctx.as_ref()).await;
    });

    response::ok(StartWorkflowResponse {
        instance_id: workflow_id.clone(),
        workflow_id,
        status: "started",
    })
}

/// `GET /api/workflows`
pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let index: Vec<String> = state.activities.get_state(WORKFLOW_INDEX_KEY).await.unwrap_or_default().unwrap_or_default();

    let mut summaries = Vec::with_capacity(index.len());
    for workflow_id in index {
        let runtime_status = state
            .ctx
            .get_state(&workflow_id)
            .await
            .and_then(|snapshot| snapshot.runtime_status)
            .unwrap_or_default();

        let feature_request = state
            .activities
            .get_state::<Value>(&meta_key(&workflow_id))
            .await
            .ok()
            .flatten()
            .and_then(|meta| meta.get("feature_request").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();

        summaries.push(PlannerSummary { workflow_id, feature_request, runtime_status });
    }

    Ok(response::ok(summaries))
}

/// `POST /api/workflows/{id}/approve`, `POST /api/workflow/{id}/approve`
pub async fn approve(State(state): State<AppState>, Path(id): Path<String>, Json(req): Json<ApproveRequest>) -> impl IntoResponse {
    let event_name = format!("plan_approval_{}", id);
    state
        .ctx
        .raise_event(&id, &event_name, serde_json::json!({ "approved": req.approved, "reason": req.reason }))
        .await;
    response::ok(serde_json::json!({ "raised": true }))
}

/// `GET /api/workflows/{id}/status`, `GET /api/workflow/{id}/status`
pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let snapshot = state
        .ctx
        .get_state(&id)
        .await
        .ok_or_else(|| crate::api::error::ApiError::NotFound(format!("workflow {id} not found")))?;

    let (phase, progress, message, current_node_id, current_node_name) = match snapshot.custom_status {
        Some(cs) => (Some(cs.phase), Some(cs.progress), cs.message, cs.current_node_id, cs.current_node_name),
        None => (None, None, None, None, None),
    };

    Ok(response::ok(WorkflowStatusResponse {
        instance_id: id,
        runtime_status: snapshot.runtime_status.unwrap_or_default(),
        phase,
        progress,
        message,
        current_node_id,
        current_node_name,
        outputs: snapshot.outputs,
        error: snapshot.error,
    }))
}

/// `GET /api/workflows/{id}/tasks`, `GET /api/workflow/{id}/tasks`
pub async fn tasks(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let key = format!("tasks:{}", id);
    let tasks: Vec<Value> = state
        .activities
        .get_state(&key)
        .await
        .map_err(|e| crate::api::error::ApiError::InternalError(e.to_string()))?
        .unwrap_or_default();
    Ok(response::ok(serde_json::json!({ "workflowId": id, "tasks": tasks })))
}
