//! Dynamic orchestrator HTTP surface (spec §6 "dynamic orchestrator").
//!
//! Every handler here is fire-and-forget: it registers the instance with
//! the durable context, spawns the Interpreter body, and returns
//! `status:"started"` immediately. The spawned body itself writes all
//! terminal state through `ctx.set_*`, so nothing here waits on it.

use rand::distributions::Alphanumeric;
use rand::Rng;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{RaiseEventRequest, StartWorkflowRequest, StartWorkflowResponse, WorkflowStatusResponse};
use crate::api::response;
use crate::api::routes::AppState;
use crate::interpreter;
use crate::model::Instance;

fn new_instance_id(definition_id: &str) -> String {
    let epoch_ms = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(7).map(char::from).collect();
    format!("{}-{}-{}", definition_id, epoch_ms, suffix)
}

/// `POST /api/v2/workflows`
pub async fn start(State(state): State<AppState>, Json(req): Json<StartWorkflowRequest>) -> impl IntoResponse {
    let instance_id = new_instance_id(&req.definition.id);
    let instance = Instance {
        instance_id: instance_id.clone(),
        definition: req.definition,
        trigger_data: req.trigger_data,
        integrations: req.integrations,
        db_execution_id: req.db_execution_id,
    };

    state.ctx.schedule(&instance_id).await;

    let activities = state.activities.clone();
    let ctx = state.ctx.clone();
    tokio::spawn(async move {
        interpreter::run(&instance, &activities, ctx.as_ref()).await;
    });

    response::ok(StartWorkflowResponse {
        instance_id: instance_id.clone(),
        workflow_id: instance_id,
        status: "started",
    })
}

/// `GET /api/v2/workflows/{id}/status`
pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let snapshot = state
        .ctx
        .get_state(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("workflow {id} not found")))?;

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

/// `POST /api/v2/workflows/{id}/events`
pub async fn raise_event(State(state): State<AppState>, Path(id): Path<String>, Json(req): Json<RaiseEventRequest>) -> impl IntoResponse {
    state.ctx.raise_event(&id, &req.event_name, req.event_data).await;
    response::ok(serde_json::json!({ "raised": true }))
}

/// `POST /api/v2/workflows/{id}/terminate`
pub async fn terminate(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    state.ctx.terminate(&id).await;
    response::accepted(serde_json::json!({ "instanceId": id, "action": "terminate" }))
}

/// `POST /api/v2/workflows/{id}/pause`
pub async fn pause(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    state.ctx.suspend(&id).await;
    response::accepted(serde_json::json!({ "instanceId": id, "action": "pause" }))
}

/// `POST /api/v2/workflows/{id}/resume`
pub async fn resume(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    state.ctx.resume(&id).await;
    response::accepted(serde_json::json!({ "instanceId": id, "action": "resume" }))
}

/// `DELETE /api/v2/workflows/{id}`
pub async fn purge(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    state.ctx.purge(&id).await;
    response::no_content()
}
