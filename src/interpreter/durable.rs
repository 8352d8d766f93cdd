//! Façade over the durable-task engine, which spec.md places out of scope
//! (§1: "the durable-task engine itself ... Assume a provider that
//! exposes: `schedule`, `raiseEvent`, `getState`, `terminate/suspend/
//! resume/purge`, and, inside workflow bodies, `callActivity`,
//! `createTimer`, `waitForExternalEvent`, `whenAny`").
//!
//! `call_activity` needs no separate primitive here: it is just an
//! ordinary `.await` against [`crate::activities::Activities`]. The rest
//! of this trait is the suspension/lifecycle surface the Interpreter and
//! Planner Workflow actually call into. [`InProcessDurableContext`] is a
//! reference implementation good enough to run both workflow bodies
//! end-to-end in one process; it does not checkpoint or survive a
//! restart, which a production durable-task provider would.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex, RwLock};

use crate::model::{CustomStatus, RuntimeStatus};

/// Outcome of a `whenAny(waitForExternalEvent(name), createTimer(d))` race
/// (spec §4.1.2/.3/.4, §5 "the first to resolve wins").
#[derive(Debug, Clone)]
pub enum WhenAnyOutcome {
    Event(Value),
    TimedOut,
}

/// Snapshot returned by `getState`, backing the `GET .../status` endpoint
/// (spec §6).
#[derive(Debug, Clone, Default)]
pub struct InstanceSnapshot {
    pub runtime_status: Option<RuntimeStatus>,
    pub custom_status: Option<CustomStatus>,
    pub outputs: Option<Value>,
    pub error: Option<String>,
}

#[async_trait]
pub trait DurableContext: Send + Sync {
    /// Register a new instance in the engine's bookkeeping (`PENDING`).
    /// The actual workflow body is started separately by the caller
    /// (the API layer `tokio::spawn`s the interpreter or planner body);
    /// this method only makes the instance visible to `get_state`.
    async fn schedule(&self, instance_id: &str);

    async fn raise_event(&self, instance_id: &str, name: &str, data: Value);
    async fn get_state(&self, instance_id: &str) -> Option<InstanceSnapshot>;
    async fn terminate(&self, instance_id: &str);
    async fn suspend(&self, instance_id: &str);
    async fn resume(&self, instance_id: &str);
    async fn purge(&self, instance_id: &str);

    async fn set_custom_status(&self, instance_id: &str, status: CustomStatus);
    async fn set_runtime_status(&self, instance_id: &str, status: RuntimeStatus);
    async fn set_outputs(&self, instance_id: &str, outputs: Value);
    async fn set_error(&self, instance_id: &str, error: String);

    async fn create_timer(&self, duration: Duration);
    async fn wait_for_external_event(&self, instance_id: &str, name: &str) -> Value;
    async fn when_any(&self, instance_id: &str, name: &str, timeout: Duration) -> WhenAnyOutcome;
}

#[derive(Default)]
struct InstanceRecord {
    runtime_status: RuntimeStatus,
    custom_status: Option<CustomStatus>,
    outputs: Option<Value>,
    error: Option<String>,
    suspended: bool,
}

type EventKey = (String, String);

/// In-process `DurableContext`: an `RwLock`-guarded instance table plus a
/// `oneshot`-backed waiter registry for external events, grounded in the
/// teacher's `ExecutionStreamHandler` sender/receiver-pair convention
/// (`execution/streaming.rs`) generalised from one mpsc stream per task to
/// one oneshot waiter per `(instanceId, eventName)`.
#[derive(Default)]
pub struct InProcessDurableContext {
    instances: RwLock<HashMap<String, InstanceRecord>>,
    waiters: Mutex<HashMap<EventKey, Vec<oneshot::Sender<Value>>>>,
    pending_events: Mutex<HashMap<EventKey, Vec<Value>>>,
    queued_while_suspended: Mutex<HashMap<String, Vec<(String, Value)>>>,
}

impl InProcessDurableContext {
    pub fn new() -> Self {
        Self::default()
    }

    async fn deliver(&self, instance_id: &str, name: &str, data: Value) {
        let key = (instance_id.to_string(), name.to_string());
        let waiting = {
            let mut waiters = self.waiters.lock().await;
            waiters.get_mut(&key).filter(|v| !v.is_empty()).map(|v| v.remove(0))
        };
        match waiting {
            Some(tx) => {
                let _ = tx.send(data);
            }
            None => {
                self.pending_events.lock().await.entry(key).or_default().push(data);
            }
        }
    }
}

#[async_trait]
impl DurableContext for InProcessDurableContext {
    async fn schedule(&self, instance_id: &str) {
        self.instances
            .write()
            .await
            .insert(instance_id.to_string(), InstanceRecord::default());
    }

    async fn raise_event(&self, instance_id: &str, name: &str, data: Value) {
        let suspended = self
            .instances
            .read()
            .await
            .get(instance_id)
            .map(|r| r.suspended)
            .unwrap_or(false);

        if suspended {
            self.queued_while_suspended
                .lock()
                .await
                .entry(instance_id.to_string())
                .or_default()
                .push((name.to_string(), data));
            return;
        }
        self.deliver(instance_id, name, data).await;
    }

    async fn get_state(&self, instance_id: &str) -> Option<InstanceSnapshot> {
        let instances = self.instances.read().await;
        instances.get(instance_id).map(|r| InstanceSnapshot {
            runtime_status: Some(r.runtime_status),
            custom_status: r.custom_status.clone(),
            outputs: r.outputs.clone(),
            error: r.error.clone(),
        })
    }

    async fn terminate(&self, instance_id: &str) {
        if let Some(rec) = self.instances.write().await.get_mut(instance_id) {
            rec.runtime_status = RuntimeStatus::Terminated;
        }
    }

    async fn suspend(&self, instance_id: &str) {
        if let Some(rec) = self.instances.write().await.get_mut(instance_id) {
            rec.suspended = true;
            rec.runtime_status = RuntimeStatus::Suspended;
        }
    }

    async fn resume(&self, instance_id: &str) {
        if let Some(rec) = self.instances.write().await.get_mut(instance_id) {
            rec.suspended = false;
            rec.runtime_status = RuntimeStatus::Running;
        }
        let queued = self
            .queued_while_suspended
            .lock()
            .await
            .remove(instance_id)
            .unwrap_or_default();
        for (name, data) in queued {
            self.deliver(instance_id, &name, data).await;
        }
    }

    async fn purge(&self, instance_id: &str) {
        self.instances.write().await.remove(instance_id);
        self.queued_while_suspended.lock().await.remove(instance_id);
        self.pending_events.lock().await.retain(|(id, _), _| id != instance_id);
        self.waiters.lock().await.retain(|(id, _), _| id != instance_id);
    }

    async fn set_custom_status(&self, instance_id: &str, status: CustomStatus) {
        self.instances
            .write()
            .await
            .entry(instance_id.to_string())
            .or_default()
            .custom_status = Some(status);
    }

    async fn set_runtime_status(&self, instance_id: &str, status: RuntimeStatus) {
        self.instances
            .write()
            .await
            .entry(instance_id.to_string())
            .or_default()
            .runtime_status = status;
    }

    async fn set_outputs(&self, instance_id: &str, outputs: Value) {
        self.instances
            .write()
            .await
            .entry(instance_id.to_string())
            .or_default()
            .outputs = Some(outputs);
    }

    async fn set_error(&self, instance_id: &str, error: String) {
        self.instances
            .write()
            .await
            .entry(instance_id.to_string())
            .or_default()
            .error = Some(error);
    }

    async fn create_timer(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn wait_for_external_event(&self, instance_id: &str, name: &str) -> Value {
        let key = (instance_id.to_string(), name.to_string());
        let already_arrived = {
            let mut pending = self.pending_events.lock().await;
            pending.get_mut(&key).filter(|q| !q.is_empty()).map(|q| q.remove(0))
        };
        if let Some(v) = already_arrived {
            return v;
        }

        let (tx, rx) = oneshot::channel();
        self.waiters.lock().await.entry(key).or_default().push(tx);
        rx.await.unwrap_or(Value::Null)
    }

    async fn when_any(&self, instance_id: &str, name: &str, timeout: Duration) -> WhenAnyOutcome {
        tokio::select! {
            data = self.wait_for_external_event(instance_id, name) => WhenAnyOutcome::Event(data),
            _ = tokio::time::sleep(timeout) => WhenAnyOutcome::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn event_raised_after_wait_is_delivered() {
        let ctx = Arc::new(InProcessDurableContext::new());
        ctx.schedule("i1").await;

        let waiter_ctx = ctx.clone();
        let handle = tokio::spawn(async move { waiter_ctx.wait_for_external_event("i1", "go").await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.raise_event("i1", "go", serde_json::json!({"approved": true})).await;

        let result = handle.await.unwrap();
        assert_eq!(result, serde_json::json!({"approved": true}));
    }

    #[tokio::test]
    async fn event_raised_before_wait_is_still_delivered() {
        let ctx = InProcessDurableContext::new();
        ctx.schedule("i1").await;
        ctx.raise_event("i1", "go", serde_json::json!(1)).await;
        let result = ctx.wait_for_external_event("i1", "go").await;
        assert_eq!(result, serde_json::json!(1));
    }

    #[tokio::test]
    async fn when_any_times_out_without_an_event() {
        let ctx = InProcessDurableContext::new();
        ctx.schedule("i1").await;
        let outcome = ctx.when_any("i1", "never", Duration::from_millis(5)).await;
        assert!(matches!(outcome, WhenAnyOutcome::TimedOut));
    }

    #[tokio::test]
    async fn events_raised_while_suspended_are_queued_until_resume() {
        let ctx = Arc::new(InProcessDurableContext::new());
        ctx.schedule("i1").await;
        ctx.suspend("i1").await;
        ctx.raise_event("i1", "go", serde_json::json!("hi")).await;

        let waiter_ctx = ctx.clone();
        let handle = tokio::spawn(async move { waiter_ctx.wait_for_external_event("i1", "go").await });

        // Not yet delivered: still queued behind suspension.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_finished());

        ctx.resume("i1").await;
        let result = handle.await.unwrap();
        assert_eq!(result, serde_json::json!("hi"));
    }
}
