//! Data model for graph definitions and running instances (spec §3).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Reserved node id exposing `StateVars` to the template resolver.
///
/// Both `state` and `State` are treated as valid aliases (spec §9 open
/// question (c)): the reserved entry is always stored under the lowercase
/// key, and lookups normalise case before comparing against it.
pub const STATE_NODE_ID: &str = "state";

/// One vertex of a `GraphDefinition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

/// The closed set of node types a graph definition may use (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Trigger,
    Action,
    Activity,
    ApprovalGate,
    Timer,
    IfElse,
    LoopUntil,
    SetState,
    Transform,
    PublishEvent,
    Note,
    Condition,
}

/// A directed link between two nodes. `source_handle` carries the branch
/// label for if/else edges (`"true"`/`"false"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, rename = "sourceHandle")]
    pub source_handle: Option<String>,
}

/// A user-authored DAG for one execution. Immutable for the duration of a
/// run; `execution_order` is a topological linearisation of `nodes` (loop-
/// back edges are not part of its DAG view — spec §3 invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, rename = "executionOrder")]
    pub execution_order: Vec<String>,
}

impl GraphDefinition {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Index of edges keyed by source node id, grounded in the teacher's
    /// `find_next_nodes` edge-filtering pattern
    /// (`execution/workflow_engine.rs`).
    pub fn edges_by_source(&self) -> HashMap<&str, Vec<&Edge>> {
        let mut idx: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for edge in &self.edges {
            idx.entry(edge.source.as_str()).or_default().push(edge);
        }
        idx
    }

    /// Every node id reachable from `start` by following edges, used by the
    /// if/else skip-set computation (spec §4.1.5).
    pub fn reachable_from(&self, start: &str) -> HashSet<String> {
        let by_source = self.edges_by_source();
        let mut seen = HashSet::new();
        let mut stack = vec![start.to_string()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(edges) = by_source.get(id.as_str()) {
                for edge in edges {
                    if !seen.contains(&edge.target) {
                        stack.push(edge.target.clone());
                    }
                }
            }
        }
        seen
    }
}

/// The tagged shapes a node's `data` can take (spec §9 "Dynamic outputs as
/// a typed map"). `Raw` covers action/activity/agent results and anything
/// else passed through from an external façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeOutputData {
    Action(Value),
    Approval {
        approved: bool,
        reason: Option<String>,
        #[serde(rename = "respondedBy")]
        responded_by: Option<String>,
    },
    Loop {
        #[serde(rename = "conditionMet")]
        condition_met: bool,
        iteration: u32,
        #[serde(rename = "exceededMaxIterations", skip_serializing_if = "Option::is_none")]
        exceeded_max_iterations: Option<bool>,
        #[serde(rename = "exitedLoop", skip_serializing_if = "Option::is_none")]
        exited_loop: Option<bool>,
        #[serde(rename = "jumpToIndex", skip_serializing_if = "Option::is_none")]
        jump_to_index: Option<usize>,
    },
    Branch {
        #[serde(rename = "conditionMet")]
        condition_met: bool,
        branch: String,
        operator: String,
        #[serde(rename = "skippedNodeIds")]
        skipped_node_ids: Vec<String>,
    },
    State(Value),
    Skipped {
        skipped: bool,
        reason: String,
        #[serde(rename = "skippedBy", skip_serializing_if = "Option::is_none")]
        skipped_by: Option<String>,
        #[serde(rename = "branchTaken", skip_serializing_if = "Option::is_none")]
        branch_taken: Option<String>,
    },
    Raw(Value),
}

impl NodeOutputData {
    /// Flatten to a plain `Value` for template resolution and final
    /// `outputs` serialisation.
    pub fn as_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One entry in the `NodeOutputs` map: `{label, actionType, data}`
/// (spec §3 / §4.1.e).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOutput {
    pub label: String,
    #[serde(rename = "actionType", skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    pub data: Value,
}

impl NodeOutput {
    pub fn new(label: impl Into<String>, data: Value) -> Self {
        Self {
            label: label.into(),
            action_type: None,
            data,
        }
    }

    pub fn with_action_type(mut self, action_type: impl Into<String>) -> Self {
        self.action_type = Some(action_type.into());
        self
    }
}

/// Mapping from node id to its recorded output, seeded with `trigger` and
/// the reserved `state` entry (spec §4.1 step 1).
pub type NodeOutputs = HashMap<String, NodeOutput>;

/// Per-instance mutable key/value store exposed as the virtual `state`
/// node.
pub type StateVars = serde_json::Map<String, Value>;

/// Per-node completed-pass counts, keyed by loop node id.
pub type LoopCounters = HashMap<String, u32>;

/// Node ids deactivated by an if/else decision, mapped to the `(skippedBy,
/// branchTaken)` pair that caused the skip (spec §3/§4.1.b): the if/else
/// node's own id and the branch it actually took.
pub type SkipSet = HashMap<String, (String, String)>;

/// Coarse progress view of a running instance (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomStatus {
    pub phase: Phase,
    pub progress: u8,
    pub message: Option<String>,
    #[serde(rename = "currentNodeId")]
    pub current_node_id: Option<String>,
    #[serde(rename = "currentNodeName")]
    pub current_node_name: Option<String>,
    #[serde(rename = "approvalEventName", skip_serializing_if = "Option::is_none")]
    pub approval_event_name: Option<String>,
    #[serde(rename = "traceId", skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl CustomStatus {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            progress: 0,
            message: None,
            current_node_id: None,
            current_node_name: None,
            approval_event_name: None,
            trace_id: None,
        }
    }
}

/// Workflow lifecycle phase. Spec.md's prose only names the terminal subset
/// `{Completed, Failed, Rejected, TimedOut}`; the full 8-value set is a
/// supplement grounded in `original_source/.../core/types.py`'s
/// `WorkflowPhase` and in spec §5's discussion of external
/// terminate/suspend/resume (see SPEC_FULL.md §C.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    Running,
    AwaitingApproval,
    Completed,
    Failed,
    Rejected,
    TimedOut,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Completed | Phase::Failed | Phase::Rejected | Phase::TimedOut | Phase::Cancelled
        )
    }
}

/// Engine-reported runtime status for the HTTP status API (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeStatus {
    Pending,
    Running,
    Suspended,
    Completed,
    Failed,
    Terminated,
    Unknown,
}

impl Default for RuntimeStatus {
    fn default() -> Self {
        RuntimeStatus::Pending
    }
}

/// A running interpretation of one graph (spec §3 "Instance").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: String,
    pub definition: GraphDefinition,
    pub trigger_data: Value,
    #[serde(default)]
    pub integrations: Option<Value>,
    #[serde(default)]
    pub db_execution_id: Option<String>,
}

/// Final or in-flight result of interpreting one instance (spec §4.1
/// steps 3/4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicWorkflowOutput {
    pub success: bool,
    #[serde(default)]
    pub outputs: serde_json::Map<String, Value>,
    #[serde(default)]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub phase: Phase,
}

/// Sub-workflow for plan -> persist -> approve -> execute (spec §3
/// "PlannerInstance").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerInstance {
    pub instance_id: String,
    pub feature_request: String,
    #[serde(default)]
    pub parent_execution_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Value>,
}

/// Pub/sub message describing the terminal state of an agent or planner
/// child (spec §3 "CompletionEnvelope", §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEnvelope {
    #[serde(rename = "type")]
    pub envelope_type: String,
    #[serde(rename = "workflowId")]
    pub workflow_id: String,
    #[serde(default, rename = "agentId")]
    pub agent_id: Option<String>,
    pub data: CompletionData,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The `data` sub-object of a `CompletionEnvelope`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletionData {
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub parent_execution_id: Option<String>,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Value>,
    #[serde(default)]
    pub task_count: Option<u32>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, handle: Option<&str>) -> Edge {
        Edge {
            id: None,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: handle.map(|s| s.to_string()),
        }
    }

    fn node(id: &str, node_type: NodeType) -> Node {
        Node {
            id: id.to_string(),
            node_type,
            label: None,
            enabled: true,
            config: Default::default(),
        }
    }

    #[test]
    fn reachable_from_follows_edges_transitively() {
        let def = GraphDefinition {
            id: "d".into(),
            name: "d".into(),
            nodes: vec![
                node("A", NodeType::Action),
                node("B", NodeType::Action),
                node("C", NodeType::Action),
            ],
            edges: vec![edge("A", "B", None), edge("B", "C", None)],
            execution_order: vec!["A".into(), "B".into(), "C".into()],
        };
        let reachable = def.reachable_from("A");
        assert!(reachable.contains("A"));
        assert!(reachable.contains("B"));
        assert!(reachable.contains("C"));
    }

    #[test]
    fn reachable_from_does_not_cross_unrelated_branches() {
        let def = GraphDefinition {
            id: "d".into(),
            name: "d".into(),
            nodes: vec![
                node("I", NodeType::IfElse),
                node("U", NodeType::Action),
                node("W", NodeType::Action),
            ],
            edges: vec![edge("I", "U", Some("true")), edge("I", "W", Some("false"))],
            execution_order: vec!["I".into(), "U".into(), "W".into()],
        };
        let from_true = def.reachable_from("U");
        assert!(!from_true.contains("W"));
    }

    #[test]
    fn phase_terminal_classification() {
        assert!(Phase::Completed.is_terminal());
        assert!(Phase::Rejected.is_terminal());
        assert!(!Phase::Running.is_terminal());
        assert!(!Phase::AwaitingApproval.is_terminal());
    }
}
