//! Template Resolver (spec §4.2).
//!
//! Pure, recursive resolution of `{{id.path}}` placeholders against a
//! `NodeOutputs` map. Ported in spirit (not verbatim) from
//! `original_source/services/workflow-orchestrator/core/template_resolver.py`,
//! which is the authoritative source for the coercion rules spec.md states
//! only in prose: a string that is *exactly* one placeholder resolves with
//! its native type preserved; a string containing embedded placeholders
//! has each one stringified and substituted in place; everything else
//! passes through unchanged.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::model::NodeOutputs;

fn template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap())
}

/// `true` if `s` contains at least one `{{...}}` placeholder.
pub fn contains_templates(s: &str) -> bool {
    template_re().is_match(s)
}

/// Resolve a single `{{id.path}}` expression, stripped of its braces, against
/// `outputs`. Returns `None` when the node id or field path cannot be
/// resolved — callers fall back to the original placeholder text.
fn resolve_path(path: &str, outputs: &NodeOutputs) -> Option<Value> {
    let path = path.trim();
    let mut parts = path.split('.');
    let id = parts.next()?;
    let field_path: Vec<&str> = parts.collect();

    let output = lookup_node(id, outputs)?;
    let mut current = &output.data;
    for field in field_path {
        current = match current {
            Value::Object(map) => map.get(field)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

/// Resolve a node id by exact match, then by case-insensitive label with
/// spaces normalised to underscores (spec §4.2), and finally treating
/// `state`/`State` as interchangeable aliases for the reserved state node
/// (spec §9 open question (c)).
fn lookup_node<'a>(id: &str, outputs: &'a NodeOutputs) -> Option<&'a crate::model::NodeOutput> {
    if let Some(out) = outputs.get(id) {
        return Some(out);
    }
    if id.eq_ignore_ascii_case(crate::model::STATE_NODE_ID) {
        if let Some(out) = outputs.get(crate::model::STATE_NODE_ID) {
            return Some(out);
        }
    }
    let normalized = id.to_lowercase().replace(' ', "_");
    outputs.values().find(|out| {
        out.label.to_lowercase().replace(' ', "_") == normalized
    })
}

/// Resolve a whole string: if it is exactly one placeholder, return the
/// resolved value with its native type preserved (falling back to the
/// original string if unresolved); otherwise substitute every embedded
/// placeholder textually, stringifying each resolved value.
fn resolve_string(s: &str, outputs: &NodeOutputs) -> Value {
    if let Some(caps) = template_re().captures(s) {
        if caps.get(0).map(|m| m.as_str()) == Some(s.trim()) && s.trim() == s {
            let path = caps.get(1).unwrap().as_str();
            return resolve_path(path, outputs).unwrap_or_else(|| Value::String(s.to_string()));
        }
    }

    let mut result = String::new();
    let mut last_end = 0;
    for caps in template_re().captures_iter(s) {
        let m = caps.get(0).unwrap();
        let path = caps.get(1).unwrap().as_str();
        result.push_str(&s[last_end..m.start()]);
        match resolve_path(path, outputs) {
            Some(Value::String(v)) => result.push_str(&v),
            Some(other) => result.push_str(&stringify(&other)),
            None => result.push_str(m.as_str()),
        }
        last_end = m.end();
    }
    result.push_str(&s[last_end..]);
    Value::String(result)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Main recursive entrypoint: resolve every placeholder found anywhere in
/// `value` against `outputs`.
pub fn resolve(value: &Value, outputs: &NodeOutputs) -> Value {
    match value {
        Value::String(s) => {
            if contains_templates(s) {
                resolve_string(s, outputs)
            } else {
                value.clone()
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve(v, outputs)).collect()),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), resolve(v, outputs));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Resolve every string field of a JSON object (used for node `config`
/// maps), returning a new object.
pub fn resolve_object(
    config: &serde_json::Map<String, Value>,
    outputs: &NodeOutputs,
) -> serde_json::Map<String, Value> {
    match resolve(&Value::Object(config.clone()), outputs) {
        Value::Object(map) => map,
        _ => config.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeOutput;
    use serde_json::json;

    fn outputs_with(id: &str, label: &str, data: Value) -> NodeOutputs {
        let mut outputs = NodeOutputs::new();
        outputs.insert(id.to_string(), NodeOutput::new(label, data));
        outputs
    }

    #[test]
    fn whole_string_placeholder_preserves_native_type() {
        let outputs = outputs_with("T", "Trigger", json!({"name": "world", "count": 3}));
        let resolved = resolve(&json!("{{T.count}}"), &outputs);
        assert_eq!(resolved, json!(3));
    }

    #[test]
    fn embedded_placeholder_is_stringified() {
        let outputs = outputs_with("T", "Trigger", json!({"name": "world"}));
        let resolved = resolve(&json!("hello {{T.name}}!"), &outputs);
        assert_eq!(resolved, json!("hello world!"));
    }

    #[test]
    fn missing_path_preserves_original_placeholder() {
        let outputs = outputs_with("T", "Trigger", json!({"name": "world"}));
        let resolved = resolve(&json!("{{T.missing}}"), &outputs);
        assert_eq!(resolved, json!("{{T.missing}}"));
    }

    #[test]
    fn label_lookup_is_case_insensitive_with_underscore_normalisation() {
        let outputs = outputs_with("n1", "My Node", json!({"x": 1}));
        let resolved = resolve(&json!("{{my_node.x}}"), &outputs);
        assert_eq!(resolved, json!(1));
    }

    #[test]
    fn state_alias_is_case_insensitive() {
        let outputs = outputs_with("state", "state", json!({"k": "v"}));
        assert_eq!(resolve(&json!("{{State.k}}"), &outputs), json!("v"));
        assert_eq!(resolve(&json!("{{state.k}}"), &outputs), json!("v"));
    }

    #[test]
    fn recurses_into_arrays_and_objects() {
        let outputs = outputs_with("T", "Trigger", json!({"name": "world"}));
        let resolved = resolve(
            &json!({"list": ["{{T.name}}", "plain"], "nested": {"v": "{{T.name}}"}}),
            &outputs,
        );
        assert_eq!(
            resolved,
            json!({"list": ["world", "plain"], "nested": {"v": "world"}})
        );
    }

    #[test]
    fn non_template_string_passes_through() {
        let outputs = NodeOutputs::new();
        assert_eq!(resolve(&json!("plain text"), &outputs), json!("plain text"));
    }
}
