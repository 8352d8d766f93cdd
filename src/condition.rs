//! Condition Evaluator (spec §4.3).
//!
//! Ported in spirit from
//! `original_source/services/workflow-orchestrator/core/ap_condition_evaluator.py`
//! ("Ported from packages/engine/src/lib/handler/router-executor.ts" per its
//! own header), which is the authoritative source for the coercion and
//! short-circuit rules spec.md only summarises.

use serde_json::Value;

/// One typed comparison, e.g. `{operator: "TEXT_CONTAINS", firstValue: ..,
/// secondValue: ..}`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub operator: Operator,
    pub first_value: Value,
    pub second_value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    TextContains,
    TextDoesNotContain,
    TextExactlyMatches,
    TextDoesNotExactlyMatch,
    TextStartsWith,
    TextDoesNotStartWith,
    TextEndsWith,
    TextDoesNotEndWith,
    TextIsEmpty,
    TextIsNotEmpty,
    NumberIsGreaterThan,
    NumberIsLessThan,
    NumberIsEqualTo,
    BooleanIsTrue,
    BooleanIsFalse,
    Exists,
    DoesNotExist,
    ListContains,
    ListDoesNotContain,
    ListIsEmpty,
    ListIsNotEmpty,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        use Operator::*;
        Some(match s {
            "TEXT_CONTAINS" => TextContains,
            "TEXT_DOES_NOT_CONTAIN" => TextDoesNotContain,
            "TEXT_EXACTLY_MATCHES" => TextExactlyMatches,
            "TEXT_DOES_NOT_EXACTLY_MATCH" => TextDoesNotExactlyMatch,
            "TEXT_STARTS_WITH" => TextStartsWith,
            "TEXT_DOES_NOT_START_WITH" => TextDoesNotStartWith,
            "TEXT_ENDS_WITH" => TextEndsWith,
            "TEXT_DOES_NOT_END_WITH" => TextDoesNotEndWith,
            "TEXT_IS_EMPTY" => TextIsEmpty,
            "TEXT_IS_NOT_EMPTY" => TextIsNotEmpty,
            "NUMBER_IS_GREATER_THAN" => NumberIsGreaterThan,
            "NUMBER_IS_LESS_THAN" => NumberIsLessThan,
            "NUMBER_IS_EQUAL_TO" => NumberIsEqualTo,
            "BOOLEAN_IS_TRUE" => BooleanIsTrue,
            "BOOLEAN_IS_FALSE" => BooleanIsFalse,
            "EXISTS" => Exists,
            "DOES_NOT_EXIST" => DoesNotExist,
            "LIST_CONTAINS" => ListContains,
            "LIST_DOES_NOT_CONTAIN" => ListDoesNotContain,
            "LIST_IS_EMPTY" => ListIsEmpty,
            "LIST_IS_NOT_EMPTY" => ListIsNotEmpty,
            _ => return None,
        })
    }
}

/// Best-effort string coercion: `null` becomes `""`, matching the
/// original's `str(value or '')`.
fn as_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON-level falsiness, matching the original's bare `not value` /
/// `bool(value)` checks: `null`, `false`, `0`, `""`, `[]`, and `{}` are all
/// falsy, everything else is truthy.
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Numeric coercion that silently yields `0.0` on failure (spec §4.3).
fn as_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Tri-state boolean coercion: `true/1/yes` -> `Some(true)`,
/// `false/0/no` -> `Some(false)` (case-insensitive), else `None`.
fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => {
            let lower = s.to_lowercase();
            if ["true", "1", "yes"].contains(&lower.as_str()) {
                Some(true)
            } else if ["false", "0", "no"].contains(&lower.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Evaluate a single typed comparison. Any internal conversion error
/// yields `false` (spec §4.3).
pub fn evaluate_single(condition: &Condition) -> bool {
    use Operator::*;
    let first = &condition.first_value;
    let second = &condition.second_value;

    match condition.operator {
        TextContains => as_text(first).contains(&as_text(second)),
        TextDoesNotContain => !as_text(first).contains(&as_text(second)),
        TextExactlyMatches => as_text(first) == as_text(second),
        TextDoesNotExactlyMatch => as_text(first) != as_text(second),
        TextStartsWith => as_text(first).starts_with(&as_text(second)),
        TextDoesNotStartWith => !as_text(first).starts_with(&as_text(second)),
        TextEndsWith => as_text(first).ends_with(&as_text(second)),
        TextDoesNotEndWith => !as_text(first).ends_with(&as_text(second)),
        TextIsEmpty => is_falsy(first) || as_text(first).trim().is_empty(),
        TextIsNotEmpty => !is_falsy(first) && !as_text(first).trim().is_empty(),
        NumberIsGreaterThan => as_number(first) > as_number(second),
        NumberIsLessThan => as_number(first) < as_number(second),
        NumberIsEqualTo => as_number(first) == as_number(second),
        BooleanIsTrue => as_bool(first) == Some(true),
        BooleanIsFalse => as_bool(first) == Some(false),
        Exists => !first.is_null(),
        DoesNotExist => first.is_null(),
        ListContains => match first {
            Value::Array(items) => items.contains(second),
            _ => false,
        },
        ListDoesNotContain => match first {
            Value::Array(items) => !items.contains(second),
            // Asymmetric by design (ported from the original): a
            // non-list `first_value` makes "does not contain" vacuously
            // true.
            _ => true,
        },
        ListIsEmpty => is_falsy(first) || matches!(first, Value::Array(items) if items.is_empty()),
        ListIsNotEmpty => match first {
            Value::Array(items) => !items.is_empty(),
            _ => false,
        },
    }
}

/// OR-of-ANDs evaluation over a two-level condition tree (spec §4.3 /
/// §8 "Condition OR-of-AND"). An empty outer list is `false`.
pub fn evaluate_conditions(groups: &[Vec<Condition>]) -> bool {
    groups.iter().any(|group| group.iter().all(evaluate_single))
}

/// A branch in an if/else-style branch set: either a normal condition
/// group or a `Fallback`, which is true iff every other branch is false
/// (spec §4.3 "Branch-evaluator extension").
#[derive(Debug, Clone)]
pub enum Branch {
    Conditions(Vec<Vec<Condition>>),
    Fallback,
}

/// Evaluate a list of branches, two passes: first every non-fallback
/// branch, then every fallback branch against the others' results.
pub fn evaluate_branches(branches: &[Branch]) -> Vec<bool> {
    let mut raw: Vec<Option<bool>> = branches
        .iter()
        .map(|b| match b {
            Branch::Conditions(groups) => Some(evaluate_conditions(groups)),
            Branch::Fallback => None,
        })
        .collect();

    for i in 0..raw.len() {
        if raw[i].is_none() {
            let all_others_false = raw
                .iter()
                .enumerate()
                .all(|(j, v)| j == i || v != Some(true));
            raw[i] = Some(all_others_false);
        }
    }

    raw.into_iter().map(|v| v.unwrap_or(false)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(op: &str, first: Value, second: Value) -> Condition {
        Condition {
            operator: Operator::parse(op).unwrap(),
            first_value: first,
            second_value: second,
        }
    }

    #[test]
    fn or_of_ands_matches_truth_table() {
        // evaluate([[A,B],[C]]) == (A && B) || C
        let a_true_b_true = vec![vec![
            cond("BOOLEAN_IS_TRUE", json!(true), Value::Null),
            cond("BOOLEAN_IS_TRUE", json!(true), Value::Null),
        ]];
        assert!(evaluate_conditions(&a_true_b_true));

        let a_true_b_false = vec![vec![
            cond("BOOLEAN_IS_TRUE", json!(true), Value::Null),
            cond("BOOLEAN_IS_TRUE", json!(false), Value::Null),
        ]];
        assert!(!evaluate_conditions(&a_true_b_false));

        let c_true_fallback = vec![
            vec![cond("BOOLEAN_IS_TRUE", json!(false), Value::Null)],
            vec![cond("BOOLEAN_IS_TRUE", json!(true), Value::Null)],
        ];
        assert!(evaluate_conditions(&c_true_fallback));
    }

    #[test]
    fn empty_outer_list_is_false() {
        assert!(!evaluate_conditions(&[]));
    }

    #[test]
    fn fallback_branch_true_iff_all_others_false() {
        let branches = vec![
            Branch::Conditions(vec![vec![cond("BOOLEAN_IS_TRUE", json!(false), Value::Null)]]),
            Branch::Conditions(vec![vec![cond("BOOLEAN_IS_TRUE", json!(false), Value::Null)]]),
            Branch::Fallback,
        ];
        assert_eq!(evaluate_branches(&branches), vec![false, false, true]);

        let branches = vec![
            Branch::Conditions(vec![vec![cond("BOOLEAN_IS_TRUE", json!(true), Value::Null)]]),
            Branch::Fallback,
        ];
        assert_eq!(evaluate_branches(&branches), vec![true, false]);
    }

    #[test]
    fn numeric_coercion_defaults_missing_to_zero() {
        let c = cond("NUMBER_IS_EQUAL_TO", Value::Null, json!(0));
        assert!(evaluate_single(&c));
    }

    #[test]
    fn boolean_coercion_recognises_common_strings() {
        assert!(as_bool(&json!("yes")) == Some(true));
        assert!(as_bool(&json!("NO")) == Some(false));
        assert!(as_bool(&json!("1")) == Some(true));
        assert!(as_bool(&json!("maybe")).is_none());
    }

    #[test]
    fn list_does_not_contain_is_true_for_non_list_first_value() {
        let c = cond("LIST_DOES_NOT_CONTAIN", json!("not a list"), json!("x"));
        assert!(evaluate_single(&c));
    }

    #[test]
    fn text_is_empty_treats_falsy_numbers_and_booleans_as_empty() {
        assert!(evaluate_single(&cond("TEXT_IS_EMPTY", json!(0), Value::Null)));
        assert!(evaluate_single(&cond("TEXT_IS_EMPTY", json!(false), Value::Null)));
        assert!(!evaluate_single(&cond("TEXT_IS_NOT_EMPTY", json!(0), Value::Null)));
        assert!(evaluate_single(&cond("TEXT_IS_NOT_EMPTY", json!("hi"), Value::Null)));
    }

    #[test]
    fn list_is_empty_treats_falsy_non_list_scalars_as_empty() {
        assert!(evaluate_single(&cond("LIST_IS_EMPTY", json!(0), Value::Null)));
        assert!(evaluate_single(&cond("LIST_IS_EMPTY", Value::Null, Value::Null)));
        assert!(evaluate_single(&cond("LIST_IS_EMPTY", json!([]), Value::Null)));
        assert!(!evaluate_single(&cond("LIST_IS_EMPTY", json!([1]), Value::Null)));
        assert!(!evaluate_single(&cond("LIST_IS_EMPTY", json!("not empty"), Value::Null)));
    }

    #[test]
    fn number_greater_than() {
        let c = cond("NUMBER_IS_GREATER_THAN", json!(20), json!(10));
        assert!(evaluate_single(&c));
        let c = cond("NUMBER_IS_GREATER_THAN", json!(0), json!(10));
        assert!(!evaluate_single(&c));
    }
}
