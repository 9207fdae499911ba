//! Filter evaluation
//!
//! `evaluate(document, filter)` is a pure predicate. Filters that are not
//! objects, `$or` values that are not arrays, unknown operators and
//! operands of the wrong kind all evaluate to "no match".

use serde_json::{Map, Value};

use super::ordering::{compare_values, values_equal};
use super::wildcard::like;

/// Key that OR-combines an array of sub-filters
pub const OR_KEY: &str = "$or";

/// Operators accepted inside a field condition object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
    Like,
    In,
}

impl Operator {
    /// Look up an operator by its `$` key
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "$eq" => Some(Operator::Eq),
            "$gt" => Some(Operator::Gt),
            "$lt" => Some(Operator::Lt),
            "$like" => Some(Operator::Like),
            "$in" => Some(Operator::In),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Gt => "$gt",
            Operator::Lt => "$lt",
            Operator::Like => "$like",
            Operator::In => "$in",
        }
    }

    /// Apply this operator to a field value
    fn apply(&self, value: &Value, operand: &Value) -> bool {
        match self {
            Operator::Eq => values_equal(value, operand),
            Operator::Gt => compare_values(value, operand).is_gt(),
            Operator::Lt => compare_values(value, operand).is_lt(),
            Operator::Like => match (value, operand) {
                (Value::String(text), Value::String(pattern)) => like(text, pattern),
                _ => false,
            },
            Operator::In => match operand {
                Value::Array(candidates) => candidates.iter().any(|c| values_equal(value, c)),
                _ => false,
            },
        }
    }
}

/// Does `document` satisfy `filter`?
///
/// - `{"$or": [f1, f2, ...]}` matches if any sub-filter matches (`[]` never does)
/// - any other object matches if every field condition holds (`{}` always does)
/// - anything that is not an object never matches
pub fn evaluate(document: &Value, filter: &Value) -> bool {
    match document.as_object() {
        Some(fields) => evaluate_fields(fields, filter),
        None => evaluate_fields(&Map::new(), filter),
    }
}

/// `evaluate` over a document's field map
pub fn evaluate_fields(fields: &Map<String, Value>, filter: &Value) -> bool {
    let Some(conditions) = filter.as_object() else {
        return false;
    };

    if let Some(branches) = conditions.get(OR_KEY) {
        return match branches {
            Value::Array(branches) => branches.iter().any(|branch| evaluate_fields(fields, branch)),
            _ => false,
        };
    }

    conditions
        .iter()
        .all(|(field, condition)| check_condition(fields.get(field), condition))
}

/// Check one `field: condition` pair of a filter
///
/// A missing field never matches. An object condition is a set of
/// operators that must all hold; anything else is compared for equality.
pub fn evaluate_field(document: &Value, field: &str, condition: &Value) -> bool {
    check_condition(document.get(field), condition)
}

fn check_condition(value: Option<&Value>, condition: &Value) -> bool {
    let Some(value) = value else {
        return false;
    };

    match condition {
        Value::Object(operators) => operators.iter().all(|(key, operand)| {
            Operator::parse(key).is_some_and(|op| op.apply(value, operand))
        }),
        _ => values_equal(value, condition),
    }
}
