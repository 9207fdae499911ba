//! Value ordering
//!
//! Total order over `serde_json::Value`.
//!
//! Different kinds rank `null < bool < number < object < array < string`.
//! Within a kind: numbers numerically (so `25 == 25.0`), strings by bytes,
//! arrays element-wise then by length, objects by their key-sorted entries
//! then by length (key order never affects equality).

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

/// Compare two values under the total order described above
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => compare_arrays(a, b),
        (Value::Object(a), Value::Object(b)) => compare_objects(a, b),
        _ => kind_rank(left).cmp(&kind_rank(right)),
    }
}

/// Deep equality consistent with `compare_values`
pub fn values_equal(left: &Value, right: &Value) -> bool {
    compare_values(left, right) == Ordering::Equal
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::String(_) => 5,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    // Integers and floats are compared by exact value, never through a
    // lossy cast, so the order stays transitive past 2^53
    match (integer_value(a), integer_value(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_integer_float(x, b.as_f64().unwrap_or(f64::NAN)),
        (None, Some(y)) => compare_integer_float(y, a.as_f64().unwrap_or(f64::NAN)).reverse(),
        (None, None) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            if x == y {
                // 0.0 and -0.0 are the same number here
                Ordering::Equal
            } else {
                x.total_cmp(&y)
            }
        }
    }
}

fn integer_value(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison of an integer against a float
fn compare_integer_float(int: i128, float: f64) -> Ordering {
    const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127

    if float.is_nan() {
        return Ordering::Less;
    }
    if float >= I128_BOUND {
        return Ordering::Less;
    }
    if float < -I128_BOUND {
        return Ordering::Greater;
    }

    // |float - whole| < 1, so any integer other than `whole` sits on one side
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal if float > whole => Ordering::Less,
        Ordering::Equal if float < whole => Ordering::Greater,
        other => other,
    }
}

fn compare_arrays(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match compare_values(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn compare_objects(a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    let left = sorted_entries(a);
    let right = sorted_entries(b);

    for ((ka, va), (kb, vb)) in left.iter().zip(right.iter()) {
        match ka.cmp(kb).then_with(|| compare_values(va, vb)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    left.len().cmp(&right.len())
}

fn sorted_entries(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|x, y| x.0.cmp(y.0));
    entries
}
