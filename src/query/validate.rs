//! Filter validation at the command boundary
//!
//! The evaluator treats malformed conditions as "no match". Commands coming
//! from clients are checked first so a typo such as `$gte` is reported
//! instead of quietly returning nothing.

use serde_json::Value;

use super::evaluator::{Operator, OR_KEY};
use crate::error::{NestError, Result};

/// Reject filters with unknown operators or mistyped operands
///
/// Non-object filters are accepted: they are valid input that matches nothing.
pub fn validate(filter: &Value) -> Result<()> {
    let Some(conditions) = filter.as_object() else {
        return Ok(());
    };

    for (field, condition) in conditions {
        if field == OR_KEY {
            let branches = condition.as_array().ok_or_else(|| {
                NestError::Parse(format!("{OR_KEY} expects an array of filters"))
            })?;
            for branch in branches {
                validate(branch)?;
            }
            continue;
        }

        let Value::Object(operators) = condition else {
            continue;
        };
        for (key, operand) in operators {
            match Operator::parse(key) {
                None => {
                    return Err(NestError::UnknownOperator(format!(
                        "{key} (in condition on '{field}')"
                    )))
                }
                Some(Operator::Like) if !operand.is_string() => {
                    return Err(NestError::Parse(format!(
                        "$like on '{field}' expects a string pattern"
                    )))
                }
                Some(Operator::In) if !operand.is_array() => {
                    return Err(NestError::Parse(format!(
                        "$in on '{field}' expects an array"
                    )))
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}
