//! Shape checks for the decoded status payload.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{json_type_name, PollError};

/// A payload that passed [`check_response`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponse {
    /// Submissions, newest first. Each element is a JSON object.
    pub homeworks: Vec<Map<String, Value>>,
    /// Server time to use as the next cursor, when supplied.
    pub current_date: Option<i64>,
}

impl StatusResponse {
    /// The most recent submission, if any.
    pub fn latest(&self) -> Option<&Map<String, Value>> {
        self.homeworks.first()
    }
}

/// Check that `payload` is an object with a `homeworks` list of objects.
///
/// Checks run in order and fail fast. With `require_current_date` the
/// payload must also carry an integer `current_date`; otherwise a missing
/// or malformed `current_date` is treated as absent.
pub fn check_response(payload: Value, require_current_date: bool) -> Result<StatusResponse, PollError> {
    let mut root = match payload {
        Value::Object(map) => map,
        other => {
            return Err(PollError::TypeMismatch {
                field: "response",
                expected: "object",
                found: json_type_name(&other),
            })
        }
    };

    let homeworks = match root.remove("homeworks") {
        None => return Err(PollError::MissingField { field: "homeworks" }),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(PollError::TypeMismatch {
                field: "homeworks",
                expected: "array",
                found: json_type_name(&other),
            })
        }
    };

    let homeworks = homeworks
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            other => Err(PollError::TypeMismatch {
                field: "homeworks[]",
                expected: "object",
                found: json_type_name(&other),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let current_date = match root.get("current_date") {
        Some(Value::Number(n)) if n.as_i64().is_some() => n.as_i64(),
        Some(other) if require_current_date => {
            return Err(PollError::TypeMismatch {
                field: "current_date",
                expected: "integer",
                found: json_type_name(other),
            })
        }
        None if require_current_date => {
            return Err(PollError::MissingField {
                field: "current_date",
            })
        }
        Some(other) => {
            warn!(value = %other, "ignoring non-integer current_date");
            None
        }
        None => None,
    };

    debug!(
        homeworks = homeworks.len(),
        ?current_date,
        "status response validated"
    );
    Ok(StatusResponse {
        homeworks,
        current_date,
    })
}
