//! Student patch operations.
//!
//! # Responsibility
//! - Decode wire operations (`{op, field, value}`) into a closed set of typed
//!   operations.
//! - Apply a decoded sequence through the student repository.
//!
//! # Invariants
//! - Only `replace` exists; only `firstname`, `lastname` and `birthdate` may be
//!   replaced.
//! - A sequence is decoded completely before the first write.

use crate::model::student::{StudentField, StudentFieldUpdate};
use crate::validation::parse_date;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

mod processor;

pub use processor::{ProcessError, StudentOperationProcessor};

/// Wire name of the replace operation.
pub const REPLACE_OPERATION: &str = "replace";

/// One operation as received from a caller, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub op: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl OperationRequest {
    /// Convenience constructor for a `replace` request.
    pub fn replace(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: REPLACE_OPERATION.to_string(),
            field: Some(field.into()),
            value: value.into(),
        }
    }
}

/// Rejection of an operation; the message names the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Operation {0} does not exist")]
    UnknownOperation(String),
    #[error("Not allowed to update {0} field")]
    FieldNotAllowed(String),
    #[error("Invalid value for {0} field")]
    InvalidValue(StudentField),
}

/// A validated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Replace(StudentFieldUpdate),
}

impl TryFrom<&OperationRequest> for Operation {
    type Error = OperationError;

    fn try_from(request: &OperationRequest) -> Result<Self, Self::Error> {
        match request.op.as_str() {
            REPLACE_OPERATION => decode_replace(request).map(Operation::Replace),
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

/// Decodes a whole sequence, stopping at the first invalid operation.
pub fn decode_operations(requests: &[OperationRequest]) -> Result<Vec<Operation>, OperationError> {
    requests.iter().map(Operation::try_from).collect()
}

fn decode_replace(request: &OperationRequest) -> Result<StudentFieldUpdate, OperationError> {
    let name = request.field.as_deref().unwrap_or_default();
    let field = StudentField::from_name(name)
        .ok_or_else(|| OperationError::FieldNotAllowed(name.to_string()))?;

    let text = request
        .value
        .as_str()
        .filter(|text| !text.trim().is_empty())
        .ok_or(OperationError::InvalidValue(field))?;

    match field {
        StudentField::Firstname => Ok(StudentFieldUpdate::Firstname(text.to_string())),
        StudentField::Lastname => Ok(StudentFieldUpdate::Lastname(text.to_string())),
        StudentField::Birthdate => parse_date(text)
            .map(StudentFieldUpdate::Birthdate)
            .ok_or(OperationError::InvalidValue(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_operations, Operation, OperationError, OperationRequest};
    use crate::model::student::{StudentField, StudentFieldUpdate};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn decodes_replace_operations_from_wire_json() {
        let requests: Vec<OperationRequest> = serde_json::from_value(json!([
            {"op": "replace", "field": "firstname", "value": "Ada"},
            {"op": "replace", "field": "birthdate", "value": "2001-04-09"}
        ]))
        .unwrap();

        let operations = decode_operations(&requests).unwrap();
        assert_eq!(
            operations,
            vec![
                Operation::Replace(StudentFieldUpdate::Firstname("Ada".to_string())),
                Operation::Replace(StudentFieldUpdate::Birthdate(
                    NaiveDate::from_ymd_opt(2001, 4, 9).unwrap()
                )),
            ]
        );
    }

    #[test]
    fn unknown_kind_is_named_in_the_error() {
        let request: OperationRequest = serde_json::from_value(json!({"op": "attach"})).unwrap();
        let err = Operation::try_from(&request).unwrap_err();
        assert_eq!(err.to_string(), "Operation attach does not exist");
    }

    #[test]
    fn field_outside_whitelist_is_named_in_the_error() {
        let err = Operation::try_from(&OperationRequest::replace("email", "x")).unwrap_err();
        assert_eq!(err, OperationError::FieldNotAllowed("email".to_string()));
        assert_eq!(err.to_string(), "Not allowed to update email field");
    }

    #[test]
    fn missing_field_is_not_allowed() {
        let request: OperationRequest =
            serde_json::from_value(json!({"op": "replace", "value": "x"})).unwrap();
        let err = Operation::try_from(&request).unwrap_err();
        assert_eq!(err, OperationError::FieldNotAllowed(String::new()));
    }

    #[test]
    fn wrong_value_shapes_are_rejected() {
        let cases = [
            OperationRequest::replace("lastname", 12),
            OperationRequest::replace("firstname", "  "),
            OperationRequest::replace("birthdate", "09-04-2001"),
            OperationRequest::replace("birthdate", "2021-02-30"),
        ];
        for request in &cases {
            let err = Operation::try_from(request).unwrap_err();
            assert!(
                matches!(err, OperationError::InvalidValue(_)),
                "unexpected result for {request:?}: {err}"
            );
        }
        assert_eq!(
            OperationError::InvalidValue(StudentField::Birthdate).to_string(),
            "Invalid value for birthdate field"
        );
    }

    #[test]
    fn first_invalid_operation_stops_decoding() {
        let requests = vec![
            OperationRequest::replace("firstname", "Ada"),
            OperationRequest::replace("id", 3),
            OperationRequest {
                op: "remove".to_string(),
                field: None,
                value: serde_json::Value::Null,
            },
        ];
        let err = decode_operations(&requests).unwrap_err();
        assert_eq!(err, OperationError::FieldNotAllowed("id".to_string()));
    }
}
