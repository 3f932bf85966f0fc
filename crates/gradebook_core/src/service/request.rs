//! Typed request bodies and their JSON decoding.
//!
//! Decoding checks shape and types only; value rules (date syntax, grade
//! range) are enforced by `validate`.

use crate::model::ClassroomId;
use crate::operation::OperationRequest;
use crate::service::error::ValidationError;
use crate::validation::{is_valid_date, parse_date, DateInput};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Lowest accepted grade value.
pub const GRADE_MIN: f64 = 0.0;
/// Highest accepted grade value.
pub const GRADE_MAX: f64 = 20.0;

/// Body of "create a student".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStudentRequest {
    pub firstname: String,
    pub lastname: String,
    /// `YYYY-MM-DD`.
    pub birthdate: String,
    pub classroom: ClassroomId,
}

impl CreateStudentRequest {
    /// Decodes `{firstname, lastname, birthdate, classroom}`.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let object = as_object(body)?;
        Ok(Self {
            firstname: required_str(object, "firstname")?.to_string(),
            lastname: required_str(object, "lastname")?.to_string(),
            birthdate: required_str(object, "birthdate")?.to_string(),
            classroom: required(object, "classroom")?.as_i64().ok_or(
                ValidationError::InvalidField {
                    field: "classroom",
                    reason: "must be an integer",
                },
            )?,
        })
    }

    /// Checks names and birthdate; returns the parsed birthdate.
    pub fn validate(&self) -> Result<NaiveDate, ValidationError> {
        non_blank("firstname", &self.firstname)?;
        non_blank("lastname", &self.lastname)?;
        if !is_valid_date(Some(DateInput::Text(&self.birthdate))) {
            return Err(ValidationError::InvalidField {
                field: "birthdate",
                reason: "must be formatted as YYYY-MM-DD",
            });
        }
        parse_date(&self.birthdate).ok_or(ValidationError::InvalidField {
            field: "birthdate",
            reason: "is not a calendar date",
        })
    }
}

/// Body of "add a grade to a student".
#[derive(Debug, Clone, PartialEq)]
pub struct AddGradeRequest {
    pub value: f64,
    pub subject: String,
}

impl AddGradeRequest {
    /// Decodes `{value, subject}`; integer and float values are both accepted.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let object = as_object(body)?;
        Ok(Self {
            value: required(object, "value")?
                .as_f64()
                .ok_or(ValidationError::InvalidField {
                    field: "value",
                    reason: "must be a number",
                })?,
            subject: required_str(object, "subject")?.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.value.is_finite() || !(GRADE_MIN..=GRADE_MAX).contains(&self.value) {
            return Err(ValidationError::InvalidField {
                field: "value",
                reason: "must be between 0 and 20",
            });
        }
        non_blank("subject", &self.subject)
    }
}

/// Decodes a patch body: a JSON list of `{op, field, value}` objects.
pub fn parse_operations(body: &Value) -> Result<Vec<OperationRequest>, ValidationError> {
    if !body.is_array() {
        return Err(ValidationError::WrongShape("a list of operations"));
    }
    serde_json::from_value(body.clone())
        .map_err(|_| ValidationError::WrongShape("a list of operations"))
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object()
        .ok_or(ValidationError::WrongShape("a JSON object"))
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    object
        .get(field)
        .filter(|value| !value.is_null())
        .ok_or(ValidationError::MissingField(field))
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    required(object, field)?
        .as_str()
        .ok_or(ValidationError::InvalidField {
            field,
            reason: "must be a string",
        })
}

fn non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field,
            reason: "must not be empty",
        });
    }
    Ok(())
}
