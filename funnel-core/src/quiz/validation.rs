//! Field-level validation errors for quiz intake.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// What is wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum FieldProblem {
    /// Required field absent or empty.
    Missing,
    /// Value has the wrong shape (e.g. text for a numeric question).
    WrongKind { expected: &'static str },
    /// Numeric value outside the accepted range.
    OutOfRange { min: i64, max: i64, value: i64 },
    /// Choice not offered by the question.
    UnknownOption { value: String },
    /// An exclusive option was combined with others.
    Conflicting { option: String },
    /// The same option was selected more than once.
    Duplicate { value: String },
    /// Key does not belong to the question set.
    UnknownQuestion,
    /// Email does not look like an address.
    InvalidEmail,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is required"),
            Self::WrongKind { expected } => write!(f, "expected a {}", expected),
            Self::OutOfRange { min, max, value } => {
                write!(f, "{} is outside {}..={}", value, min, max)
            }
            Self::UnknownOption { value } => write!(f, "'{}' is not an option", value),
            Self::Conflicting { option } => {
                write!(f, "'{}' cannot be combined with other options", option)
            }
            Self::Duplicate { value } => write!(f, "'{}' was selected more than once", value),
            Self::UnknownQuestion => write!(f, "is not part of the assessment"),
            Self::InvalidEmail => write!(f, "is not a valid email address"),
        }
    }
}

/// A problem attached to a named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub problem: FieldProblem,
}

impl FieldError {
    pub fn new(field: impl Into<String>, problem: FieldProblem) -> Self {
        Self {
            field: field.into(),
            problem,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, FieldProblem::Missing)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

impl std::error::Error for FieldError {}

/// A submission was rejected before scoring. Lists every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Submission rejected: {}", join_fields(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Names of fields that were absent.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.problem == FieldProblem::Missing)
            .map(|e| e.field.as_str())
            .collect()
    }

    /// The error for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_field() {
        let err = ValidationError::new(vec![
            FieldError::missing("email"),
            FieldError::new(
                "stress_level",
                FieldProblem::OutOfRange {
                    min: 1,
                    max: 10,
                    value: 11,
                },
            ),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("email is required"));
        assert!(msg.contains("stress_level 11 is outside 1..=10"));
    }

    #[test]
    fn test_missing_fields_filters_other_problems() {
        let err = ValidationError::new(vec![
            FieldError::missing("email"),
            FieldError::new("email_typo", FieldProblem::UnknownQuestion),
            FieldError::missing("gender"),
        ]);
        assert_eq!(err.missing_fields(), vec!["email", "gender"]);
    }

    #[test]
    fn test_field_error_json_shape() {
        let err = FieldError::new(
            "diet_quality",
            FieldProblem::UnknownOption {
                value: "keto".into(),
            },
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "diet_quality");
        assert_eq!(json["problem"], "unknown_option");
        assert_eq!(json["value"], "keto");
    }
}
