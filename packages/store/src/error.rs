//! Error types shared by every [`crate::TableStore`] implementation and the
//! [`crate::Repository`] built on top of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single form-field validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Conflict(String),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("failed to decode {table} row: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn decode(table: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            table: table.to_string(),
            source,
        }
    }

    /// Field errors when this is a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_fields() {
        let err = StoreError::Validation(vec![
            FieldError::new("title", "Event title is required"),
            FieldError::new("description", "Description is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Event title is required; Description is required"
        );
        assert_eq!(err.field_errors().len(), 2);
        assert!(StoreError::NotFound("event".into()).field_errors().is_empty());
    }
}
