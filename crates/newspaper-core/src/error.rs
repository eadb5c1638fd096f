//! Domain-level error types.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::ports::MailError;

/// A validation failure attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Rejects blank input. Whitespace alone does not count as a value.
pub(crate) fn required(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("This field is required."));
    }
    Ok(())
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Missing permission: {0}")]
    Forbidden(&'static str),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Notification delivery failed: {0}")]
    Delivery(#[from] MailError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Flatten a validation report into one entry per failing field path.
pub(crate) fn field_errors(report: garde::Report) -> Vec<FieldError> {
    report
        .iter()
        .map(|(path, error)| FieldError::new(path.to_string(), error.to_string()))
        .collect()
}

impl From<garde::Report> for DomainError {
    fn from(report: garde::Report) -> Self {
        DomainError::Validation(field_errors(report))
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
