use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use crate::negotiate::Format;

pub const NOT_FOUND_MESSAGE: &str = "The resource you requested could not be found.";
const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// One failed field constraint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("The resource you requested could not be found.")]
    NotFound,

    #[error("Data is wrongly formatted in {0}.")]
    MalformedPayload(Format),

    #[error("{0}")]
    MalformedQuery(String),

    #[error("{0}")]
    InvalidField(String),

    #[error("Unknown field \"{0}\".")]
    UnknownField(String),

    #[error("{} validation violation(s)", .0.len())]
    ValidationFailed(Vec<Violation>),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MalformedPayload(_) | AppError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidField(_)
            | AppError::UnknownField(_)
            | AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body of the error envelope, before encoding.
    pub fn body(&self) -> Value {
        match self {
            AppError::ValidationFailed(violations) => json!(violations),
            AppError::Internal(_) => json!({ "message": INTERNAL_MESSAGE }),
            other => json!({ "message": other.to_string() }),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_uses_uniform_message() {
        let err = AppError::NotFound;
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body(), json!({ "message": NOT_FOUND_MESSAGE }));
    }

    #[test]
    fn malformed_payload_names_the_format() {
        let err = AppError::MalformedPayload(Format::Xml);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), json!({ "message": "Data is wrongly formatted in xml." }));
    }

    #[test]
    fn validation_failure_lists_every_violation() {
        let err = AppError::ValidationFailed(vec![
            Violation::new("title", "Title cannot be empty."),
            Violation::new("rating", "Rating has to be between 0 and 5."),
        ]);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.body(),
            json!([
                { "field": "title", "message": "Title cannot be empty." },
                { "field": "rating", "message": "Rating has to be between 0 and 5." },
            ])
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AppError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body().to_string().contains("disk"));
    }
}
