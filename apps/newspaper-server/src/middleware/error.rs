//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpRequest, HttpResponse, ResponseError, error::JsonPayloadError, http::StatusCode, web};
use newspaper_core::DomainError;
use newspaper_core::error::{FieldError, RepoError};
use newspaper_shared::{ErrorResponse, FieldErrorResponse};

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation errors: {0:?}")]
    Validation(Vec<FieldErrorResponse>),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Forbidden(detail) => ErrorResponse::forbidden().with_detail(detail),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::Validation(errors) => {
                ErrorResponse::new(422, "Validation Failed").with_errors(errors.clone())
            }
            AppError::BadGateway(detail) => ErrorResponse::new(502, "Bad Gateway")
                .with_detail(format!("The change was saved but {detail}")),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

pub fn field_errors(errors: Vec<FieldError>) -> Vec<FieldErrorResponse> {
    errors
        .into_iter()
        .map(|e| FieldErrorResponse {
            field: e.field,
            message: e.message,
        })
        .collect()
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(errors) => AppError::Validation(field_errors(errors)),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Forbidden(permission) => {
                AppError::Forbidden(format!("Missing permission {permission}"))
            }
            DomainError::InvalidPage(msg) => AppError::NotFound(msg),
            DomainError::Delivery(e) => {
                tracing::error!("Notification delivery failed: {}", e);
                AppError::BadGateway("the subscriber notification could not be delivered".to_string())
            }
            DomainError::Repo(e) => e.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// JSON extractor config whose failures render as RFC 7807 bodies.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(err.to_string()).into()
    })
}

/// Path extractor config: a malformed id is the same as a missing one.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::NotFound(err.to_string()).into()
    })
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use newspaper_core::ports::MailError;
    use uuid::Uuid;

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let cases = [
            (
                DomainError::NotFound { entity_type: "Post", id: Uuid::new_v4() },
                StatusCode::NOT_FOUND,
            ),
            (DomainError::InvalidPage("9".into()), StatusCode::NOT_FOUND),
            (DomainError::Forbidden("news.add_post"), StatusCode::FORBIDDEN),
            (DomainError::Duplicate("Tech".into()), StatusCode::CONFLICT),
            (
                DomainError::Validation(vec![FieldError::new("title", "required")]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::Delivery(MailError::Transport("refused".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                DomainError::Repo(RepoError::Query("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AppError::from(RepoError::Connection("password=hunter2".into()));
        assert!(!err.to_string().contains("hunter2"));
    }
}
