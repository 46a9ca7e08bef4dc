use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use catalog_auth::AuthzError;
use catalog_core::DomainError;
use catalog_infra::ServiceError;

/// Every error the HTTP layer can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable bearer credential on the request.
    #[error("authentication required")]
    Unauthenticated,

    /// A bearer token was presented but did not verify.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// The request body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Service(ServiceError::Domain(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated => {
                json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required")
            }
            ApiError::InvalidToken => {
                json_error(StatusCode::UNAUTHORIZED, "invalid_token", "invalid or expired token")
            }
            ApiError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::Service(e) => service_error_to_response(e),
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid username or password")
        }
        ServiceError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        other @ (ServiceError::Hash(_) | ServiceError::Token(_) | ServiceError::Store(_)) => {
            error!(error = %other, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
        }
    }
}

fn domain_error_to_response(err: DomainError) -> Response {
    let (status, code) = match &err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
        DomainError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        DomainError::InvalidReference(_) => (StatusCode::BAD_REQUEST, "invalid_reference"),
        DomainError::InvalidTimestamp(_) => (StatusCode::BAD_REQUEST, "invalid_timestamp"),
    };
    json_error(status, code, err.to_string())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
