use authz::error::AuthzError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use social::SocialError;
use thiserror::Error;
use tracing::error;

/// API Error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    /// A domain rule refused the request (self-friending, duplicate request,
    /// last admin, not following).
    #[error("{0}")]
    PolicyRejected(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Error body: `{"success": false, "error": ..., "code": ...}`
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ApiError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::PolicyRejected(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for the error type
    pub fn error_code(&self) -> &str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::PolicyRejected(_) => "POLICY_REJECTED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn body(&self) -> ApiErrorResponse {
        ApiErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.error_code().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(detail) = &self {
            error!("internal error while handling request: {}", detail);
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthenticated,
            AuthzError::Forbidden(_) => {
                ApiError::Forbidden("You do not have permission to perform this action".to_string())
            }
            AuthzError::LastAdmin(_) => ApiError::PolicyRejected(err.to_string()),
            AuthzError::UnknownRole(_) | AuthzError::UnknownAction(_) => {
                ApiError::ValidationError(err.to_string())
            }
            AuthzError::PolicyParse(_)
            | AuthzError::EntityCreation(_)
            | AuthzError::EvaluationError(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<SocialError> for ApiError {
    fn from(err: SocialError) -> Self {
        match err {
            SocialError::Storage(detail) => ApiError::InternalError(detail),
            ref e if e.is_not_found() => ApiError::NotFound(e.reason()),
            e => ApiError::PolicyRejected(e.reason()),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
