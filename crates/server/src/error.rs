//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the body is always `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use product_review_core::{UserIdError, ValidationError};

use crate::assistant::AssistantError;
use crate::db::RepositoryError;

/// Application-level error type for the review service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// The assistant API call failed.
    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// No assistant is configured.
    #[error("Assistant is not configured")]
    AssistantUnavailable,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserIdError> for AppError {
    fn from(err: UserIdError) -> Self {
        Self::BadRequest(format!("invalid X-User-ID: {err}"))
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Assistant(_) => StatusCode::BAD_GATEWAY,
            Self::AssistantUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Assistant(_) => "Assistant service error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Name the entity behind a `RepositoryError::NotFound`.
pub trait NotFoundExt<T> {
    /// Map `RepositoryError::NotFound` to `AppError::NotFound(what)`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a missing entity and
    /// `AppError::Database` for any other repository failure.
    fn or_not_found(self, what: impl FnOnce() -> String) -> Result<T>;
}

impl<T> NotFoundExt<T> for std::result::Result<T, RepositoryError> {
    fn or_not_found(self, what: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(what()),
            other => AppError::Database(other),
        })
    }
}

/// Set the Sentry user context from the `X-User-ID` header value.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::Validation(ValidationError::Blank { field: "comment" });
        assert_eq!(err.to_string(), "comment is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Validation(ValidationError::InvalidPage(-1))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Assistant(AssistantError::EmptyResponse)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::AssistantUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_user_id_is_bad_request() {
        let err = AppError::from(UserIdError::Empty);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_body_hides_internal_details() {
        let response = AppError::Internal("pool exhausted".to_string()).into_response();
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json, json!({ "error": "Internal server error" }));
    }

    #[test]
    fn test_or_not_found() {
        let repo: std::result::Result<u8, RepositoryError> = Err(RepositoryError::NotFound);
        assert!(matches!(
            repo.or_not_found(|| "review 7".to_string()),
            Err(AppError::NotFound(_))
        ));

        let other: std::result::Result<u8, RepositoryError> =
            Err(RepositoryError::DataCorruption("bad rating".to_string()));
        assert!(matches!(
            other.or_not_found(|| "review 7".to_string()),
            Err(AppError::Database(RepositoryError::DataCorruption(_)))
        ));
    }
}
