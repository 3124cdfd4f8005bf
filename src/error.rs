use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ui::Notice;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred. Please try again.";

/// Failures surfaced by the auth and dashboard workflows.
///
/// `Display` is the raw, user-facing message: the UI shows it as-is.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    CorruptSession(String),

    #[error("Please select a valid image file (JPG, PNG) under 5MB")]
    InvalidImage,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AuthError::Validation(msg.into())
    }

    pub fn network() -> Self {
        AuthError::Network(NETWORK_ERROR_MESSAGE.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::InvalidImage => StatusCode::BAD_REQUEST,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::Network(_) => StatusCode::BAD_GATEWAY,
            AuthError::CorruptSession(_) => StatusCode::UNAUTHORIZED,
            AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(e: anyhow::Error) -> Self {
        AuthError::Storage(format!("{:#}", e))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let notice = Notice::error(message.clone());
        let body = json!({ "error": message, "notice": notice });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_message() {
        let err = AuthError::Conflict("An account with this email already exists.".into());
        assert_eq!(err.to_string(), "An account with this email already exists.");
        assert_eq!(AuthError::network().to_string(), NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AuthError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::InvalidImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::network().status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AuthError::CorruptSession("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn anyhow_errors_become_storage_errors() {
        let err: AuthError = anyhow::anyhow!("disk full").context("write session file").into();
        match err {
            AuthError::Storage(msg) => {
                assert!(msg.contains("write session file"));
                assert!(msg.contains("disk full"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
