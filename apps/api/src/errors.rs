use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::calendar::auth::AuthError;
use crate::calendar::CalendarError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Calendar error: {0}")]
    Calendar(CalendarError),

    #[error("Calendar authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CalendarError> for AppError {
    fn from(e: CalendarError) -> Self {
        match e {
            CalendarError::Auth(auth) => AppError::Auth(auth),
            other => AppError::Calendar(other),
        }
    }
}

/// Malformed or mistyped JSON bodies are client errors in the standard envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Calendar(e) => {
                tracing::error!("Calendar error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "CALENDAR_ERROR",
                    "The calendar service request failed".to_string(),
                )
            }
            AppError::Auth(e) => {
                tracing::error!("Calendar authorization error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CALENDAR_AUTH_ERROR",
                    "Calendar authorization failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_bad_request_with_message() {
        let (status, body) = render(AppError::Validation("No candidates provided".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "No candidates provided");
    }

    #[tokio::test]
    async fn test_calendar_auth_failure_maps_to_auth_error() {
        let err: AppError =
            CalendarError::Auth(AuthError::Consent("state mismatch".into())).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "CALENDAR_AUTH_ERROR");
    }

    #[tokio::test]
    async fn test_calendar_api_failure_is_bad_gateway() {
        let err: AppError = CalendarError::Api {
            status: 503,
            message: "backend down".into(),
        }
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "CALENDAR_ERROR");
    }
}
