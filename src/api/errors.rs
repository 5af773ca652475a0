use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to HTTP clients. Every variant serializes to the same
/// envelope, `{"error": ..., "status": "error"}`, plus a `details` field when
/// the server has something to add.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal_with_details(
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            Self::BadRequest(_) | Self::NotFound(_) => {
                tracing::debug!(status = status.as_u16(), error = %message, "client error");
            }
            Self::Internal { .. } => {
                tracing::error!(status = status.as_u16(), error = %message, "server error");
            }
        }

        let mut body = json!({
            "error": message,
            "status": "error",
        });
        if let Self::Internal {
            details: Some(details),
            ..
        } = &self
        {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_request_serializes_the_error_envelope() {
        let response = ApiError::bad_request("Query cannot be empty").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Query cannot be empty");
        assert_eq!(body["status"], "error");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn internal_errors_carry_details() {
        let response =
            ApiError::internal_with_details("Failed to process document", "disk full")
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Failed to process document");
        assert_eq!(body["details"], "disk full");
    }
}
