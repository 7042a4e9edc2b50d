use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Simplified error structure for OpenAPI documentation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "message": "Malformed date: '2023-13-45' is not a valid YYYY-MM-DD date",
    "details": null,
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Bad Request", "Service Unavailable")
    #[schema(example = "Bad Request")]
    pub error: String,
    /// Human-readable error description
    #[schema(example = "Malformed date: '2023-13-45' is not a valid YYYY-MM-DD date")]
    pub message: String,
    /// Additional error details (validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    #[schema(example = "2024-12-09T10:30:00.000Z")]
    pub timestamp: String,
}

/// Failures raised while loading or evaluating the model and scaler artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact file {path} is not a valid artifact: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("feature count mismatch: expected {expected}, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("corrupted tree {tree}: {reason}")]
    CorruptedTree { tree: usize, reason: String },

    #[error("non-finite output from {0}")]
    NonFinite(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Malformed date: '{0}' is not a valid YYYY-MM-DD date")]
    MalformedDate(String),

    #[error("Batch too large: {size} predictions submitted, maximum is {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Prediction failed: {0}")]
    PredictionFailure(#[source] ArtifactError),

    #[error("Artifact load failed: {0}")]
    ArtifactLoad(#[source] ArtifactError),

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedDate(_) | Self::BatchTooLarge { .. } | Self::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            Self::PredictionFailure(_) | Self::ArtifactLoad(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::PredictionFailure(_) => "Prediction failed".to_string(),
            Self::ArtifactLoad(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            // For user-facing errors, return the actual message
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let error_message = self.response_message();

        let request_id = current_request_id();
        // Build standardized error response
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: error_message,
            details: None,
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

/// Fallback for unknown routes, matching the service's 404 body.
pub async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Endpoint not found", "status_code": 404})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::MalformedDate("2023-02-30".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert!(payload.message.contains("2023-02-30"));
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::MalformedDate("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::BatchTooLarge { size: 1001, max: 1000 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::PredictionFailure(ArtifactError::FeatureCountMismatch {
                expected: 31,
                actual: 30
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::ModelNotLoaded.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn prediction_failure_hides_cause_but_keeps_source() {
        let err = ServiceError::PredictionFailure(ArtifactError::CorruptedTree {
            tree: 3,
            reason: "child index 99 out of range".into(),
        });
        assert_eq!(err.response_message(), "Prediction failed");

        let source = std::error::Error::source(&err).expect("cause preserved");
        assert!(source.to_string().contains("tree 3"));
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = ServiceError::BatchTooLarge { size: 1001, max: 1000 };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.response_message(),
            "Batch too large: 1001 predictions submitted, maximum is 1000"
        );
    }
}
