use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Relay error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required form field or file was not supplied.
    #[error("{0}")]
    MissingInput(String),

    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    /// The request body exceeded `MAX_UPLOAD_BYTES`.
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// The upstream model call failed (network, quota, auth, API status).
    #[error("Analysis failed: {0}")]
    Upstream(String),

    /// The model answered, but not with parseable JSON. Carries the raw text.
    #[error("AI response was not valid JSON")]
    MalformedResponse { raw: String },

    /// Any failure on the manual path; reported without details.
    #[error("Manual analysis failed: {0}")]
    ManualAnalysis(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::MissingInput(msg) => {
                (StatusCode::BAD_REQUEST, "MISSING_INPUT", msg.clone(), None)
            }
            AppError::Multipart(msg) => (
                StatusCode::BAD_REQUEST,
                "MALFORMED_REQUEST",
                "Malformed multipart request".to_string(),
                Some(msg.clone()),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Upload is too large".to_string(),
                Some(msg.clone()),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream model error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "Analysis failed".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::MalformedResponse { raw } => {
                tracing::error!("AI JSON error, raw model output: {raw}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_AI_RESPONSE",
                    self.to_string(),
                    None,
                )
            }
            AppError::ManualAnalysis(msg) => {
                tracing::error!("Manual analysis error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MANUAL_ANALYSIS_ERROR",
                    "Manual analysis failed".to_string(),
                    None,
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Analysis failed".to_string(),
                    Some("A storage error occurred".to_string()),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let (Some(details), Value::Object(map)) = (details, &mut body) {
            map.insert("details".to_string(), Value::String(details));
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_input_is_400_with_flat_error() {
        let (status, body) = body_json(AppError::MissingInput("No image uploaded".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No image uploaded");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_upstream_error_carries_details() {
        let (status, body) = body_json(AppError::Upstream("quota exceeded".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Analysis failed");
        assert_eq!(body["details"], "quota exceeded");
    }

    #[tokio::test]
    async fn test_malformed_response_hides_raw_text() {
        let (status, body) = body_json(AppError::MalformedResponse {
            raw: "sorry, I cannot".into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "AI response was not valid JSON");
        assert!(!body.to_string().contains("sorry"));
    }

    #[tokio::test]
    async fn test_manual_error_has_generic_message_only() {
        let (_, body) = body_json(AppError::ManualAnalysis("boom".into())).await;
        assert_eq!(body["error"], "Manual analysis failed");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_payload_too_large_is_413() {
        let (status, body) = body_json(AppError::PayloadTooLarge("length limit exceeded".into())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Upload is too large");
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }
}
