use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matching::ai_client::AiError;
use crate::matching::extractor::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Auth domain outcomes (unknown user, wrong password, duplicate email) are
/// NOT represented here: those are success-shaped envelopes over HTTP 200,
/// built directly in the auth handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Extracted resume text is empty")]
    EmptyContent,

    #[error(transparent)]
    Ai(#[from] AiError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Extract(ExtractError::UnsupportedFormat) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                self.to_string(),
                None,
            ),
            AppError::Extract(ExtractError::ExtractionFailed(cause)) => {
                tracing::error!("Extraction failed: {cause:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    self.to_string(),
                    None,
                )
            }
            AppError::EmptyContent => (
                StatusCode::BAD_REQUEST,
                "EMPTY_CONTENT",
                self.to_string(),
                None,
            ),
            AppError::Ai(ai) => {
                let (status, code) = match ai {
                    AiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    AiError::Misconfigured => (StatusCode::INTERNAL_SERVER_ERROR, "MISCONFIGURED"),
                    AiError::Timeout => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_TIMEOUT"),
                    AiError::UpstreamUnavailable(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_UNAVAILABLE")
                    }
                    AiError::UpstreamProtocol(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_PROTOCOL")
                    }
                    AiError::MalformedOutput { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_MODEL_OUTPUT")
                    }
                };
                if status.is_server_error() {
                    tracing::error!("AI client error: {ai}");
                }
                // The raw model text travels in the error detail so operators
                // can see exactly what came back.
                let detail = match ai {
                    AiError::MalformedOutput { raw, .. } => Some(raw.clone()),
                    _ => None,
                };
                (status, code, ai.to_string(), detail)
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message,
                "detail": detail,
            }
        }));

        (status, body).into_response()
    }
}
