//! # API Error Types
//!
//! Maps calculation errors to HTTP status codes and a JSON error body.
//! Table inconsistencies are logged but never described to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use simples_core::SimplesError;
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "UNKNOWN_ANNEX").
    pub code: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Simples(#[from] SimplesError),

    /// Malformed JSON body or query string (400).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Simples(err) => {
                let status = match err {
                    SimplesError::UnknownAnnex(_) => StatusCode::NOT_FOUND,
                    SimplesError::InvalidInput(_) | SimplesError::OutOfRangeRevenue { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    SimplesError::InconsistentTable(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Simples(SimplesError::InconsistentTable(_)) => {
                tracing::error!(error = %self, "annex table is inconsistent");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}
