// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use srgraph_core::{Checked, Metadata, StoreError, ValidationError};
use tracing::error;

/// Error returned by dashboard routes.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Extra state for the client, e.g. the filter form to re-render.
    pub details: Option<Value>,
}

impl ApiError {
    /// A rejected filter request.
    ///
    /// Carries the checked values and available options so the page can
    /// still show the filter form.
    pub fn validation(err: ValidationError, checked: Checked, metadata: &Metadata) -> Self {
        let code = match err {
            ValidationError::InvalidValue { .. } => "INVALID_VALUE",
            ValidationError::MissingInput => "MISSING_INPUT",
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: err.to_string(),
            details: Some(json!({
                "checked": checked,
                "metadata": metadata,
            })),
        }
    }

    /// An unexpected server-side failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: message.into(),
            details: None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "Record store load failed");
        let code = if err.is_unavailable() {
            "STORE_UNAVAILABLE"
        } else {
            "STORE_ERROR"
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code,
            message: err.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "code": self.code,
            "message": self.message,
        });
        if let Some(details) = self.details {
            error["details"] = details;
        }
        let body = Json(json!({
            "error": error,
            "meta": {
                "timestamp": Utc::now().to_rfc3339(),
            }
        }));
        (self.status, body).into_response()
    }
}
