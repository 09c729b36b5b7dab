// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("missing configuration: {0}")]
    Configuration(String),
    #[error("oauth exchange failed: {0}")]
    UpstreamAuth(String),
    #[error("upstream transport failure: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("upstream response could not be decoded: {0}")]
    UpstreamDecode(String),
    #[error("{0}")]
    UpstreamQuery(String),
    /// A reference table entry has an unexpected shape.
    #[error("{0}")]
    InvalidData(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found<T: Into<String>>(message: T) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::UpstreamQuery(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) | AppError::UpstreamAuth(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Transport(_) | AppError::Upstream { .. } | AppError::UpstreamDecode(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::InvalidData(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller. Upstream detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Configuration(_) | AppError::UpstreamAuth(_) => {
                "Warcraft Logs authentication failed. Please configure WCL_CLIENT_ID and WCL_CLIENT_SECRET."
                    .to_string()
            }
            AppError::Transport(_) => "Failed to fetch from Warcraft Logs".to_string(),
            AppError::Upstream { .. } => "Warcraft Logs API error".to_string(),
            AppError::UpstreamDecode(_) => "Failed to parse Warcraft Logs response".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::BadRequest(_) | AppError::NotFound(_) | AppError::UpstreamQuery(_) => {}
            AppError::InvalidData(message) => {
                tracing::error!(%message, "reference data is malformed")
            }
            AppError::Internal(error) => tracing::error!(error = ?error, "request failed"),
            other => tracing::warn!(error = %other, %status, "upstream request failed"),
        }

        let body = ErrorBody {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
