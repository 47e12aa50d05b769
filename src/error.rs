// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by the endpoint catalog and the fetch clients.
///
/// Every variant is handed back to the immediate caller untouched; nothing in
/// the library retries or swallows these.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required parameter was missing, empty, or not an integer where one
    /// is required. Raised before any network I/O.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The remote API answered with a non-success status.
    #[error("{message}")]
    Fetch { status_code: u16, message: String },

    /// The remote API answered 2xx but the body was not a JSON document.
    #[error("failed to decode response body (status {status_code}): {message}")]
    Decode { status_code: u16, message: String },

    /// Connection-level failure: DNS, refused connection, timeout.
    #[error("transport error: {message}")]
    Transport { message: String, timed_out: bool },
}

impl ScrapeError {
    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn fetch(status_code: u16) -> Self {
        Self::Fetch {
            status_code,
            message: format!("failed to fetch data, status code: {status_code}"),
        }
    }

    pub fn decode<M: Into<String>>(status_code: u16, message: M) -> Self {
        Self::Decode {
            status_code,
            message: message.into(),
        }
    }

    pub fn body_too_large(status_code: u16, limit: usize) -> Self {
        Self::decode(status_code, format!("response body exceeds {limit} bytes"))
    }

    /// Status code observed from the remote, if the request got that far.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Fetch { status_code, .. } | Self::Decode { status_code, .. } => {
                Some(*status_code)
            }
            Self::InvalidParameter { .. } | Self::Transport { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::fetch(status.as_u16());
        }

        Self::Transport {
            timed_out: error.is_timeout(),
            message: error.to_string(),
        }
    }
}

/// Errors returned by the HTTP front end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Scrape(err) => match err {
                ScrapeError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
                ScrapeError::Fetch { status_code, .. } => StatusCode::from_u16(*status_code)
                    .ok()
                    .filter(|status| status.is_client_error() || status.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                ScrapeError::Decode { .. } => StatusCode::BAD_GATEWAY,
                ScrapeError::Transport { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
                ScrapeError::Transport { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
