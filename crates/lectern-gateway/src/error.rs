// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of engine outcomes and errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use lectern_core::LecternError;
use lectern_engine::Outcome;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures surfaced by handlers.
#[derive(Debug)]
pub enum ApiError {
    Engine(LecternError),
    /// Identity headers missing or malformed.
    Unauthorized(String),
    /// Request body or path could not be interpreted.
    BadRequest(String),
}

impl From<LecternError> for ApiError {
    fn from(e: LecternError) -> Self {
        Self::Engine(e)
    }
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(message) => error_body(StatusCode::UNAUTHORIZED, message),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(Outcome::refuse(message))).into_response()
            }
            Self::Engine(e) => match e {
                LecternError::NotFound { .. } => error_body(StatusCode::NOT_FOUND, e.to_string()),
                LecternError::AccessDenied(message) => error_body(StatusCode::FORBIDDEN, message),
                LecternError::InvalidInput(message) => {
                    (StatusCode::BAD_REQUEST, Json(Outcome::refuse(message))).into_response()
                }
                other => {
                    tracing::error!(error = %other, "request failed");
                    error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                }
            },
        }
    }
}

/// An engine outcome as a JSON response. Refusals are 400, everything else 200.
#[derive(Debug)]
pub struct OutcomeResponse(pub Outcome);

impl From<Outcome> for OutcomeResponse {
    fn from(outcome: Outcome) -> Self {
        Self(outcome)
    }
}

impl IntoResponse for OutcomeResponse {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Outcome::Refuse { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::OK,
        };
        (status, Json(self.0)).into_response()
    }
}
