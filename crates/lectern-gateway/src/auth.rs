// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service authentication and caller identity.
//!
//! The upstream identity provider authenticates users and forwards requests
//! with a shared bearer token plus identity headers. When no token is
//! configured, all requests are rejected (fail-closed).

use std::str::FromStr;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};

use lectern_core::types::{Identity, Role, SessionKey, UserId};

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-lectern-user";
pub const ROLE_HEADER: &str = "x-lectern-role";
pub const SESSION_HEADER: &str = "x-lectern-session";

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects every request.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that validates the service bearer token.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected_token) = auth.bearer_token.as_deref() else {
        tracing::error!("gateway has no bearer token configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected_token => Ok(next.run(request).await),
        _ => {
            tracing::debug!("bearer token missing or mismatched");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// The authenticated caller, read from the identity headers.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Identity);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = header(parts, USER_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_HEADER} header")))?;
        let role = header(parts, ROLE_HEADER)
            .and_then(|raw| Role::from_str(raw).ok())
            .ok_or_else(|| {
                ApiError::Unauthorized(format!("{ROLE_HEADER} must be `teacher` or `student`"))
            })?;
        let session = header(parts, SESSION_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {SESSION_HEADER} header")))?;

        Ok(Self(Identity {
            user: UserId(user.to_string()),
            role,
            session: SessionKey(session.to_string()),
        }))
    }
}
