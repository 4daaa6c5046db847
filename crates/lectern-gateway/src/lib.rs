// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Lectern reading engine.
//!
//! Every authenticated route resolves the caller's identity from headers set
//! by the upstream identity provider, passes the story through the
//! authorization gate and serializes the engine's [`Outcome`] as JSON.
//!
//! [`Outcome`]: lectern_engine::Outcome

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{AuthConfig, CallerIdentity};
pub use error::{ApiError, OutcomeResponse};
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
