// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use lectern_core::{AuthorizationGate, LecternError, PluginAdapter};
use lectern_engine::ReadingEngine;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Adapters polled on every health request.
    pub adapters: Vec<Arc<dyn PluginAdapter>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<ReadingEngine>,
    pub gate: Arc<dyn AuthorizationGate>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `ServerConfig` from lectern-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the full router: public health plus the authenticated `/v1` API.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/stories", get(handlers::list_stories))
        .route("/v1/stories/{id}", get(handlers::entry_state))
        .route(
            "/v1/stories/{id}/pre-reading",
            get(handlers::next_exercise).post(handlers::submit_pre_reading),
        )
        .route(
            "/v1/stories/{id}/pre-reading/summary",
            get(handlers::pre_reading_summary),
        )
        .route("/v1/stories/{id}/read", get(handlers::read_story))
        .route(
            "/v1/stories/{id}/post-reading/summary",
            get(handlers::post_reading_summary),
        )
        .route(
            "/v1/stories/{id}/post-reading/{index}",
            get(handlers::post_reading_question),
        )
        .route(
            "/v1/stories/{id}/post-reading/questions/{qid}",
            post(handlers::submit_post_reading),
        )
        .route("/v1/stories/{id}/lookup", get(handlers::story_lookup))
        .route("/v1/stories/{id}/lookup/{qid}", post(handlers::start_lookup))
        .route(
            "/v1/stories/{id}/return/{index}",
            post(handlers::return_to_question),
        )
        .route("/v1/stories/{id}/time/{phase}", post(handlers::save_time))
        .route("/v1/stories/{id}/reset", post(handlers::reset))
        .route("/v1/teacher/stories/{id}", get(handlers::teacher_overview))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and run until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), LecternError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LecternError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| LecternError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
