// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lectern serve` implementation.
//!
//! Wires storage, the session backend, the reading engine and the story
//! gate into the HTTP gateway, then serves until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Instant;

use lectern_config::model::{LecternConfig, SessionBackend};
use lectern_core::{LecternError, PluginAdapter, SessionStore, StorageAdapter};
use lectern_engine::{LookupPolicy, ReadingEngine, StoryGate};
use lectern_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig, start_server};
use lectern_storage::{MemorySessionStore, SqliteStorage};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the service until SIGINT or SIGTERM.
pub async fn run_serve(config: LecternConfig) -> Result<(), LecternError> {
    init_tracing(&config.server.log_level);

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");

    let mut adapters: Vec<Arc<dyn PluginAdapter>> = vec![storage.clone()];
    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Sqlite => storage.clone(),
        SessionBackend::Memory => {
            let memory = Arc::new(MemorySessionStore::new());
            adapters.push(memory.clone());
            memory
        }
    };
    info!(backend = %config.session.backend, "session store ready");

    let lookups = LookupPolicy::from_config(&config.lookup);
    info!(
        ceiling = lookups.ceiling(),
        budgets = ?config.lookup.time_budgets_secs,
        "lookup policy loaded"
    );

    let engine = Arc::new(ReadingEngine::new(
        storage.clone(),
        storage.clone(),
        sessions,
        lookups,
    ));
    let gate = Arc::new(StoryGate::new(storage.clone()));

    if config.server.bearer_token.is_none() {
        warn!("no bearer token configured, every /v1 request will be rejected");
    }

    let state = GatewayState {
        engine,
        gate,
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
        health: HealthState {
            start_time: Instant::now(),
            adapters: adapters.clone(),
        },
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let cancel = shutdown::install_signal_handler();
    let result = start_server(&server_config, state, cancel.cancelled_owned()).await;

    for adapter in adapters.iter().rev() {
        if let Err(e) = adapter.shutdown().await {
            warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
        }
    }
    storage.close().await?;

    info!("lectern serve shutdown complete");
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lectern={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
