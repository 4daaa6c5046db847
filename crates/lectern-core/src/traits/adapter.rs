// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait for backends with a lifecycle.

use async_trait::async_trait;

use crate::error::LecternError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for Lectern backends.
///
/// Provides identity, health check and shutdown for anything the binary
/// wires up at startup (SQLite storage, session stores).
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of backend.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, LecternError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), LecternError>;
}
