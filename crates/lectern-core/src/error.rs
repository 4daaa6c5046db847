// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lectern reading platform.

use thiserror::Error;

/// The primary error type used across all Lectern store traits and engine operations.
#[derive(Debug, Error)]
pub enum LecternError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A referenced story, exercise or question does not exist, or belongs to
    /// a different story than the caller claimed.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The authorization gate (or a published-status check) refused access.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Malformed caller input that cannot be recovered into a re-display.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Requested adapter was not found in the configured backends.
    #[error("adapter not found: {adapter_type}/{name}")]
    AdapterNotFound { adapter_type: String, name: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LecternError {
    /// Shorthand for a [`LecternError::NotFound`] with a displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for LecternError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage {
            source: Box::new(e),
        }
    }
}
