// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lectern.toml` > `~/.config/lectern/lectern.toml` > `/etc/lectern/lectern.toml`
//! with environment variable overrides via `LECTERN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LecternConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lectern/lectern.toml` (system-wide)
/// 3. `~/.config/lectern/lectern.toml` (user XDG config)
/// 4. `./lectern.toml` (local directory)
/// 5. `LECTERN_*` environment variables
pub fn load_config() -> Result<LecternConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LecternConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LecternConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LecternConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LecternConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LecternConfig::default()))
        .merge(Toml::file("/etc/lectern/lectern.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("lectern/lectern.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("lectern.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LECTERN_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("LECTERN_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("session_", "session.", 1)
            .replacen("lookup_", "lookup.", 1);
        mapped.into()
    })
}
