// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process session progress store.

use async_trait::async_trait;
use dashmap::DashMap;

use lectern_core::types::{SessionKey, SessionProgress, StoryId};
use lectern_core::{AdapterType, HealthStatus, LecternError, PluginAdapter, SessionStore};

/// Session progress held in a concurrent map. Contents are lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<(SessionKey, StoryId), SessionProgress>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (session, story) entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for MemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Session
    }

    async fn health_check(&self) -> Result<HealthStatus, LecternError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LecternError> {
        self.entries.clear();
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
    ) -> Result<SessionProgress, LecternError> {
        Ok(self
            .entries
            .get(&(session.clone(), story))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn save_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
        progress: &SessionProgress,
    ) -> Result<(), LecternError> {
        self.entries
            .insert((session.clone(), story), progress.clone());
        Ok(())
    }

    async fn clear_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
    ) -> Result<(), LecternError> {
        self.entries.remove(&(session.clone(), story));
        Ok(())
    }
}
