// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped progress store.

use async_trait::async_trait;

use crate::error::LecternError;
use crate::types::{SessionKey, SessionProgress, StoryId};

/// Per-session, per-story pre-reading state.
///
/// A missing entry loads as [`SessionProgress::default`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
    ) -> Result<SessionProgress, LecternError>;

    async fn save_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
        progress: &SessionProgress,
    ) -> Result<(), LecternError>;

    async fn clear_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
    ) -> Result<(), LecternError>;
}
