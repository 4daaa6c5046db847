// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization gate consulted before any engine operation.

use async_trait::async_trait;

use crate::error::LecternError;
use crate::types::{Identity, Story, StoryId};

/// Capability check that resolves a story for an already-authenticated caller.
///
/// Returns [`LecternError::AccessDenied`] for role or ownership failures and
/// [`LecternError::NotFound`] for unknown ids.
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    /// Student path: the caller is a student and the story is published.
    async fn student_story(&self, identity: &Identity, story: StoryId)
        -> Result<Story, LecternError>;

    /// Teacher path: the caller is a teacher and the author of the story.
    async fn teacher_story(&self, identity: &Identity, story: StoryId)
        -> Result<Story, LecternError>;
}
