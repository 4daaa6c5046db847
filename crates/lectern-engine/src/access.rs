// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Story access gate.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use lectern_core::types::{Identity, Role, Story, StoryId};
use lectern_core::{AuthorizationGate, ContentStore, LecternError};

/// Capability check over the content store.
///
/// Students reach published stories only; teachers reach the stories they
/// authored, in any status.
pub struct StoryGate {
    content: Arc<dyn ContentStore>,
}

impl StoryGate {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }

    async fn fetch(&self, story: StoryId) -> Result<Story, LecternError> {
        self.content
            .get_story(story)
            .await?
            .ok_or_else(|| LecternError::not_found("story", story))
    }
}

#[async_trait]
impl AuthorizationGate for StoryGate {
    async fn student_story(
        &self,
        identity: &Identity,
        story: StoryId,
    ) -> Result<Story, LecternError> {
        if identity.role != Role::Student {
            warn!(user = %identity.user, story_id = %story, "non-student on student path");
            return Err(LecternError::AccessDenied(
                "only students can view this page".into(),
            ));
        }
        let story = self.fetch(story).await?;
        if !story.is_published() {
            warn!(user = %identity.user, story_id = %story.id, "student requested unpublished story");
            return Err(LecternError::AccessDenied("story is not published".into()));
        }
        Ok(story)
    }

    async fn teacher_story(
        &self,
        identity: &Identity,
        story: StoryId,
    ) -> Result<Story, LecternError> {
        if identity.role != Role::Teacher {
            warn!(user = %identity.user, story_id = %story, "non-teacher on teacher path");
            return Err(LecternError::AccessDenied(
                "only teachers can view this page".into(),
            ));
        }
        let story = self.fetch(story).await?;
        if story.author != identity.user {
            warn!(user = %identity.user, story_id = %story.id, "teacher is not the author");
            return Err(LecternError::AccessDenied(
                "you are not allowed to view this story".into(),
            ));
        }
        Ok(story)
    }
}
