// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content store: stories and their exercise/question sequences.

use async_trait::async_trait;

use crate::error::LecternError;
use crate::types::{
    ExerciseId, NewExercise, NewQuestion, NewStory, PostReadingQuestion, PreReadingExercise,
    QuestionId, Story, StoryId,
};

/// CRUD over authored content.
///
/// Listings are always ordered by creation identity. Deleting a story removes
/// its exercises and questions in the same transaction.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_story(&self, id: StoryId) -> Result<Option<Story>, LecternError>;

    /// Lists stories, restricted to published ones when `published_only` is set.
    async fn list_stories(&self, published_only: bool) -> Result<Vec<Story>, LecternError>;

    async fn create_story(&self, story: &NewStory) -> Result<Story, LecternError>;

    async fn update_story(&self, id: StoryId, story: &NewStory) -> Result<Story, LecternError>;

    /// Deletes a story with all of its exercises and questions.
    async fn delete_story(&self, id: StoryId) -> Result<(), LecternError>;

    async fn add_exercise(
        &self,
        story: StoryId,
        exercise: &NewExercise,
    ) -> Result<PreReadingExercise, LecternError>;

    async fn get_exercise(&self, id: ExerciseId)
        -> Result<Option<PreReadingExercise>, LecternError>;

    async fn list_exercises(&self, story: StoryId)
        -> Result<Vec<PreReadingExercise>, LecternError>;

    async fn add_question(
        &self,
        story: StoryId,
        question: &NewQuestion,
    ) -> Result<PostReadingQuestion, LecternError>;

    async fn get_question(&self, id: QuestionId)
        -> Result<Option<PostReadingQuestion>, LecternError>;

    async fn list_questions(&self, story: StoryId)
        -> Result<Vec<PostReadingQuestion>, LecternError>;
}
