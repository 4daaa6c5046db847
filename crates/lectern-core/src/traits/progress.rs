// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable progress record store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LecternError;
use crate::types::{ProgressRecord, QuestionId, StoryId, TimedPhase, UserId};

/// Result of an atomic lookup increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupAttempt {
    /// The counter was incremented to `count`.
    Granted { count: u32 },
    /// The counter already sat at the ceiling and was left untouched.
    Exhausted { count: u32 },
}

/// Store of one progress record per (student, story).
///
/// Every mutating method is a get-or-create followed by an update of the
/// single field it owns, executed atomically for its (student, story) key.
/// Implementations must serialize concurrent calls on the same key.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress(
        &self,
        student: &UserId,
        story: StoryId,
    ) -> Result<Option<ProgressRecord>, LecternError>;

    /// All records for a story, ordered by student.
    async fn list_progress_for_story(
        &self,
        story: StoryId,
    ) -> Result<Vec<ProgressRecord>, LecternError>;

    /// Sets one time field and moves `current_stage` to `phase.next_stage()`.
    async fn save_time(
        &self,
        student: &UserId,
        story: StoryId,
        phase: TimedPhase,
        seconds: u32,
    ) -> Result<ProgressRecord, LecternError>;

    /// Sets `answers_given[question]`, overwriting any earlier value.
    async fn record_answer(
        &self,
        student: &UserId,
        story: StoryId,
        question: QuestionId,
        correct: bool,
    ) -> Result<ProgressRecord, LecternError>;

    /// Increments `post_reading_lookups[question]` unless it already equals
    /// `ceiling`.
    async fn try_increment_lookup(
        &self,
        student: &UserId,
        story: StoryId,
        question: QuestionId,
        ceiling: u32,
    ) -> Result<LookupAttempt, LecternError>;

    /// Deletes the record. Returns whether a row existed.
    async fn delete_progress(&self, student: &UserId, story: StoryId)
        -> Result<bool, LecternError>;
}
