// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer validation and scoring.
//!
//! Pure functions over loaded content and progress. Nothing here touches a
//! store, so the engine can score the same state from several operations
//! and always get the same answer.

use std::collections::HashSet;

use lectern_core::types::{
    ExerciseId, PostReadingQuestion, PreReadingExercise, ProgressRecord, QuestionId,
    SessionProgress,
};

use crate::outcome::SummaryItem;

/// Whether `selected` is a flagged-correct option of the exercise.
///
/// Exact string equality: case or whitespace differences count as wrong.
/// Option 1 takes precedence when both are flagged; with neither flagged
/// no answer is correct.
pub fn is_pre_reading_correct(exercise: &PreReadingExercise, selected: &str) -> bool {
    (exercise.is_option_1_correct && selected == exercise.option_1)
        || (exercise.is_option_2_correct
            && !exercise.is_option_1_correct
            && selected == exercise.option_2)
}

/// First exercise, in creation order, not yet completed in this session.
///
/// Returns the exercise with its 0-based position.
pub fn next_unfinished<'a>(
    exercises: &'a [PreReadingExercise],
    progress: &SessionProgress,
) -> Option<(usize, &'a PreReadingExercise)> {
    exercises
        .iter()
        .enumerate()
        .find(|(_, exercise)| !progress.has_completed(exercise.id))
}

/// Number of this story's exercises completed at least once.
///
/// Replayed submissions and ids from other stories do not count.
pub fn completed_count(exercises: &[PreReadingExercise], progress: &SessionProgress) -> usize {
    let completed: HashSet<ExerciseId> = progress.completed.iter().copied().collect();
    exercises
        .iter()
        .filter(|exercise| completed.contains(&exercise.id))
        .count()
}

/// Whether the pre-reading summary may be shown.
pub fn pre_reading_complete(exercises: &[PreReadingExercise], progress: &SessionProgress) -> bool {
    completed_count(exercises, progress) >= exercises.len()
}

/// Pre-reading tally derived from session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreReadingTally {
    pub items: Vec<SummaryItem>,
    pub correct: usize,
    pub total: usize,
}

/// Score every exercise: correct when it was completed and the recorded
/// answer equals the authoritative option.
pub fn score_pre_reading(
    exercises: &[PreReadingExercise],
    progress: &SessionProgress,
) -> PreReadingTally {
    let mut correct = 0;
    let items = exercises
        .iter()
        .map(|exercise| {
            let expected = exercise.correct_option();
            let answered_right = progress.has_completed(exercise.id)
                && progress
                    .answers
                    .get(&exercise.id)
                    .is_some_and(|answer| answer == expected);
            if answered_right {
                correct += 1;
            }
            SummaryItem {
                text: exercise.question_text.clone(),
                correct_answer: expected.to_string(),
            }
        })
        .collect();
    PreReadingTally {
        items,
        correct,
        total: exercises.len(),
    }
}

/// Correct post-reading answers restricted to this story's questions, and
/// the story's question count.
pub fn score_post_reading(
    questions: &[PostReadingQuestion],
    record: Option<&ProgressRecord>,
) -> (usize, usize) {
    let correct = record.map_or(0, |record| {
        questions
            .iter()
            .filter(|q| record.answer_for(q.id) == Some(true))
            .count()
    });
    (correct, questions.len())
}

/// Why a submitted designator was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignatorError {
    /// Nothing was selected.
    Missing,
    /// Not an integer between 1 and 4.
    Invalid,
}

impl DesignatorError {
    /// User-facing notice for the re-displayed question.
    pub fn notice(self) -> &'static str {
        match self {
            Self::Missing => "Please select an answer before submitting.",
            Self::Invalid => "Invalid answer. Choose one of the four options.",
        }
    }
}

/// Parse an option designator. Surrounding whitespace is ignored so that
/// `"2"`, `" 2 "` and `2` all compare equal to designator 2.
pub fn parse_designator(raw: Option<&str>) -> Result<u8, DesignatorError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(DesignatorError::Missing);
    }
    match raw.parse::<u8>() {
        Ok(designator @ 1..=4) => Ok(designator),
        _ => Err(DesignatorError::Invalid),
    }
}

/// 0-based position of a question in the traversal sequence.
pub fn question_position(questions: &[PostReadingQuestion], id: QuestionId) -> Option<usize> {
    questions.iter().position(|q| q.id == id)
}

/// Index after `position`, if another question follows.
pub fn next_index(questions: &[PostReadingQuestion], position: usize) -> Option<usize> {
    let next = position + 1;
    (next < questions.len()).then_some(next)
}
