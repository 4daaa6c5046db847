// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discriminated results handed to the presentation layer.

use serde::Serialize;

use lectern_core::types::{
    ExerciseId, PostReadingQuestion, PreReadingExercise, QuestionId, Stage, Story, StoryId,
    StoryStatus, TimedPhase, UserId,
};

/// Named logical destinations a redirect can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Target {
    /// Next unanswered pre-reading exercise.
    PreReadingEntry,
    PreReadingSummary,
    /// Post-reading question at a 0-based index.
    PostReadingRead { index: usize },
    PostReadingSummary,
    /// The active lookup for a question.
    StoryLookup { question_id: QuestionId },
    /// Plain reading view of the story.
    StoryRead,
}

/// What the engine wants the caller to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Render {
        view: View,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
    Redirect {
        target: Target,
        story_id: StoryId,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
    Json {
        payload: Payload,
    },
    Refuse {
        message: String,
    },
}

impl Outcome {
    pub fn render(view: View) -> Self {
        Self::Render { view, notice: None }
    }

    pub fn redirect(target: Target, story_id: StoryId) -> Self {
        Self::Redirect {
            target,
            story_id,
            notice: None,
        }
    }

    pub fn redirect_with_notice(
        target: Target,
        story_id: StoryId,
        notice: impl Into<String>,
    ) -> Self {
        Self::Redirect {
            target,
            story_id,
            notice: Some(notice.into()),
        }
    }

    pub fn refuse(message: impl Into<String>) -> Self {
        Self::Refuse {
            message: message.into(),
        }
    }

    /// The redirect target, if this is a redirect.
    pub fn target(&self) -> Option<Target> {
        match self {
            Self::Redirect { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// JSON-style results for asynchronous submissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    PreReadingAnswer {
        correct: bool,
        next: Target,
    },
    TimeSaved {
        phase: TimedPhase,
        time_spent: u32,
        stage: Stage,
    },
}

/// Renderable screens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Catalog(CatalogView),
    Entry(EntryView),
    Exercise(ExerciseView),
    PreReadingSummary(PreReadingSummaryView),
    Reading(ReadingView),
    Question(QuestionView),
    PostReadingSummary(PostReadingSummaryView),
    Lookup(LookupView),
    TeacherOverview(TeacherOverview),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySummary {
    pub id: StoryId,
    pub title: String,
    pub description: String,
    pub status: StoryStatus,
}

impl From<&Story> for StorySummary {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id,
            title: story.title.clone(),
            description: story.description.clone(),
            status: story.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub stories: Vec<StorySummary>,
}

/// Progress summary shown when a student re-enters a story mid-way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub story: StorySummary,
    pub stage: Stage,
    pub pre_correct_answers: usize,
    pub pre_total_questions: usize,
    pub post_correct_answers: usize,
    pub post_total_questions: usize,
}

/// A pre-reading exercise without its answer key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseView {
    pub story_id: StoryId,
    pub story_title: String,
    pub exercise_id: ExerciseId,
    pub question_text: String,
    pub option_1: String,
    pub option_2: String,
    /// 1-based position in the story's exercise sequence.
    pub position: usize,
    pub total: usize,
}

impl ExerciseView {
    pub(crate) fn new(story: &Story, exercise: &PreReadingExercise, position: usize, total: usize) -> Self {
        Self {
            story_id: story.id,
            story_title: story.title.clone(),
            exercise_id: exercise.id,
            question_text: exercise.question_text.clone(),
            option_1: exercise.option_1.clone(),
            option_2: exercise.option_2.clone(),
            position,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryItem {
    pub text: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreReadingSummaryView {
    pub story_id: StoryId,
    pub questions: Vec<SummaryItem>,
    pub correct_answers: usize,
    pub total_questions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingView {
    pub story_id: StoryId,
    pub title: String,
    pub content: String,
}

/// A post-reading question without its answer key, plus lookup allowance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub story_id: StoryId,
    pub question_id: QuestionId,
    pub question_text: String,
    pub options: [String; 4],
    pub question_index: usize,
    pub total_questions: usize,
    pub lookup_count: u32,
    /// Seconds the next lookup would grant; `None` once lookups are used up.
    pub next_lookup_secs: Option<u32>,
}

impl QuestionView {
    pub(crate) fn new(
        question: &PostReadingQuestion,
        question_index: usize,
        total_questions: usize,
        lookup_count: u32,
        next_lookup_secs: Option<u32>,
    ) -> Self {
        Self {
            story_id: question.story_id,
            question_id: question.id,
            question_text: question.question_text.clone(),
            options: [
                question.option_1.clone(),
                question.option_2.clone(),
                question.option_3.clone(),
                question.option_4.clone(),
            ],
            question_index,
            total_questions,
            lookup_count,
            next_lookup_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub question_text: String,
    pub correct_option: u8,
    pub explanation: String,
    /// `None` when the student never answered this question.
    pub answered_correctly: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostReadingSummaryView {
    pub story_id: StoryId,
    pub questions: Vec<QuestionReview>,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub post_reading_time: u32,
}

/// Story text shown during a granted lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupView {
    pub story_id: StoryId,
    pub title: String,
    pub content: String,
    pub question_id: QuestionId,
    pub question_index: usize,
    pub lookup_count: u32,
    pub time_limit_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProgressRow {
    pub student: UserId,
    pub stage: Stage,
    pub post_correct_answers: usize,
    pub post_total_questions: usize,
    pub lookups_used: u32,
    pub pre_reading_time: u32,
    pub reading_time: u32,
    pub post_reading_time: u32,
}

/// Everything the author sees for one story.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherOverview {
    pub story: Story,
    pub pre_reading_exercises: Vec<PreReadingExercise>,
    pub post_reading_questions: Vec<PostReadingQuestion>,
    pub students: Vec<StudentProgressRow>,
}
