// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the stores, the progression engine and the gateway.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of backend behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Session,
    Gateway,
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identity of a story. Assigned in creation order.
    StoryId
);
numeric_id!(
    /// Identity of a pre-reading exercise. Creation order defines traversal order.
    ExerciseId
);
numeric_id!(
    /// Identity of a post-reading question. Creation order defines traversal order.
    QuestionId
);

/// Opaque user identifier issued by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a browser session. Session progress never crosses session keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(pub String);

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of an authenticated user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
    Student,
}

/// An authenticated caller as resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: UserId,
    pub role: Role,
    pub session: SessionKey,
}

/// Visibility of a story.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    #[default]
    Draft,
    Published,
}

/// A teacher-authored reading passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub description: String,
    /// Plain-text body.
    pub content: String,
    pub author: UserId,
    pub status: StoryStatus,
}

impl Story {
    pub fn is_published(&self) -> bool {
        self.status == StoryStatus::Published
    }
}

/// Fields for creating or replacing a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStory {
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: UserId,
    #[serde(default)]
    pub status: StoryStatus,
}

/// Two-option warm-up question answered before reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreReadingExercise {
    pub id: ExerciseId,
    pub story_id: StoryId,
    pub question_text: String,
    pub option_1: String,
    pub option_2: String,
    pub is_option_1_correct: bool,
    pub is_option_2_correct: bool,
}

impl PreReadingExercise {
    /// The authoritative correct option text.
    ///
    /// Option 1 wins whenever it is flagged, even if option 2 is flagged too.
    /// With neither flag set, option 2 is treated as the answer.
    pub fn correct_option(&self) -> &str {
        if self.is_option_1_correct {
            &self.option_1
        } else {
            &self.option_2
        }
    }
}

/// Fields for a new pre-reading exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExercise {
    pub question_text: String,
    pub option_1: String,
    pub option_2: String,
    pub is_option_1_correct: bool,
    pub is_option_2_correct: bool,
}

/// Four-option comprehension question answered after reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostReadingQuestion {
    pub id: QuestionId,
    pub story_id: StoryId,
    pub question_text: String,
    pub option_1: String,
    pub option_2: String,
    pub option_3: String,
    pub option_4: String,
    /// Designator (1-4) of the correct option.
    pub correct_option: u8,
    pub explanation: String,
}

/// Fields for a new post-reading question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub option_1: String,
    pub option_2: String,
    pub option_3: String,
    pub option_4: String,
    pub correct_option: u8,
    #[serde(default)]
    pub explanation: String,
}

/// Coarse lifecycle marker on a progress record.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    PreReading,
    Reading,
    PostReading,
    Completed,
}

/// A phase whose elapsed time is saved on the progress record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TimedPhase {
    PreReading,
    Reading,
    PostReading,
}

impl TimedPhase {
    /// Stage a time save for this phase moves the record to.
    pub fn next_stage(self) -> Stage {
        match self {
            Self::PreReading | Self::Reading => Stage::Reading,
            Self::PostReading => Stage::Completed,
        }
    }
}

/// Durable per-(student, story) aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub student: UserId,
    pub story_id: StoryId,
    pub current_stage: Stage,
    /// Reserved, always within 0-100. No operation writes it.
    pub score: f64,
    /// Post-reading correctness keyed by question id (as string).
    pub answers_given: BTreeMap<String, bool>,
    /// Lookup counts keyed by question id (as string).
    pub post_reading_lookups: BTreeMap<String, u32>,
    pub pre_reading_time: u32,
    pub reading_time: u32,
    pub post_reading_time: u32,
}

impl ProgressRecord {
    /// An empty record as created lazily on first write.
    pub fn new(student: UserId, story_id: StoryId) -> Self {
        Self {
            student,
            story_id,
            current_stage: Stage::default(),
            score: 0.0,
            answers_given: BTreeMap::new(),
            post_reading_lookups: BTreeMap::new(),
            pre_reading_time: 0,
            reading_time: 0,
            post_reading_time: 0,
        }
    }

    pub fn answer_for(&self, question: QuestionId) -> Option<bool> {
        self.answers_given.get(&question.to_string()).copied()
    }

    pub fn lookups_for(&self, question: QuestionId) -> u32 {
        self.post_reading_lookups
            .get(&question.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn time_for(&self, phase: TimedPhase) -> u32 {
        match phase {
            TimedPhase::PreReading => self.pre_reading_time,
            TimedPhase::Reading => self.reading_time,
            TimedPhase::PostReading => self.post_reading_time,
        }
    }
}

/// Ephemeral pre-reading state of one story inside one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    /// Exercise ids in submission order. A replayed submission appends again.
    #[serde(default)]
    pub completed: Vec<ExerciseId>,
    /// Literal answer text selected per exercise; the last submission wins.
    #[serde(default)]
    pub answers: BTreeMap<ExerciseId, String>,
}

impl SessionProgress {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.answers.is_empty()
    }

    pub fn has_completed(&self, exercise: ExerciseId) -> bool {
        self.completed.contains(&exercise)
    }

    pub fn record(&mut self, exercise: ExerciseId, answer: String) {
        self.completed.push(exercise);
        self.answers.insert(exercise, answer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn exercise(one: bool, two: bool) -> PreReadingExercise {
        PreReadingExercise {
            id: ExerciseId(1),
            story_id: StoryId(1),
            question_text: "Is the moon bright?".into(),
            option_1: "A".into(),
            option_2: "B".into(),
            is_option_1_correct: one,
            is_option_2_correct: two,
        }
    }

    #[test]
    fn option_one_is_authoritative_when_both_flagged() {
        assert_eq!(exercise(true, true).correct_option(), "A");
        assert_eq!(exercise(true, false).correct_option(), "A");
        assert_eq!(exercise(false, true).correct_option(), "B");
    }

    #[test]
    fn stage_strings_are_snake_case() {
        assert_eq!(Stage::PreReading.to_string(), "pre_reading");
        assert_eq!(Stage::from_str("post_reading").unwrap(), Stage::PostReading);
        assert_eq!(
            serde_json::to_string(&Stage::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn timed_phase_stage_mapping() {
        assert_eq!(TimedPhase::PreReading.next_stage(), Stage::Reading);
        assert_eq!(TimedPhase::Reading.next_stage(), Stage::Reading);
        assert_eq!(TimedPhase::PostReading.next_stage(), Stage::Completed);
        assert_eq!(
            TimedPhase::from_str("post-reading").unwrap(),
            TimedPhase::PostReading
        );
    }

    #[test]
    fn session_progress_json_uses_string_keys() {
        let mut progress = SessionProgress::default();
        progress.record(ExerciseId(7), "A".into());
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"7\":\"A\""));
        let back: SessionProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }

    #[test]
    fn replayed_submission_appends_and_overwrites_answer() {
        let mut progress = SessionProgress::default();
        progress.record(ExerciseId(1), "A".into());
        progress.record(ExerciseId(1), "B".into());
        assert_eq!(progress.completed, vec![ExerciseId(1), ExerciseId(1)]);
        assert_eq!(progress.answers[&ExerciseId(1)], "B");
    }

    #[test]
    fn missing_progress_lookups_read_as_zero() {
        let record = ProgressRecord::new(UserId("s1".into()), StoryId(3));
        assert_eq!(record.lookups_for(QuestionId(9)), 0);
        assert_eq!(record.answer_for(QuestionId(9)), None);
        assert_eq!(record.current_stage, Stage::PreReading);
    }
}
