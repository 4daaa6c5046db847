// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reading progression state machine.
//!
//! Pre-reading state is read from the session store, everything after the
//! pre-reading phase from the durable progress record. Operations take a
//! story already resolved by the authorization gate; student operations
//! still refuse unpublished stories.

use std::sync::Arc;

use tracing::{debug, info};

use lectern_core::types::{
    ExerciseId, Identity, PostReadingQuestion, QuestionId, Role, Stage, Story,
};
use lectern_core::{ContentStore, LecternError, ProgressStore, SessionStore};

use crate::lookup::LookupPolicy;
use crate::outcome::{
    CatalogView, EntryView, ExerciseView, Outcome, Payload, PostReadingSummaryView,
    PreReadingSummaryView, QuestionReview, QuestionView, ReadingView, StorySummary,
    StudentProgressRow, Target, TeacherOverview, View,
};
use crate::scoring;

/// Notice shown when a story has no pre-reading exercises.
pub const NO_EXERCISES_NOTICE: &str = "No pre-reading exercises available for this story.";

/// Single authority for what a student sees next for a story.
pub struct ReadingEngine {
    pub(crate) content: Arc<dyn ContentStore>,
    pub(crate) progress: Arc<dyn ProgressStore>,
    pub(crate) sessions: Arc<dyn SessionStore>,
    pub(crate) lookups: LookupPolicy,
}

impl ReadingEngine {
    pub fn new(
        content: Arc<dyn ContentStore>,
        progress: Arc<dyn ProgressStore>,
        sessions: Arc<dyn SessionStore>,
        lookups: LookupPolicy,
    ) -> Self {
        Self {
            content,
            progress,
            sessions,
            lookups,
        }
    }

    pub fn lookup_policy(&self) -> &LookupPolicy {
        &self.lookups
    }

    /// Student paths never run against a draft, whatever the gate decided.
    pub(crate) fn ensure_visible(story: &Story) -> Result<(), LecternError> {
        if story.is_published() {
            Ok(())
        } else {
            Err(LecternError::AccessDenied("story is not published".into()))
        }
    }

    /// Fetch a question and check it belongs to `story`.
    pub(crate) async fn question_in_story(
        &self,
        story: &Story,
        id: QuestionId,
    ) -> Result<PostReadingQuestion, LecternError> {
        self.content
            .get_question(id)
            .await?
            .filter(|q| q.story_id == story.id)
            .ok_or_else(|| LecternError::not_found("question", id))
    }

    /// Stories visible to the caller: everything for teachers, published
    /// stories for students.
    pub async fn list_stories(&self, identity: &Identity) -> Result<Outcome, LecternError> {
        let published_only = identity.role != Role::Teacher;
        let stories = self.content.list_stories(published_only).await?;
        Ok(Outcome::render(View::Catalog(CatalogView {
            stories: stories.iter().map(StorySummary::from).collect(),
        })))
    }

    /// Decide where a student entering a story should go.
    pub async fn entry_state(
        &self,
        identity: &Identity,
        story: &Story,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let record = self.progress.get_progress(&identity.user, story.id).await?;
        let session = self
            .sessions
            .load_session_progress(&identity.session, story.id)
            .await?;

        if record.is_none() && session.completed.is_empty() {
            return Ok(Outcome::redirect(Target::PreReadingEntry, story.id));
        }

        let questions = self.content.list_questions(story.id).await?;
        let answered = record.as_ref().map_or(0, |r| r.answers_given.len());
        if !questions.is_empty() && answered == questions.len() {
            return Ok(Outcome::redirect(Target::PostReadingSummary, story.id));
        }

        let exercises = self.content.list_exercises(story.id).await?;
        let pre = scoring::score_pre_reading(&exercises, &session);
        let (post_correct, post_total) = scoring::score_post_reading(&questions, record.as_ref());
        Ok(Outcome::render(View::Entry(EntryView {
            story: StorySummary::from(story),
            stage: record.map_or(Stage::PreReading, |r| r.current_stage),
            pre_correct_answers: pre.correct,
            pre_total_questions: pre.total,
            post_correct_answers: post_correct,
            post_total_questions: post_total,
        })))
    }

    /// The first pre-reading exercise not yet completed in this session.
    pub async fn next_exercise(
        &self,
        identity: &Identity,
        story: &Story,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let exercises = self.content.list_exercises(story.id).await?;
        if exercises.is_empty() {
            return Ok(Outcome::redirect_with_notice(
                Target::StoryRead,
                story.id,
                NO_EXERCISES_NOTICE,
            ));
        }

        let session = self
            .sessions
            .load_session_progress(&identity.session, story.id)
            .await?;
        match scoring::next_unfinished(&exercises, &session) {
            Some((position, exercise)) => Ok(Outcome::render(View::Exercise(ExerciseView::new(
                story,
                exercise,
                position + 1,
                exercises.len(),
            )))),
            None => Ok(Outcome::redirect(Target::PreReadingSummary, story.id)),
        }
    }

    /// Record a pre-reading answer in the session and report correctness.
    ///
    /// A replayed submission appends the exercise to the completed list
    /// again and replaces the stored answer.
    pub async fn submit_pre_reading(
        &self,
        identity: &Identity,
        story: &Story,
        exercise_id: ExerciseId,
        selected: &str,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let exercise = self
            .content
            .get_exercise(exercise_id)
            .await?
            .filter(|e| e.story_id == story.id)
            .ok_or_else(|| LecternError::not_found("exercise", exercise_id))?;

        let correct = scoring::is_pre_reading_correct(&exercise, selected);

        let mut session = self
            .sessions
            .load_session_progress(&identity.session, story.id)
            .await?;
        session.record(exercise.id, selected.to_string());
        self.sessions
            .save_session_progress(&identity.session, story.id, &session)
            .await?;
        debug!(story_id = %story.id, exercise_id = %exercise.id, correct, "pre-reading answer recorded");

        let exercises = self.content.list_exercises(story.id).await?;
        let next = match scoring::next_unfinished(&exercises, &session) {
            Some(_) => Target::PreReadingEntry,
            None => Target::PreReadingSummary,
        };
        Ok(Outcome::Json {
            payload: Payload::PreReadingAnswer { correct, next },
        })
    }

    /// Session-scored pre-reading results. Redirects back to the next
    /// exercise until every exercise has been completed.
    pub async fn pre_reading_summary(
        &self,
        identity: &Identity,
        story: &Story,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let exercises = self.content.list_exercises(story.id).await?;
        let session = self
            .sessions
            .load_session_progress(&identity.session, story.id)
            .await?;

        if !scoring::pre_reading_complete(&exercises, &session) {
            return Ok(Outcome::redirect(Target::PreReadingEntry, story.id));
        }

        let tally = scoring::score_pre_reading(&exercises, &session);
        Ok(Outcome::render(View::PreReadingSummary(PreReadingSummaryView {
            story_id: story.id,
            questions: tally.items,
            correct_answers: tally.correct,
            total_questions: tally.total,
        })))
    }

    /// The story body for the reading phase.
    pub async fn read_story(&self, story: &Story) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        Ok(Outcome::render(View::Reading(ReadingView {
            story_id: story.id,
            title: story.title.clone(),
            content: story.content.clone(),
        })))
    }

    /// Post-reading question at `index`, or the summary past the end.
    pub async fn post_reading_question(
        &self,
        identity: &Identity,
        story: &Story,
        index: usize,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let questions = self.content.list_questions(story.id).await?;
        let Some(question) = questions.get(index) else {
            return Ok(Outcome::redirect(Target::PostReadingSummary, story.id));
        };

        let lookup_count = self
            .progress
            .get_progress(&identity.user, story.id)
            .await?
            .map_or(0, |r| r.lookups_for(question.id));
        Ok(Outcome::render(View::Question(QuestionView::new(
            question,
            index,
            questions.len(),
            lookup_count,
            self.lookups.next_allowance(lookup_count),
        ))))
    }

    /// Score a post-reading answer and move to the next question.
    ///
    /// A missing or malformed designator re-displays the same question with
    /// a notice and writes nothing. Resubmission overwrites the stored
    /// correctness for that question.
    pub async fn submit_post_reading(
        &self,
        identity: &Identity,
        story: &Story,
        question_id: QuestionId,
        selected: Option<&str>,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let question = self.question_in_story(story, question_id).await?;
        let questions = self.content.list_questions(story.id).await?;
        let position = scoring::question_position(&questions, question.id)
            .ok_or_else(|| LecternError::not_found("question", question_id))?;

        let designator = match scoring::parse_designator(selected) {
            Ok(designator) => designator,
            Err(e) => {
                return Ok(Outcome::redirect_with_notice(
                    Target::PostReadingRead { index: position },
                    story.id,
                    e.notice(),
                ));
            }
        };

        let correct = designator == question.correct_option;
        self.progress
            .record_answer(&identity.user, story.id, question.id, correct)
            .await?;
        debug!(story_id = %story.id, question_id = %question.id, correct, "post-reading answer recorded");

        let target = match scoring::next_index(&questions, position) {
            Some(index) => Target::PostReadingRead { index },
            None => Target::PostReadingSummary,
        };
        Ok(Outcome::redirect(target, story.id))
    }

    /// Post-reading results from the durable record.
    pub async fn post_reading_summary(
        &self,
        identity: &Identity,
        story: &Story,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let questions = self.content.list_questions(story.id).await?;
        let record = self.progress.get_progress(&identity.user, story.id).await?;
        let (correct, total) = scoring::score_post_reading(&questions, record.as_ref());

        let reviews = questions
            .iter()
            .map(|q| QuestionReview {
                question_id: q.id,
                question_text: q.question_text.clone(),
                correct_option: q.correct_option,
                explanation: q.explanation.clone(),
                answered_correctly: record.as_ref().and_then(|r| r.answer_for(q.id)),
            })
            .collect();

        Ok(Outcome::render(View::PostReadingSummary(PostReadingSummaryView {
            story_id: story.id,
            questions: reviews,
            correct_answers: correct,
            total_questions: total,
            post_reading_time: record.map_or(0, |r| r.post_reading_time),
        })))
    }

    /// The author's view of a story: content plus every student's progress.
    pub async fn teacher_overview(&self, story: &Story) -> Result<Outcome, LecternError> {
        let exercises = self.content.list_exercises(story.id).await?;
        let questions = self.content.list_questions(story.id).await?;
        let records = self.progress.list_progress_for_story(story.id).await?;

        let students = records
            .iter()
            .map(|record| {
                let (correct, total) = scoring::score_post_reading(&questions, Some(record));
                StudentProgressRow {
                    student: record.student.clone(),
                    stage: record.current_stage,
                    post_correct_answers: correct,
                    post_total_questions: total,
                    lookups_used: record.post_reading_lookups.values().sum(),
                    pre_reading_time: record.pre_reading_time,
                    reading_time: record.reading_time,
                    post_reading_time: record.post_reading_time,
                }
            })
            .collect();
        info!(story_id = %story.id, students = records.len(), "teacher overview");

        Ok(Outcome::render(View::TeacherOverview(TeacherOverview {
            story: story.clone(),
            pre_reading_exercises: exercises,
            post_reading_questions: questions,
            students,
        })))
    }
}
