// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup rate limiting.
//!
//! A lookup re-shows the story text while a post-reading question is open.
//! Attempt N (1-indexed) grants `budgets[N - 1]` seconds; the number of
//! budgets is the per-question ceiling. The counter itself lives on the
//! progress record and is only ever changed by
//! [`ReadingEngine::start_lookup`](crate::ReadingEngine::start_lookup).

use lectern_config::model::LookupConfig;
use lectern_core::types::{Identity, QuestionId, Story};
use lectern_core::{LecternError, LookupAttempt};
use tracing::{info, warn};

use crate::outcome::{LookupView, Outcome, Target, View};
use crate::progression::ReadingEngine;
use crate::scoring;

/// Notice shown when the ceiling for a question has been reached.
pub const LOOKUPS_EXHAUSTED_NOTICE: &str = "No more lookups left for this question.";
/// Notice shown when the lookup view is opened without a granted lookup.
pub const NO_ACTIVE_LOOKUP_NOTICE: &str = "Start a lookup from the question first.";
/// Refusal for a lookup request that names no question.
pub const MISSING_QUESTION_MESSAGE: &str = "A question id is required to look up the story.";

/// Escalating time budgets for story lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPolicy {
    budgets: Vec<u32>,
}

impl LookupPolicy {
    pub fn new(budgets: Vec<u32>) -> Self {
        Self { budgets }
    }

    pub fn from_config(config: &LookupConfig) -> Self {
        Self::new(config.time_budgets_secs.clone())
    }

    /// Lookups allowed per (student, story, question).
    pub fn ceiling(&self) -> u32 {
        u32::try_from(self.budgets.len()).unwrap_or(u32::MAX)
    }

    /// Seconds granted to 1-indexed attempt `attempt`.
    pub fn budget_for_attempt(&self, attempt: u32) -> Option<u32> {
        let index = usize::try_from(attempt.checked_sub(1)?).ok()?;
        self.budgets.get(index).copied()
    }

    /// Seconds the next lookup would grant after `count` granted lookups.
    /// Display only; `None` once the ceiling is reached.
    pub fn next_allowance(&self, count: u32) -> Option<u32> {
        self.budget_for_attempt(count.checked_add(1)?)
    }
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self::from_config(&LookupConfig::default())
    }
}

impl ReadingEngine {
    /// Spend one lookup on `question_id`.
    ///
    /// The increment and the ceiling check happen atomically in the progress
    /// store, so concurrent starts never grant more than the ceiling.
    pub async fn start_lookup(
        &self,
        identity: &Identity,
        story: &Story,
        question_id: QuestionId,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let question = self.question_in_story(story, question_id).await?;

        let attempt = self
            .progress
            .try_increment_lookup(&identity.user, story.id, question.id, self.lookups.ceiling())
            .await?;
        match attempt {
            LookupAttempt::Granted { count } => {
                info!(
                    student = %identity.user,
                    story_id = %story.id,
                    question_id = %question.id,
                    count,
                    budget_secs = ?self.lookups.budget_for_attempt(count),
                    "lookup granted"
                );
                Ok(Outcome::redirect(
                    Target::StoryLookup {
                        question_id: question.id,
                    },
                    story.id,
                ))
            }
            LookupAttempt::Exhausted { count } => {
                warn!(
                    student = %identity.user,
                    story_id = %story.id,
                    question_id = %question.id,
                    count,
                    "lookup refused"
                );
                let index = self.position_of(story, question.id).await?;
                Ok(Outcome::redirect_with_notice(
                    Target::PostReadingRead { index },
                    story.id,
                    LOOKUPS_EXHAUSTED_NOTICE,
                ))
            }
        }
    }

    /// Show the story for the most recently granted lookup on a question.
    ///
    /// Reads the counter without changing it. `question_id` is the raw
    /// query value; a missing or non-numeric value is refused.
    pub async fn story_lookup(
        &self,
        identity: &Identity,
        story: &Story,
        question_id: Option<&str>,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let Some(question_id) = question_id
            .map(str::trim)
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(QuestionId)
        else {
            return Ok(Outcome::refuse(MISSING_QUESTION_MESSAGE));
        };
        let question = self.question_in_story(story, question_id).await?;
        let index = self.position_of(story, question.id).await?;

        let count = self
            .progress
            .get_progress(&identity.user, story.id)
            .await?
            .map_or(0, |r| r.lookups_for(question.id));
        let Some(time_limit_secs) = self.lookups.budget_for_attempt(count) else {
            let notice = if count == 0 {
                NO_ACTIVE_LOOKUP_NOTICE
            } else {
                LOOKUPS_EXHAUSTED_NOTICE
            };
            return Ok(Outcome::redirect_with_notice(
                Target::PostReadingRead { index },
                story.id,
                notice,
            ));
        };

        Ok(Outcome::render(View::Lookup(LookupView {
            story_id: story.id,
            title: story.title.clone(),
            content: story.content.clone(),
            question_id: question.id,
            question_index: index,
            lookup_count: count,
            time_limit_secs,
        })))
    }

    /// Leave a lookup and go back to the question at `index`.
    pub fn return_to_question(&self, story: &Story, index: usize) -> Outcome {
        Outcome::redirect(Target::PostReadingRead { index }, story.id)
    }

    async fn position_of(&self, story: &Story, question: QuestionId) -> Result<usize, LecternError> {
        let questions = self.content.list_questions(story.id).await?;
        scoring::question_position(&questions, question)
            .ok_or_else(|| LecternError::not_found("question", question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_budgets_escalate() {
        let policy = LookupPolicy::default();
        assert_eq!(policy.ceiling(), 3);
        assert_eq!(policy.budget_for_attempt(0), None);
        assert_eq!(policy.budget_for_attempt(1), Some(30));
        assert_eq!(policy.budget_for_attempt(2), Some(45));
        assert_eq!(policy.budget_for_attempt(3), Some(60));
        assert_eq!(policy.budget_for_attempt(4), None);
    }

    #[test]
    fn display_allowance_by_count() {
        let policy = LookupPolicy::default();
        assert_eq!(policy.next_allowance(0), Some(30));
        assert_eq!(policy.next_allowance(1), Some(45));
        assert_eq!(policy.next_allowance(2), Some(60));
        assert_eq!(policy.next_allowance(3), None);
        assert_eq!(policy.next_allowance(u32::MAX), None);
    }

    #[test]
    fn empty_policy_allows_nothing() {
        let policy = LookupPolicy::new(Vec::new());
        assert_eq!(policy.ceiling(), 0);
        assert_eq!(policy.next_allowance(0), None);
    }

    proptest! {
        #[test]
        fn allowance_exists_exactly_below_ceiling(
            budgets in prop::collection::vec(1u32..600, 0..8),
            count in 0u32..16,
        ) {
            let policy = LookupPolicy::new(budgets.clone());
            let allowance = policy.next_allowance(count);
            prop_assert_eq!(allowance.is_some(), count < policy.ceiling());
            if let Some(secs) = allowance {
                prop_assert_eq!(secs, budgets[count as usize]);
            }
        }
    }

    mod operations {
        use std::sync::Arc;

        use super::super::*;
        use crate::progression::tests::{fixture, student};
        use lectern_core::types::UserId;
        use lectern_core::{ContentStore, ProgressStore};

        #[tokio::test]
        async fn start_lookup_grants_three_then_refuses() {
            let f = fixture().await;
            let sam = student("sam");
            let questions = f.storage.list_questions(f.story.id).await.unwrap();
            let q = &questions[1];

            for expected in 1..=3u32 {
                let outcome = f.engine.start_lookup(&sam, &f.story, q.id).await.unwrap();
                assert_eq!(outcome.target(), Some(Target::StoryLookup { question_id: q.id }));

                let shown = f
                    .engine
                    .story_lookup(&sam, &f.story, Some(&q.id.to_string()))
                    .await
                    .unwrap();
                let Outcome::Render { view: View::Lookup(view), .. } = shown else {
                    panic!("expected lookup view");
                };
                assert_eq!(view.lookup_count, expected);
                assert_eq!(view.question_index, 1);
                assert_eq!(Some(view.time_limit_secs), [30, 45, 60].get(expected as usize - 1).copied());
            }

            let outcome = f.engine.start_lookup(&sam, &f.story, q.id).await.unwrap();
            assert_eq!(
                outcome,
                Outcome::redirect_with_notice(
                    Target::PostReadingRead { index: 1 },
                    f.story.id,
                    LOOKUPS_EXHAUSTED_NOTICE
                )
            );
            let record = f.storage.get_progress(&sam.user, f.story.id).await.unwrap().unwrap();
            assert_eq!(record.lookups_for(q.id), 3);
        }

        #[tokio::test]
        #[tracing_test::traced_test]
        async fn grants_and_refusals_are_logged() {
            let f = fixture().await;
            let sam = student("sam");
            let questions = f.storage.list_questions(f.story.id).await.unwrap();

            for _ in 0..4 {
                f.engine.start_lookup(&sam, &f.story, questions[0].id).await.unwrap();
            }
            assert!(logs_contain("lookup granted"));
            assert!(logs_contain("lookup refused"));
        }

        #[tokio::test]
        async fn viewing_does_not_spend_lookups() {
            let f = fixture().await;
            let sam = student("sam");
            let questions = f.storage.list_questions(f.story.id).await.unwrap();
            let q = &questions[0];

            let outcome = f
                .engine
                .story_lookup(&sam, &f.story, Some(&q.id.to_string()))
                .await
                .unwrap();
            assert_eq!(
                outcome,
                Outcome::redirect_with_notice(
                    Target::PostReadingRead { index: 0 },
                    f.story.id,
                    NO_ACTIVE_LOOKUP_NOTICE
                )
            );

            for _ in 0..3 {
                f.engine.post_reading_question(&sam, &f.story, 0).await.unwrap();
            }
            assert!(f.storage.get_progress(&sam.user, f.story.id).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn question_view_reflects_unified_counter() {
            let f = fixture().await;
            let sam = student("sam");
            let questions = f.storage.list_questions(f.story.id).await.unwrap();

            let mut allowances = Vec::new();
            for _ in 0..4 {
                let Outcome::Render { view: View::Question(view), .. } =
                    f.engine.post_reading_question(&sam, &f.story, 2).await.unwrap()
                else {
                    panic!("expected question view");
                };
                allowances.push((view.lookup_count, view.next_lookup_secs));
                f.engine.start_lookup(&sam, &f.story, questions[2].id).await.unwrap();
            }
            assert_eq!(
                allowances,
                vec![(0, Some(30)), (1, Some(45)), (2, Some(60)), (3, None)]
            );
        }

        #[tokio::test]
        async fn missing_question_id_is_refused() {
            let f = fixture().await;
            for raw in [None, Some(""), Some("abc")] {
                let outcome = f
                    .engine
                    .story_lookup(&student("sam"), &f.story, raw)
                    .await
                    .unwrap();
                assert_eq!(outcome, Outcome::refuse(MISSING_QUESTION_MESSAGE));
            }
        }

        #[tokio::test]
        async fn unknown_question_is_not_found() {
            let f = fixture().await;
            let err = f
                .engine
                .start_lookup(&student("sam"), &f.story, QuestionId(4242))
                .await
                .unwrap_err();
            assert!(matches!(err, LecternError::NotFound { entity: "question", .. }));
        }

        #[tokio::test]
        async fn concurrent_starts_respect_ceiling() {
            let f = fixture().await;
            let engine = Arc::new(f.engine);
            let story = Arc::new(f.story);
            let question = f.storage.list_questions(story.id).await.unwrap()[0].id;

            let mut handles = Vec::new();
            for _ in 0..12 {
                let engine = Arc::clone(&engine);
                let story = Arc::clone(&story);
                handles.push(tokio::spawn(async move {
                    engine.start_lookup(&student("sam"), &story, question).await.unwrap()
                }));
            }
            let mut granted = 0;
            for handle in handles {
                if matches!(handle.await.unwrap().target(), Some(Target::StoryLookup { .. })) {
                    granted += 1;
                }
            }
            assert_eq!(granted, 3);
            let record = f.storage.get_progress(&UserId("sam".into()), story.id).await.unwrap().unwrap();
            assert_eq!(record.lookups_for(question), 3);
        }

        #[tokio::test]
        async fn return_to_question_redirects() {
            let f = fixture().await;
            assert_eq!(
                f.engine.return_to_question(&f.story, 2),
                Outcome::redirect(Target::PostReadingRead { index: 2 }, f.story.id)
            );
        }
    }
}
