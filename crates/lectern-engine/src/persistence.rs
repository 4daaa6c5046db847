// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phase timing saves and progress reset.

use tracing::info;

use lectern_core::LecternError;
use lectern_core::types::{Identity, Story, TimedPhase};

use crate::outcome::{Outcome, Payload, Target};
use crate::progression::ReadingEngine;

impl ReadingEngine {
    /// Store the seconds spent in `phase` and advance the stage.
    ///
    /// Each phase owns one column, so saves of different phases never
    /// overwrite each other.
    pub async fn save_time(
        &self,
        identity: &Identity,
        story: &Story,
        phase: TimedPhase,
        time_spent: i64,
    ) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        let seconds = u32::try_from(time_spent).map_err(|_| {
            LecternError::InvalidInput(format!(
                "time_spent must be a non-negative number of seconds, got {time_spent}"
            ))
        })?;

        let record = self
            .progress
            .save_time(&identity.user, story.id, phase, seconds)
            .await?;
        info!(
            student = %identity.user,
            story_id = %story.id,
            %phase,
            seconds,
            stage = %record.current_stage,
            "time saved"
        );
        Ok(Outcome::Json {
            payload: Payload::TimeSaved {
                phase,
                time_spent: seconds,
                stage: record.current_stage,
            },
        })
    }

    /// Forget everything about this student and story: session progress and
    /// the durable record. The next entry starts at pre-reading.
    pub async fn reset(&self, identity: &Identity, story: &Story) -> Result<Outcome, LecternError> {
        Self::ensure_visible(story)?;
        self.sessions
            .clear_session_progress(&identity.session, story.id)
            .await?;
        let existed = self
            .progress
            .delete_progress(&identity.user, story.id)
            .await?;
        info!(student = %identity.user, story_id = %story.id, existed, "progress reset");
        Ok(Outcome::redirect(Target::PreReadingEntry, story.id))
    }
}
