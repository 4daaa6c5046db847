// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped pre-reading progress operations.

use lectern_core::LecternError;
use lectern_core::types::{SessionKey, SessionProgress, StoryId};
use rusqlite::{OptionalExtension, params};

use super::{NOW, json_column, to_json};
use crate::database::Database;

/// Load session progress. A missing row loads as empty progress.
pub async fn load_session_progress(
    db: &Database,
    session: &SessionKey,
    story: StoryId,
) -> Result<SessionProgress, LecternError> {
    let session = session.0.clone();
    let progress = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT completed, answers FROM session_progress
                 WHERE session_key = ?1 AND story_id = ?2",
                params![session, story.0],
                |row| {
                    Ok(SessionProgress {
                        completed: json_column(row, 0)?,
                        answers: json_column(row, 1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(progress.unwrap_or_default())
}

/// Replace the stored session progress for (session, story).
pub async fn save_session_progress(
    db: &Database,
    session: &SessionKey,
    story: StoryId,
    progress: &SessionProgress,
) -> Result<(), LecternError> {
    let session = session.0.clone();
    let progress = progress.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO session_progress (session_key, story_id, completed, answers)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(session_key, story_id) DO UPDATE SET
                         completed = excluded.completed,
                         answers = excluded.answers,
                         updated_at = {NOW}"
                ),
                params![
                    session,
                    story.0,
                    to_json(&progress.completed)?,
                    to_json(&progress.answers)?
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove the session progress for (session, story).
pub async fn clear_session_progress(
    db: &Database,
    session: &SessionKey,
    story: StoryId,
) -> Result<(), LecternError> {
    let session = session.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM session_progress WHERE session_key = ?1 AND story_id = ?2",
                params![session, story.0],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
