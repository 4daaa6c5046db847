// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-reading exercise operations.

use lectern_core::LecternError;
use lectern_core::types::{ExerciseId, NewExercise, PreReadingExercise, StoryId};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

const EXERCISE_COLUMNS: &str = "id, story_id, question_text, option_1, option_2,
    is_option_1_correct, is_option_2_correct";

fn exercise_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PreReadingExercise> {
    Ok(PreReadingExercise {
        id: ExerciseId(row.get(0)?),
        story_id: StoryId(row.get(1)?),
        question_text: row.get(2)?,
        option_1: row.get(3)?,
        option_2: row.get(4)?,
        is_option_1_correct: row.get(5)?,
        is_option_2_correct: row.get(6)?,
    })
}

/// Append an exercise to a story. Fails with `NotFound` for an unknown story.
pub async fn add_exercise(
    db: &Database,
    story: StoryId,
    exercise: &NewExercise,
) -> Result<PreReadingExercise, LecternError> {
    let exercise = exercise.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM stories WHERE id = ?1)",
                params![story.0],
                |row| row.get(0),
            )?;
            if !exists {
                return Ok(None);
            }
            conn.execute(
                "INSERT INTO pre_reading_exercises
                 (story_id, question_text, option_1, option_2, is_option_1_correct, is_option_2_correct)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    story.0,
                    exercise.question_text,
                    exercise.option_1,
                    exercise.option_2,
                    exercise.is_option_1_correct,
                    exercise.is_option_2_correct
                ],
            )?;
            Ok(Some(PreReadingExercise {
                id: ExerciseId(conn.last_insert_rowid()),
                story_id: story,
                question_text: exercise.question_text,
                option_1: exercise.option_1,
                option_2: exercise.option_2,
                is_option_1_correct: exercise.is_option_1_correct,
                is_option_2_correct: exercise.is_option_2_correct,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    inserted.ok_or_else(|| LecternError::not_found("story", story))
}

/// Get an exercise by id, regardless of story.
pub async fn get_exercise(
    db: &Database,
    id: ExerciseId,
) -> Result<Option<PreReadingExercise>, LecternError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM pre_reading_exercises WHERE id = ?1"),
                params![id.0],
                exercise_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a story's exercises in creation order.
pub async fn list_exercises(
    db: &Database,
    story: StoryId,
) -> Result<Vec<PreReadingExercise>, LecternError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EXERCISE_COLUMNS} FROM pre_reading_exercises
                 WHERE story_id = ?1 ORDER BY id ASC"
            ))?;
            let exercises = stmt
                .query_map(params![story.0], exercise_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(exercises)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
