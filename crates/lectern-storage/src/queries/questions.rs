// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-reading question operations.

use lectern_core::LecternError;
use lectern_core::types::{NewQuestion, PostReadingQuestion, QuestionId, StoryId};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

const QUESTION_COLUMNS: &str = "id, story_id, question_text, option_1, option_2, option_3,
    option_4, correct_option, explanation";

fn question_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostReadingQuestion> {
    Ok(PostReadingQuestion {
        id: QuestionId(row.get(0)?),
        story_id: StoryId(row.get(1)?),
        question_text: row.get(2)?,
        option_1: row.get(3)?,
        option_2: row.get(4)?,
        option_3: row.get(5)?,
        option_4: row.get(6)?,
        correct_option: row.get(7)?,
        explanation: row.get(8)?,
    })
}

/// Append a question to a story.
///
/// Rejects a `correct_option` outside 1-4 with `InvalidInput` and an unknown
/// story with `NotFound`.
pub async fn add_question(
    db: &Database,
    story: StoryId,
    question: &NewQuestion,
) -> Result<PostReadingQuestion, LecternError> {
    if !(1..=4).contains(&question.correct_option) {
        return Err(LecternError::InvalidInput(format!(
            "correct_option must be between 1 and 4, got {}",
            question.correct_option
        )));
    }
    let question = question.clone();
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
                "INSERT INTO post_reading_questions
                 (story_id, question_text, option_1, option_2, option_3, option_4,
                  correct_option, explanation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    story.0,
                    question.question_text,
                    question.option_1,
                    question.option_2,
                    question.option_3,
                    question.option_4,
                    question.correct_option,
                    question.explanation
                ],
            )?;
            Ok(Some(PostReadingQuestion {
                id: QuestionId(conn.last_insert_rowid()),
                story_id: story,
                question_text: question.question_text,
                option_1: question.option_1,
                option_2: question.option_2,
                option_3: question.option_3,
                option_4: question.option_4,
                correct_option: question.correct_option,
                explanation: question.explanation,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    inserted.ok_or_else(|| LecternError::not_found("story", story))
}

/// Get a question by id, regardless of story.
pub async fn get_question(
    db: &Database,
    id: QuestionId,
) -> Result<Option<PostReadingQuestion>, LecternError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM post_reading_questions WHERE id = ?1"),
                params![id.0],
                question_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a story's questions in creation order.
pub async fn list_questions(
    db: &Database,
    story: StoryId,
) -> Result<Vec<PostReadingQuestion>, LecternError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUESTION_COLUMNS} FROM post_reading_questions
                 WHERE story_id = ?1 ORDER BY id ASC"
            ))?;
            let questions = stmt
                .query_map(params![story.0], question_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(questions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
