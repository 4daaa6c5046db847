// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress record operations.
//!
//! Every mutation runs inside one IMMEDIATE transaction on the writer thread:
//! get-or-create the row, then update the single column the operation owns.
//! Read-modify-write of the JSON maps therefore never loses an update.

use std::collections::BTreeMap;
use std::str::FromStr;

use lectern_core::types::{ProgressRecord, QuestionId, Stage, StoryId, TimedPhase, UserId};
use lectern_core::{LecternError, LookupAttempt};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::{NOW, conversion_err, json_column, to_json};
use crate::database::Database;

const PROGRESS_COLUMNS: &str = "student_id, story_id, current_stage, score, answers_given,
    post_reading_lookups, pre_reading_time, reading_time, post_reading_time";

fn progress_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressRecord> {
    let stage: String = row.get(2)?;
    Ok(ProgressRecord {
        student: UserId(row.get(0)?),
        story_id: StoryId(row.get(1)?),
        current_stage: Stage::from_str(&stage).map_err(|e| conversion_err(2, e))?,
        score: row.get(3)?,
        answers_given: json_column(row, 4)?,
        post_reading_lookups: json_column(row, 5)?,
        pre_reading_time: row.get(6)?,
        reading_time: row.get(7)?,
        post_reading_time: row.get(8)?,
    })
}

fn time_column(phase: TimedPhase) -> &'static str {
    match phase {
        TimedPhase::PreReading => "pre_reading_time",
        TimedPhase::Reading => "reading_time",
        TimedPhase::PostReading => "post_reading_time",
    }
}

fn select_record(
    conn: &Connection,
    student: &str,
    story: i64,
) -> rusqlite::Result<Option<ProgressRecord>> {
    conn.query_row(
        &format!("SELECT {PROGRESS_COLUMNS} FROM progress WHERE student_id = ?1 AND story_id = ?2"),
        params![student, story],
        progress_from_row,
    )
    .optional()
}

fn ensure_record(conn: &Connection, student: &str, story: i64) -> rusqlite::Result<ProgressRecord> {
    conn.execute(
        "INSERT INTO progress (student_id, story_id) VALUES (?1, ?2)
         ON CONFLICT(student_id, story_id) DO NOTHING",
        params![student, story],
    )?;
    select_record(conn, student, story)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Get the record for (student, story), if any.
pub async fn get_progress(
    db: &Database,
    student: &UserId,
    story: StoryId,
) -> Result<Option<ProgressRecord>, LecternError> {
    let student = student.0.clone();
    db.connection()
        .call(move |conn| select_record(conn, &student, story.0))
        .await
        .map_err(crate::database::map_tr_err)
}

/// All records for a story, ordered by student id.
pub async fn list_progress_for_story(
    db: &Database,
    story: StoryId,
) -> Result<Vec<ProgressRecord>, LecternError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM progress
                 WHERE story_id = ?1 ORDER BY student_id ASC"
            ))?;
            let records = stmt
                .query_map(params![story.0], progress_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set one phase's elapsed seconds and advance `current_stage`.
///
/// Only the phase column and the stage are written, so concurrent saves of
/// different phases both survive.
pub async fn save_time(
    db: &Database,
    student: &UserId,
    story: StoryId,
    phase: TimedPhase,
    seconds: u32,
) -> Result<ProgressRecord, LecternError> {
    let student = student.0.clone();
    let column = time_column(phase);
    let stage = phase.next_stage().to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                &format!(
                    "INSERT INTO progress (student_id, story_id, {column}, current_stage)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(student_id, story_id) DO UPDATE SET
                         {column} = excluded.{column},
                         current_stage = excluded.current_stage,
                         updated_at = {NOW}"
                ),
                params![student, story.0, seconds, stage],
            )?;
            let record =
                select_record(&tx, &student, story.0)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set `answers_given[question]`, creating the record if needed.
pub async fn record_answer(
    db: &Database,
    student: &UserId,
    story: StoryId,
    question: QuestionId,
    correct: bool,
) -> Result<ProgressRecord, LecternError> {
    let student = student.0.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut record = ensure_record(&tx, &student, story.0)?;
            record.answers_given.insert(question.to_string(), correct);
            tx.execute(
                &format!(
                    "UPDATE progress SET answers_given = ?1, updated_at = {NOW}
                     WHERE student_id = ?2 AND story_id = ?3"
                ),
                params![to_json(&record.answers_given)?, student, story.0],
            )?;
            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Increment the lookup counter for `question` unless it is already at `ceiling`.
pub async fn try_increment_lookup(
    db: &Database,
    student: &UserId,
    story: StoryId,
    question: QuestionId,
    ceiling: u32,
) -> Result<LookupAttempt, LecternError> {
    let student = student.0.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let record = ensure_record(&tx, &student, story.0)?;
            let current = record.lookups_for(question);
            if current >= ceiling {
                tx.commit()?;
                return Ok(LookupAttempt::Exhausted { count: current });
            }

            let mut lookups: BTreeMap<String, u32> = record.post_reading_lookups;
            let count = current + 1;
            lookups.insert(question.to_string(), count);
            tx.execute(
                &format!(
                    "UPDATE progress SET post_reading_lookups = ?1, updated_at = {NOW}
                     WHERE student_id = ?2 AND story_id = ?3"
                ),
                params![to_json(&lookups)?, student, story.0],
            )?;
            tx.commit()?;
            Ok(LookupAttempt::Granted { count })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete the record. Returns whether a row existed.
pub async fn delete_progress(
    db: &Database,
    student: &UserId,
    story: StoryId,
) -> Result<bool, LecternError> {
    let student = student.0.clone();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM progress WHERE student_id = ?1 AND story_id = ?2",
                params![student, story.0],
            )?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::queries::test_support::{seed_story, setup_db};

    fn student() -> UserId {
        UserId("student-1".into())
    }

    #[tokio::test]
    async fn missing_record_reads_as_none() {
        let (db, _dir) = setup_db().await;
        let story = seed_story(&db, "Moonlight").await;
        assert!(get_progress(&db, &student(), story).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_time_creates_record_and_advances_stage() {
        let (db, _dir) = setup_db().await;
        let story = seed_story(&db, "Moonlight").await;

        let record = save_time(&db, &student(), story, TimedPhase::PreReading, 42)
            .await
            .unwrap();
        assert_eq!(record.pre_reading_time, 42);
        assert_eq!(record.current_stage, Stage::Reading);

        let record = save_time(&db, &student(), story, TimedPhase::PostReading, 90)
            .await
            .unwrap();
        assert_eq!(record.pre_reading_time, 42);
        assert_eq!(record.post_reading_time, 90);
        assert_eq!(record.current_stage, Stage::Completed);
    }

    #[tokio::test]
    async fn record_answer_overwrites_and_keeps_other_fields() {
        let (db, _dir) = setup_db().await;
        let story = seed_story(&db, "Moonlight").await;
        save_time(&db, &student(), story, TimedPhase::Reading, 30)
            .await
            .unwrap();

        record_answer(&db, &student(), story, QuestionId(1), false)
            .await
            .unwrap();
        let record = record_answer(&db, &student(), story, QuestionId(1), true)
            .await
            .unwrap();
        assert_eq!(record.answer_for(QuestionId(1)), Some(true));
        assert_eq!(record.reading_time, 30);

        let stored = get_progress(&db, &student(), story).await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn lookup_counter_stops_at_ceiling() {
        let (db, _dir) = setup_db().await;
        let story = seed_story(&db, "Moonlight").await;
        let q = QuestionId(8);

        for expected in 1..=3 {
            let attempt = try_increment_lookup(&db, &student(), story, q, 3)
                .await
                .unwrap();
            assert_eq!(attempt, LookupAttempt::Granted { count: expected });
        }
        let attempt = try_increment_lookup(&db, &student(), story, q, 3)
            .await
            .unwrap();
        assert_eq!(attempt, LookupAttempt::Exhausted { count: 3 });

        let record = get_progress(&db, &student(), story).await.unwrap().unwrap();
        assert_eq!(record.lookups_for(q), 3);
    }

    #[tokio::test]
    async fn concurrent_lookups_never_exceed_ceiling() {
        let (db, _dir) = setup_db().await;
        let story = seed_story(&db, "Moonlight").await;
        let db = Arc::new(db);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                try_increment_lookup(&db, &student(), story, QuestionId(1), 3)
                    .await
                    .unwrap()
            }));
        }
        let mut granted = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), LookupAttempt::Granted { .. }) {
                granted += 1;
            }
        }
        assert_eq!(granted, 3);
        let record = get_progress(&db, &student(), story).await.unwrap().unwrap();
        assert_eq!(record.lookups_for(QuestionId(1)), 3);
    }

    #[tokio::test]
    async fn concurrent_answers_and_times_all_survive() {
        let (db, _dir) = setup_db().await;
        let story = seed_story(&db, "Moonlight").await;
        let db = Arc::new(db);

        let mut handles = Vec::new();
        for q in 1..=5 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                record_answer(&db, &student(), story, QuestionId(q), q % 2 == 0)
                    .await
                    .unwrap();
            }));
        }
        {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                save_time(&db, &student(), story, TimedPhase::Reading, 61)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = get_progress(&db, &student(), story).await.unwrap().unwrap();
        assert_eq!(record.answers_given.len(), 5);
        assert_eq!(record.reading_time, 61);
    }

    #[tokio::test]
    async fn list_and_delete_progress() {
        let (db, _dir) = setup_db().await;
        let story = seed_story(&db, "Moonlight").await;
        for name in ["zoe", "amir"] {
            save_time(&db, &UserId(name.into()), story, TimedPhase::Reading, 5)
                .await
                .unwrap();
        }

        let listed = list_progress_for_story(&db, story).await.unwrap();
        assert_eq!(
            listed.iter().map(|r| r.student.0.as_str()).collect::<Vec<_>>(),
            vec!["amir", "zoe"]
        );

        assert!(delete_progress(&db, &UserId("zoe".into()), story).await.unwrap());
        assert!(!delete_progress(&db, &UserId("zoe".into()), story).await.unwrap());
        assert_eq!(list_progress_for_story(&db, story).await.unwrap().len(), 1);
    }
}
