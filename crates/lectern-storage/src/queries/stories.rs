// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Story CRUD operations.

use std::str::FromStr;

use lectern_core::LecternError;
use lectern_core::types::{NewStory, Story, StoryId, StoryStatus, UserId};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use super::{NOW, conversion_err};
use crate::database::Database;

const STORY_COLUMNS: &str = "id, title, description, content, author_id, status";

fn story_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Story> {
    let status: String = row.get(5)?;
    Ok(Story {
        id: StoryId(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        content: row.get(3)?,
        author: UserId(row.get(4)?),
        status: StoryStatus::from_str(&status).map_err(|e| conversion_err(5, e))?,
    })
}

/// Insert a new story. The returned story carries its assigned id.
pub async fn create_story(db: &Database, story: &NewStory) -> Result<Story, LecternError> {
    let story = story.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO stories (title, description, content, author_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    story.title,
                    story.description,
                    story.content,
                    story.author.0,
                    story.status.to_string()
                ],
            )?;
            Ok(Story {
                id: StoryId(conn.last_insert_rowid()),
                title: story.title,
                description: story.description,
                content: story.content,
                author: story.author,
                status: story.status,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a story by id.
pub async fn get_story(db: &Database, id: StoryId) -> Result<Option<Story>, LecternError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = ?1"),
                params![id.0],
                story_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List stories in creation order, optionally only the published ones.
pub async fn list_stories(db: &Database, published_only: bool) -> Result<Vec<Story>, LecternError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STORY_COLUMNS} FROM stories
                 WHERE ?1 = 0 OR status = 'published'
                 ORDER BY id ASC"
            ))?;
            let stories = stmt
                .query_map(params![published_only], story_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(stories)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace every authored field of a story.
pub async fn update_story(
    db: &Database,
    id: StoryId,
    story: &NewStory,
) -> Result<Story, LecternError> {
    let story = story.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE stories SET title = ?1, description = ?2, content = ?3,
                     author_id = ?4, status = ?5, updated_at = {NOW}
                     WHERE id = ?6"
                ),
                params![
                    story.title,
                    story.description,
                    story.content,
                    story.author.0,
                    story.status.to_string(),
                    id.0
                ],
            )?;
            Ok((changed > 0).then(|| Story {
                id,
                title: story.title,
                description: story.description,
                content: story.content,
                author: story.author,
                status: story.status,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    updated.ok_or_else(|| LecternError::not_found("story", id))
}

/// Delete a story together with its exercises, questions and all progress.
pub async fn delete_story(db: &Database, id: StoryId) -> Result<(), LecternError> {
    let deleted = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            for table in [
                "session_progress",
                "progress",
                "pre_reading_exercises",
                "post_reading_questions",
            ] {
                tx.execute(
                    &format!("DELETE FROM {table} WHERE story_id = ?1"),
                    params![id.0],
                )?;
            }
            let deleted = tx.execute("DELETE FROM stories WHERE id = ?1", params![id.0])?;
            tx.commit()?;
            Ok(deleted)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(LecternError::not_found("story", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{new_story, setup_db};

    #[tokio::test]
    async fn create_and_get_story_roundtrips() {
        let (db, _dir) = setup_db().await;
        let created = create_story(&db, &new_story("Moonlight", StoryStatus::Published))
            .await
            .unwrap();

        let fetched = get_story(&db, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(fetched.is_published());
        assert_eq!(fetched.author, UserId("teacher-1".into()));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_story_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_story(&db, StoryId(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_drafts_for_published_only() {
        let (db, _dir) = setup_db().await;
        create_story(&db, &new_story("First", StoryStatus::Published))
            .await
            .unwrap();
        create_story(&db, &new_story("Draft", StoryStatus::Draft))
            .await
            .unwrap();
        create_story(&db, &new_story("Third", StoryStatus::Published))
            .await
            .unwrap();

        let all = list_stories(&db, false).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let published: Vec<_> = list_stories(&db, true)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(published, vec!["First", "Third"]);
    }

    #[tokio::test]
    async fn update_story_replaces_fields() {
        let (db, _dir) = setup_db().await;
        let created = create_story(&db, &new_story("Old", StoryStatus::Draft))
            .await
            .unwrap();

        let updated = update_story(&db, created.id, &new_story("New", StoryStatus::Published))
            .await
            .unwrap();
        assert_eq!(updated.title, "New");

        let fetched = get_story(&db, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, StoryStatus::Published);
        assert_eq!(fetched.title, "New");
    }

    #[tokio::test]
    async fn update_missing_story_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = update_story(&db, StoryId(9), &new_story("x", StoryStatus::Draft))
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::NotFound { entity: "story", .. }));
    }

    #[tokio::test]
    async fn delete_story_cascades_to_content() {
        let (db, _dir) = setup_db().await;
        let id = crate::queries::test_support::seed_story(&db, "Doomed").await;
        crate::queries::exercises::add_exercise(
            &db,
            id,
            &lectern_core::types::NewExercise {
                question_text: "q".into(),
                option_1: "a".into(),
                option_2: "b".into(),
                is_option_1_correct: true,
                is_option_2_correct: false,
            },
        )
        .await
        .unwrap();
        crate::queries::progress::save_time(
            &db,
            &UserId("s1".into()),
            id,
            lectern_core::TimedPhase::Reading,
            12,
        )
        .await
        .unwrap();

        delete_story(&db, id).await.unwrap();

        assert!(get_story(&db, id).await.unwrap().is_none());
        assert!(
            crate::queries::exercises::list_exercises(&db, id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            crate::queries::progress::list_progress_for_story(&db, id)
                .await
                .unwrap()
                .is_empty()
        );

        let err = delete_story(&db, id).await.unwrap_err();
        assert!(matches!(err, LecternError::NotFound { .. }));
    }
}
