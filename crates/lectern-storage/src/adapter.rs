// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage, content, progress and session traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use lectern_config::model::StorageConfig;
use lectern_core::types::{
    ExerciseId, NewExercise, NewQuestion, NewStory, PostReadingQuestion, PreReadingExercise,
    ProgressRecord, QuestionId, SessionKey, SessionProgress, Story, StoryId, TimedPhase, UserId,
};
use lectern_core::{
    AdapterType, ContentStore, HealthStatus, LecternError, LookupAttempt, PluginAdapter,
    ProgressStore, SessionStore, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, LecternError> {
        self.db.get().ok_or_else(|| LecternError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), LecternError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LecternError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LecternError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LecternError> {
        let db = Database::open_with_options(&self.config.database_path, self.config.wal_mode)
            .await?;
        self.db.set(db).map_err(|_| LecternError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LecternError> {
        self.db()?;
        self.checkpoint().await
    }
}

#[async_trait]
impl ContentStore for SqliteStorage {
    async fn get_story(&self, id: StoryId) -> Result<Option<Story>, LecternError> {
        queries::stories::get_story(self.db()?, id).await
    }

    async fn list_stories(&self, published_only: bool) -> Result<Vec<Story>, LecternError> {
        queries::stories::list_stories(self.db()?, published_only).await
    }

    async fn create_story(&self, story: &NewStory) -> Result<Story, LecternError> {
        queries::stories::create_story(self.db()?, story).await
    }

    async fn update_story(&self, id: StoryId, story: &NewStory) -> Result<Story, LecternError> {
        queries::stories::update_story(self.db()?, id, story).await
    }

    async fn delete_story(&self, id: StoryId) -> Result<(), LecternError> {
        queries::stories::delete_story(self.db()?, id).await
    }

    async fn add_exercise(
        &self,
        story: StoryId,
        exercise: &NewExercise,
    ) -> Result<PreReadingExercise, LecternError> {
        queries::exercises::add_exercise(self.db()?, story, exercise).await
    }

    async fn get_exercise(
        &self,
        id: ExerciseId,
    ) -> Result<Option<PreReadingExercise>, LecternError> {
        queries::exercises::get_exercise(self.db()?, id).await
    }

    async fn list_exercises(
        &self,
        story: StoryId,
    ) -> Result<Vec<PreReadingExercise>, LecternError> {
        queries::exercises::list_exercises(self.db()?, story).await
    }

    async fn add_question(
        &self,
        story: StoryId,
        question: &NewQuestion,
    ) -> Result<PostReadingQuestion, LecternError> {
        queries::questions::add_question(self.db()?, story, question).await
    }

    async fn get_question(
        &self,
        id: QuestionId,
    ) -> Result<Option<PostReadingQuestion>, LecternError> {
        queries::questions::get_question(self.db()?, id).await
    }

    async fn list_questions(
        &self,
        story: StoryId,
    ) -> Result<Vec<PostReadingQuestion>, LecternError> {
        queries::questions::list_questions(self.db()?, story).await
    }
}

#[async_trait]
impl ProgressStore for SqliteStorage {
    async fn get_progress(
        &self,
        student: &UserId,
        story: StoryId,
    ) -> Result<Option<ProgressRecord>, LecternError> {
        queries::progress::get_progress(self.db()?, student, story).await
    }

    async fn list_progress_for_story(
        &self,
        story: StoryId,
    ) -> Result<Vec<ProgressRecord>, LecternError> {
        queries::progress::list_progress_for_story(self.db()?, story).await
    }

    async fn save_time(
        &self,
        student: &UserId,
        story: StoryId,
        phase: TimedPhase,
        seconds: u32,
    ) -> Result<ProgressRecord, LecternError> {
        queries::progress::save_time(self.db()?, student, story, phase, seconds).await
    }

    async fn record_answer(
        &self,
        student: &UserId,
        story: StoryId,
        question: QuestionId,
        correct: bool,
    ) -> Result<ProgressRecord, LecternError> {
        queries::progress::record_answer(self.db()?, student, story, question, correct).await
    }

    async fn try_increment_lookup(
        &self,
        student: &UserId,
        story: StoryId,
        question: QuestionId,
        ceiling: u32,
    ) -> Result<LookupAttempt, LecternError> {
        queries::progress::try_increment_lookup(self.db()?, student, story, question, ceiling)
            .await
    }

    async fn delete_progress(
        &self,
        student: &UserId,
        story: StoryId,
    ) -> Result<bool, LecternError> {
        queries::progress::delete_progress(self.db()?, student, story).await
    }
}

#[async_trait]
impl SessionStore for SqliteStorage {
    async fn load_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
    ) -> Result<SessionProgress, LecternError> {
        queries::session_progress::load_session_progress(self.db()?, session, story).await
    }

    async fn save_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
        progress: &SessionProgress,
    ) -> Result<(), LecternError> {
        queries::session_progress::save_session_progress(self.db()?, session, story, progress)
            .await
    }

    async fn clear_session_progress(
        &self,
        session: &SessionKey,
        story: StoryId,
    ) -> Result<(), LecternError> {
        queries::session_progress::clear_session_progress(self.db()?, session, story).await
    }
}
