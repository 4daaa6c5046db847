// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full engine stack over a temp SQLite
//! database: storage adapter, session store, story gate and engine.

use std::sync::Arc;

use lectern_config::model::{LecternConfig, LookupConfig, SessionBackend, StorageConfig};
use lectern_core::{ContentStore, LecternError, SessionStore, StorageAdapter};
use lectern_engine::{LookupPolicy, ReadingEngine, StoryGate};
use lectern_storage::{MemorySessionStore, SqliteStorage};

use crate::fixtures::{SeededStory, StoryFixture};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    session_backend: SessionBackend,
    lookup_budgets: Option<Vec<u32>>,
    bearer_token: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            session_backend: SessionBackend::Sqlite,
            lookup_budgets: None,
            bearer_token: None,
        }
    }

    /// Keep session progress in memory instead of SQLite.
    pub fn with_memory_sessions(mut self) -> Self {
        self.session_backend = SessionBackend::Memory;
        self
    }

    /// Override the lookup budgets (and thereby the ceiling).
    pub fn with_lookup_budgets(mut self, budgets: Vec<u32>) -> Self {
        self.lookup_budgets = Some(budgets);
        self
    }

    /// Service token placed in the server config.
    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, LecternError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| LecternError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = LecternConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        config.session.backend = self.session_backend;
        config.server.bearer_token = self.bearer_token;
        if let Some(budgets) = self.lookup_budgets {
            config.lookup = LookupConfig {
                time_budgets_secs: budgets,
            };
        }

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let sessions: Arc<dyn SessionStore> = match config.session.backend {
            SessionBackend::Sqlite => storage.clone(),
            SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
        };
        let engine = Arc::new(ReadingEngine::new(
            storage.clone(),
            storage.clone(),
            sessions.clone(),
            LookupPolicy::from_config(&config.lookup),
        ));
        let gate = Arc::new(StoryGate::new(storage.clone()));

        Ok(TestHarness {
            storage,
            sessions,
            engine,
            gate,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over temp storage.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Session store the engine was wired with.
    pub sessions: Arc<dyn SessionStore>,
    pub engine: Arc<ReadingEngine>,
    pub gate: Arc<StoryGate>,
    pub config: LecternConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Store a fixture and return it with assigned ids.
    pub async fn seed(&self, fixture: StoryFixture) -> Result<SeededStory, LecternError> {
        let story = self.storage.create_story(&fixture.story).await?;
        let mut exercises = Vec::with_capacity(fixture.exercises.len());
        for exercise in &fixture.exercises {
            exercises.push(self.storage.add_exercise(story.id, exercise).await?);
        }
        let mut questions = Vec::with_capacity(fixture.questions.len());
        for question in &fixture.questions {
            questions.push(self.storage.add_question(story.id, question).await?);
        }
        tracing::debug!(story_id = %story.id, "fixture seeded");
        Ok(SeededStory {
            story,
            exercises,
            questions,
        })
    }
}
