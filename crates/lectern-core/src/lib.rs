// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lectern reading platform.
//!
//! This crate provides the error type, the domain types for stories and
//! student progress, and the store traits the progression engine is written
//! against. Storage backends implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LecternError;
pub use types::{
    AdapterType, ExerciseId, HealthStatus, Identity, ProgressRecord, QuestionId, Role,
    SessionKey, SessionProgress, Stage, Story, StoryId, StoryStatus, TimedPhase, UserId,
};

pub use traits::{
    AuthorizationGate, ContentStore, LookupAttempt, PluginAdapter, ProgressStore, SessionStore,
    StorageAdapter,
};
