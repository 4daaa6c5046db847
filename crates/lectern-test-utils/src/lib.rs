// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lectern integration tests.
//!
//! Provides a harness with a temporary SQLite database and a wired
//! [`ReadingEngine`](lectern_engine::ReadingEngine), plus story fixtures.
//!
//! # Components
//!
//! - [`TestHarness`] - temp storage, session store, gate and engine
//! - [`StoryFixture`] - builder for stories with exercises and questions

pub mod fixtures;
pub mod harness;

pub use fixtures::{SeededStory, StoryFixture, student, teacher};
pub use harness::TestHarness;
