// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading progression engine for the Lectern reading platform.
//!
//! The engine decides what a student sees next for a story: it walks the
//! pre-reading exercises against session progress, scores answers, walks
//! the post-reading questions against the durable progress record, enforces
//! the lookup ceiling and saves phase timings. Callers resolve the story
//! through an [`AuthorizationGate`](lectern_core::AuthorizationGate) first;
//! every operation returns an [`Outcome`] for the presentation layer.

pub mod access;
pub mod lookup;
pub mod outcome;
pub mod persistence;
pub mod progression;
pub mod scoring;

pub use access::StoryGate;
pub use lookup::LookupPolicy;
pub use outcome::{Outcome, Payload, Target, View};
pub use progression::ReadingEngine;
