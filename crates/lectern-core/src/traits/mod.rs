// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the stores and collaborators the engine depends on.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility, so the
//! engine can hold them as `Arc<dyn ...>`.

pub mod adapter;
pub mod auth;
pub mod content;
pub mod progress;
pub mod session;
pub mod storage;

pub use adapter::PluginAdapter;
pub use auth::AuthorizationGate;
pub use content::ContentStore;
pub use progress::{LookupAttempt, ProgressStore};
pub use session::SessionStore;
pub use storage::StorageAdapter;
