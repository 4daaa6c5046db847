// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-writer model and the progress mutual-exclusion guarantee.
//!
//! All writes in lectern-storage are serialized through `tokio-rusqlite`'s
//! single background thread. The `Database` struct IS the single writer.
//! Query modules accept `&Database` and call through `conn.call()`.
//!
//! **Do NOT create additional Connection instances for writes.**

// What the progress store relies on:
// - `Database` wraps a single `tokio_rusqlite::Connection`
// - Every progress read-modify-write (answer record, lookup increment) runs
//   inside one `call` closure and one IMMEDIATE transaction
// - tokio-rusqlite runs closures one at a time, so two requests for the same
//   (student, story) can never interleave between the read and the write
// - A failed closure rolls back on drop, so no partial update is ever visible
