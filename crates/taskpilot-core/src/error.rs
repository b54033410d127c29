// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Taskpilot engine.

use thiserror::Error;

/// The primary error type used across all Taskpilot adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TaskpilotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Completion provider errors (API failure, malformed response, quota/auth).
    ///
    /// Inside the chat engine every Provider error is a degraded-mode signal,
    /// not a turn failure: the fallback parser takes over.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input failed validation before any dispatch was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The resource is absent or owned by another user. The two cases are
    /// deliberately indistinguishable so existence is never confirmed to
    /// non-owners.
    #[error("{resource} not found")]
    NotFoundOrForbidden { resource: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
