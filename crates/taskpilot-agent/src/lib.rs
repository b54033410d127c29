// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent resolution and tool dispatch engine.
//!
//! Converts a free-text user message plus conversation history into
//! task-management operations, executes them under per-user isolation,
//! and assembles a combined natural-language + structured reply.
//!
//! The pipeline is a dual-path decision chain: a provider-backed resolver
//! with a deterministic fallback parser, feeding a dispatcher that
//! enforces the user binding on every invocation.

pub mod context;
pub mod dispatch;
pub mod engine;
pub mod fallback;
pub mod resolver;
pub mod toolset;

pub use dispatch::ToolDispatcher;
pub use engine::ChatEngine;
pub use fallback::{FallbackParser, FallbackResolver, ParsedIntent};
pub use resolver::{IntentResolution, IntentResolver, ProviderResolver};
