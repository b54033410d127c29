// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `taskpilot-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use taskpilot_core::types::{
    Conversation, ConversationStatus, Message, NewMessage, NewTask, Task, TaskPatch,
};
