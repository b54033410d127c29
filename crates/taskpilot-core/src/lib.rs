// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Taskpilot engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Taskpilot workspace. Adapter crates
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TaskpilotError;
pub use types::{
    AdapterType, ChatReply, Conversation, ConversationStatus, HealthStatus, Message, NewMessage,
    NewTask, ProviderMessage, ProviderRequest, ProviderResponse, Task, TaskPatch, TokenUsage,
    ToolCallRequest, ToolInvocation, ToolResult, ToolSchema,
};

// Re-export adapter traits at crate root.
pub use traits::{CompletionProvider, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taskpilot_error_has_all_variants() {
        let _config = TaskpilotError::Config("test".into());
        let _storage = TaskpilotError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = TaskpilotError::Provider {
            message: "test".into(),
            source: None,
        };
        let _validation = TaskpilotError::Validation("test".into());
        let _not_found = TaskpilotError::NotFoundOrForbidden {
            resource: "conversation".into(),
        };
        let _timeout = TaskpilotError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = TaskpilotError::Internal("test".into());
    }

    #[test]
    fn not_found_message_does_not_leak_ownership() {
        // The rendered message must read the same whether the resource is
        // absent or owned by someone else.
        let err = TaskpilotError::NotFoundOrForbidden {
            resource: "conversation".into(),
        };
        assert_eq!(err.to_string(), "conversation not found");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_completion_provider<T: CompletionProvider>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }
}
