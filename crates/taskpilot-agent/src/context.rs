// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembly for intent resolution.
//!
//! Loads a conversation's message history and normalizes it into the
//! role/content pairs consumed by both resolver paths.

use taskpilot_core::types::ProviderMessage;
use taskpilot_core::{StorageAdapter, TaskpilotError};

/// Default number of recent messages to include in context.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Assembles the recent history of a conversation as role/content pairs.
///
/// Messages are returned oldest-first, truncated to the most recent
/// `window` entries. An empty conversation yields an empty sequence,
/// never an error. No side effects.
pub async fn assemble_history(
    storage: &dyn StorageAdapter,
    conversation_id: i64,
    window: usize,
) -> Result<Vec<ProviderMessage>, TaskpilotError> {
    let messages = storage
        .get_messages(conversation_id, Some(window as i64))
        .await?;

    Ok(messages
        .into_iter()
        .map(|m| ProviderMessage {
            role: m.role,
            content: m.content,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_config::model::StorageConfig;
    use taskpilot_core::types::NewMessage;
    use taskpilot_storage::SqliteStorage;
    use tempfile::tempdir;

    async fn setup_storage() -> (SqliteStorage, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("context.db");
        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        let conversation = storage.create_conversation("alice").await.unwrap();
        (storage, conversation.id, dir)
    }

    fn make_msg(conversation_id: i64, role: &str, content: &str, seq: usize) -> NewMessage {
        NewMessage {
            conversation_id,
            role: role.to_string(),
            content: content.to_string(),
            tool_calls: None,
            tool_results: None,
            created_at: format!("2026-01-01T00:00:{seq:02}.000Z"),
        }
    }

    #[tokio::test]
    async fn empty_conversation_yields_empty_history() {
        let (storage, conv_id, _dir) = setup_storage().await;
        let history = assemble_history(&storage, conv_id, DEFAULT_HISTORY_WINDOW)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn history_is_oldest_first() {
        let (storage, conv_id, _dir) = setup_storage().await;

        storage
            .insert_message(&make_msg(conv_id, "user", "hello", 1))
            .await
            .unwrap();
        storage
            .insert_message(&make_msg(conv_id, "assistant", "hi there", 2))
            .await
            .unwrap();

        let history = assemble_history(&storage, conv_id, DEFAULT_HISTORY_WINDOW)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, "assistant");
    }

    #[tokio::test]
    async fn window_keeps_only_most_recent_messages() {
        let (storage, conv_id, _dir) = setup_storage().await;

        for i in 0..15 {
            storage
                .insert_message(&make_msg(conv_id, "user", &format!("msg {i}"), i))
                .await
                .unwrap();
        }

        let history = assemble_history(&storage, conv_id, 10).await.unwrap();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].content, "msg 5");
        assert_eq!(history[9].content, "msg 14");
    }
}
