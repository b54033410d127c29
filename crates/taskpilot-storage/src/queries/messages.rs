// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use rusqlite::params;
use taskpilot_core::TaskpilotError;

use crate::database::Database;
use crate::models::{Message, NewMessage};

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        tool_calls: row.get(4)?,
        tool_results: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a new message and return its assigned id.
pub async fn insert_message(db: &Database, msg: &NewMessage) -> Result<i64, TaskpilotError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (conversation_id, role, content, tool_calls, tool_results, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.conversation_id,
                    msg.role,
                    msg.content,
                    msg.tool_calls,
                    msg.tool_results,
                    msg.created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get messages for a conversation in chronological order.
///
/// When `limit` is set, only the most recent `limit` messages are
/// returned, still oldest-first.
pub async fn get_messages_for_conversation(
    db: &Database,
    conversation_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Message>, TaskpilotError> {
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, role, content, tool_calls, tool_results, created_at
                         FROM messages WHERE conversation_id = ?1
                         ORDER BY created_at DESC, id DESC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![conversation_id, lim], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                    // Fetched newest-first; flip back to chronological order.
                    messages.reverse();
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, role, content, tool_calls, tool_results, created_at
                         FROM messages WHERE conversation_id = ?1
                         ORDER BY created_at ASC, id ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace a message's content. Returns the updated message, or `None`
/// if no such message exists.
pub async fn update_message_content(
    db: &Database,
    id: i64,
    content: &str,
) -> Result<Option<Message>, TaskpilotError> {
    let content = content.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages SET content = ?1 WHERE id = ?2",
                params![content, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, content, tool_calls, tool_results, created_at
                 FROM messages WHERE id = ?1",
            )?;
            let message = stmt.query_row(params![id], row_to_message)?;
            Ok(Some(message))
        })
        .await
        .map_err(crate::database::map_tr_err)
}
