// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use rusqlite::params;
use taskpilot_core::TaskpilotError;

use crate::database::Database;
use crate::models::{Conversation, ConversationStatus};

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        status: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Create a new active conversation for the user.
pub async fn create_conversation(
    db: &Database,
    user_id: &str,
) -> Result<Conversation, TaskpilotError> {
    let user_id = user_id.to_string();
    let now = chrono::Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (user_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user_id,
                    ConversationStatus::Active.to_string(),
                    now,
                    now
                ],
            )?;
            Ok(Conversation {
                id: conn.last_insert_rowid(),
                user_id,
                status: ConversationStatus::Active.to_string(),
                created_at: now.clone(),
                updated_at: now,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by id.
pub async fn get_conversation(
    db: &Database,
    id: i64,
) -> Result<Option<Conversation>, TaskpilotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, status, created_at, updated_at
                 FROM conversations WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the user's first active conversation, if any.
///
/// When several active conversations exist for the same user, the lowest
/// id wins; no merging is attempted.
pub async fn get_active_conversation(
    db: &Database,
    user_id: &str,
) -> Result<Option<Conversation>, TaskpilotError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, status, created_at, updated_at
                 FROM conversations WHERE user_id = ?1 AND status = ?2
                 ORDER BY id ASC LIMIT 1",
            )?;
            let result = stmt.query_row(
                params![user_id, ConversationStatus::Active.to_string()],
                row_to_conversation,
            );
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a conversation's status and updated_at timestamp.
pub async fn update_conversation_status(
    db: &Database,
    id: i64,
    status: ConversationStatus,
) -> Result<(), TaskpilotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![status.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_get_conversation_roundtrips() {
        let (db, _dir) = setup_db().await;

        let created = create_conversation(&db, "user-1").await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.status, "active");

        let retrieved = get_conversation(&db, created.id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, created.id);
        assert_eq!(retrieved.user_id, "user-1");
        assert_eq!(retrieved.status, "active");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_conversation_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_conversation(&db, 9999).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn active_conversation_scoped_to_user() {
        let (db, _dir) = setup_db().await;

        create_conversation(&db, "alice").await.unwrap();
        create_conversation(&db, "bob").await.unwrap();

        let alice = get_active_conversation(&db, "alice").await.unwrap().unwrap();
        assert_eq!(alice.user_id, "alice");

        assert!(get_active_conversation(&db, "carol")
            .await
            .unwrap()
            .is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn first_active_conversation_wins() {
        let (db, _dir) = setup_db().await;

        let first = create_conversation(&db, "alice").await.unwrap();
        let _second = create_conversation(&db, "alice").await.unwrap();

        let active = get_active_conversation(&db, "alice").await.unwrap().unwrap();
        assert_eq!(active.id, first.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn closed_conversation_is_not_active() {
        let (db, _dir) = setup_db().await;

        let conversation = create_conversation(&db, "alice").await.unwrap();
        update_conversation_status(&db, conversation.id, ConversationStatus::Closed)
            .await
            .unwrap();

        assert!(get_active_conversation(&db, "alice").await.unwrap().is_none());
        let closed = get_conversation(&db, conversation.id).await.unwrap().unwrap();
        assert_eq!(closed.status, "closed");

        db.close().await.unwrap();
    }
}
