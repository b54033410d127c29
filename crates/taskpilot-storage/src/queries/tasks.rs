// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task CRUD operations.
//!
//! Every lookup and mutation is keyed by `(task_id, user_id)`. A task
//! owned by another user is indistinguishable from a missing one.

use rusqlite::params;
use taskpilot_core::TaskpilotError;

use crate::database::Database;
use crate::models::{NewTask, Task, TaskPatch};

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

fn row_to_task(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Create a new task and return it.
pub async fn create_task(db: &Database, task: &NewTask) -> Result<Task, TaskpilotError> {
    let task = task.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tasks (user_id, title, description, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?4)",
                params![task.user_id, task.title, task.description, task.created_at],
            )?;
            Ok(Task {
                id: conn.last_insert_rowid(),
                user_id: task.user_id,
                title: task.title,
                description: task.description,
                completed: false,
                created_at: task.created_at.clone(),
                updated_at: task.created_at,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all tasks owned by the user, oldest first.
pub async fn list_tasks_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Task>, TaskpilotError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![user_id], row_to_task)?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a task by `(task_id, user_id)`.
pub async fn get_task_for_user(
    db: &Database,
    task_id: i64,
    user_id: &str,
) -> Result<Option<Task>, TaskpilotError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"
            ))?;
            let result = stmt.query_row(params![task_id, user_id], row_to_task);
            match result {
                Ok(task) => Ok(Some(task)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update only the supplied fields on the task matched by `(task_id, user_id)`.
///
/// Returns the updated task, or `None` when no row matched.
pub async fn update_task_for_user(
    db: &Database,
    task_id: i64,
    user_id: &str,
    patch: &TaskPatch,
) -> Result<Option<Task>, TaskpilotError> {
    let user_id = user_id.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE tasks
                 SET title = COALESCE(?1, title),
                     description = COALESCE(?2, description),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3 AND user_id = ?4",
                params![patch.title, patch.description, task_id, user_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"
            ))?;
            let task = stmt.query_row(params![task_id, user_id], row_to_task)?;
            Ok(Some(task))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the completion flag on the task matched by `(task_id, user_id)`.
pub async fn set_task_completed_for_user(
    db: &Database,
    task_id: i64,
    user_id: &str,
    completed: bool,
) -> Result<Option<Task>, TaskpilotError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE tasks
                 SET completed = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND user_id = ?3",
                params![completed, task_id, user_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"
            ))?;
            let task = stmt.query_row(params![task_id, user_id], row_to_task)?;
            Ok(Some(task))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete the task matched by `(task_id, user_id)`. Returns whether a row
/// was removed.
pub async fn delete_task_for_user(
    db: &Database,
    task_id: i64,
    user_id: &str,
) -> Result<bool, TaskpilotError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![task_id, user_id],
            )?;
            Ok(changed > 0)
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

    fn make_task(user_id: &str, title: &str) -> NewTask {
        NewTask {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_get_task_roundtrips() {
        let (db, _dir) = setup_db().await;

        let created = create_task(&db, &make_task("alice", "buy milk")).await.unwrap();
        assert!(created.id > 0);
        assert!(!created.completed);

        let retrieved = get_task_for_user(&db, created.id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.title, "buy milk");
        assert_eq!(retrieved.user_id, "alice");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_owner_is_indistinguishable_from_missing() {
        let (db, _dir) = setup_db().await;

        let task = create_task(&db, &make_task("alice", "buy milk")).await.unwrap();

        // Correct id, wrong user: same outcome as a missing task.
        assert!(get_task_for_user(&db, task.id, "bob").await.unwrap().is_none());
        assert!(get_task_for_user(&db, 9999, "bob").await.unwrap().is_none());

        assert!(update_task_for_user(
            &db,
            task.id,
            "bob",
            &TaskPatch {
                title: Some("hijacked".into()),
                description: None
            }
        )
        .await
        .unwrap()
        .is_none());
        assert!(set_task_completed_for_user(&db, task.id, "bob", true)
            .await
            .unwrap()
            .is_none());
        assert!(!delete_task_for_user(&db, task.id, "bob").await.unwrap());

        // The task is untouched for its real owner.
        let untouched = get_task_for_user(&db, task.id, "alice").await.unwrap().unwrap();
        assert_eq!(untouched.title, "buy milk");
        assert!(!untouched.completed);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_tasks_is_scoped_and_ordered() {
        let (db, _dir) = setup_db().await;

        create_task(&db, &make_task("alice", "first")).await.unwrap();
        create_task(&db, &make_task("alice", "second")).await.unwrap();
        create_task(&db, &make_task("bob", "other")).await.unwrap();

        let tasks = list_tasks_for_user(&db, "alice").await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "first");
        assert_eq!(tasks[1].title, "second");

        assert!(list_tasks_for_user(&db, "carol").await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_task_only_touches_supplied_fields() {
        let (db, _dir) = setup_db().await;

        let mut new_task = make_task("alice", "write report");
        new_task.description = Some("quarterly numbers".into());
        let task = create_task(&db, &new_task).await.unwrap();

        let updated = update_task_for_user(
            &db,
            task.id,
            "alice",
            &TaskPatch {
                title: Some("write annual report".into()),
                description: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.title, "write annual report");
        assert_eq!(updated.description.as_deref(), Some("quarterly numbers"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_completed_flips_flag() {
        let (db, _dir) = setup_db().await;

        let task = create_task(&db, &make_task("alice", "buy milk")).await.unwrap();
        let done = set_task_completed_for_user(&db, task.id, "alice", true)
            .await
            .unwrap()
            .unwrap();
        assert!(done.completed);

        let undone = set_task_completed_for_user(&db, task.id, "alice", false)
            .await
            .unwrap()
            .unwrap();
        assert!(!undone.completed);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_task_removes_row() {
        let (db, _dir) = setup_db().await;

        let task = create_task(&db, &make_task("alice", "buy milk")).await.unwrap();
        assert!(delete_task_for_user(&db, task.id, "alice").await.unwrap());
        assert!(get_task_for_user(&db, task.id, "alice").await.unwrap().is_none());

        // Second delete is a no-op.
        assert!(!delete_task_for_user(&db, task.id, "alice").await.unwrap());

        db.close().await.unwrap();
    }
}
