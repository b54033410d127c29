// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::TaskpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Conversation, ConversationStatus, Message, NewMessage, NewTask, Task, TaskPatch,
};

/// Adapter for storage and persistence backends.
///
/// All task operations are keyed by `(task_id, user_id)`. A lookup with a
/// mismatched user id returns `None`/`false` exactly as if the row did
/// not exist -- callers cannot distinguish the two cases.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), TaskpilotError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TaskpilotError>;

    // --- Conversation operations ---

    /// Creates a new active conversation for the user and returns it.
    async fn create_conversation(&self, user_id: &str) -> Result<Conversation, TaskpilotError>;

    /// Fetches a conversation by id.
    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, TaskpilotError>;

    /// Returns the user's first active conversation, if any.
    async fn get_active_conversation(
        &self,
        user_id: &str,
    ) -> Result<Option<Conversation>, TaskpilotError>;

    /// Updates a conversation's lifecycle status.
    async fn update_conversation_status(
        &self,
        id: i64,
        status: ConversationStatus,
    ) -> Result<(), TaskpilotError>;

    // --- Message operations ---

    /// Inserts a message and returns its assigned id.
    async fn insert_message(&self, message: &NewMessage) -> Result<i64, TaskpilotError>;

    /// Fetches messages for a conversation in chronological order.
    ///
    /// When `limit` is set, the *most recent* `limit` messages are
    /// returned, still oldest-first.
    async fn get_messages(
        &self,
        conversation_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, TaskpilotError>;

    /// Replaces a message's content. Returns the updated message, or
    /// `None` if no such message exists.
    async fn update_message_content(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<Message>, TaskpilotError>;

    // --- Task operations ---

    /// Creates a task and returns it.
    async fn create_task(&self, task: &NewTask) -> Result<Task, TaskpilotError>;

    /// Lists all tasks owned by the user. Zero tasks is not an error.
    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, TaskpilotError>;

    /// Fetches a task by `(task_id, user_id)`.
    async fn get_task(&self, task_id: i64, user_id: &str)
        -> Result<Option<Task>, TaskpilotError>;

    /// Updates the supplied fields on the task matched by `(task_id, user_id)`.
    async fn update_task(
        &self,
        task_id: i64,
        user_id: &str,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, TaskpilotError>;

    /// Sets the completion flag on the task matched by `(task_id, user_id)`.
    async fn set_task_completed(
        &self,
        task_id: i64,
        user_id: &str,
        completed: bool,
    ) -> Result<Option<Task>, TaskpilotError>;

    /// Deletes the task matched by `(task_id, user_id)`. Returns whether
    /// a row was removed.
    async fn delete_task(&self, task_id: i64, user_id: &str) -> Result<bool, TaskpilotError>;
}
