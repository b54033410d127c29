// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use taskpilot_config::model::StorageConfig;
use taskpilot_core::types::{
    Conversation, ConversationStatus, Message, NewMessage, NewTask, Task, TaskPatch,
};
use taskpilot_core::{
    AdapterType, HealthStatus, PluginAdapter, StorageAdapter, TaskpilotError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, TaskpilotError> {
        self.db.get().ok_or_else(|| TaskpilotError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TaskpilotError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaskpilotError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TaskpilotError> {
        let db =
            Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TaskpilotError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TaskpilotError> {
        self.db()?.close().await
    }

    // --- Conversation operations ---

    async fn create_conversation(&self, user_id: &str) -> Result<Conversation, TaskpilotError> {
        queries::conversations::create_conversation(self.db()?, user_id).await
    }

    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, TaskpilotError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn get_active_conversation(
        &self,
        user_id: &str,
    ) -> Result<Option<Conversation>, TaskpilotError> {
        queries::conversations::get_active_conversation(self.db()?, user_id).await
    }

    async fn update_conversation_status(
        &self,
        id: i64,
        status: ConversationStatus,
    ) -> Result<(), TaskpilotError> {
        queries::conversations::update_conversation_status(self.db()?, id, status).await
    }

    // --- Message operations ---

    async fn insert_message(&self, message: &NewMessage) -> Result<i64, TaskpilotError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn get_messages(
        &self,
        conversation_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, TaskpilotError> {
        queries::messages::get_messages_for_conversation(self.db()?, conversation_id, limit).await
    }

    async fn update_message_content(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<Message>, TaskpilotError> {
        queries::messages::update_message_content(self.db()?, id, content).await
    }

    // --- Task operations ---

    async fn create_task(&self, task: &NewTask) -> Result<Task, TaskpilotError> {
        queries::tasks::create_task(self.db()?, task).await
    }

    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, TaskpilotError> {
        queries::tasks::list_tasks_for_user(self.db()?, user_id).await
    }

    async fn get_task(
        &self,
        task_id: i64,
        user_id: &str,
    ) -> Result<Option<Task>, TaskpilotError> {
        queries::tasks::get_task_for_user(self.db()?, task_id, user_id).await
    }

    async fn update_task(
        &self,
        task_id: i64,
        user_id: &str,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, TaskpilotError> {
        queries::tasks::update_task_for_user(self.db()?, task_id, user_id, patch).await
    }

    async fn set_task_completed(
        &self,
        task_id: i64,
        user_id: &str,
        completed: bool,
    ) -> Result<Option<Task>, TaskpilotError> {
        queries::tasks::set_task_completed_for_user(self.db()?, task_id, user_id, completed).await
    }

    async fn delete_task(&self, task_id: i64, user_id: &str) -> Result<bool, TaskpilotError> {
        queries::tasks::delete_task_for_user(self.db()?, task_id, user_id).await
    }
}
