// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared setup helpers for integration tests.

use std::sync::Arc;

use taskpilot_config::model::StorageConfig;
use taskpilot_core::StorageAdapter;
use taskpilot_storage::SqliteStorage;

/// An initialized SQLite store backed by a temp directory.
///
/// The directory lives as long as the harness; dropping it removes the
/// database file.
pub struct TestStore {
    pub storage: Arc<SqliteStorage>,
    _dir: tempfile::TempDir,
}

impl TestStore {
    /// Create and initialize a fresh store.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create tempdir");
        let db_path = dir.path().join("test.db");
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_str().expect("utf-8 path").to_string(),
            wal_mode: true,
        }));
        storage.initialize().await.expect("initialize storage");
        Self {
            storage,
            _dir: dir,
        }
    }

    /// The store as a trait object, as the engine consumes it.
    pub fn adapter(&self) -> Arc<dyn StorageAdapter> {
        Arc::clone(&self.storage) as Arc<dyn StorageAdapter>
    }
}
