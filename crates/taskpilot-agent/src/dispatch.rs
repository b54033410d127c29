// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validated execution of tool invocations against the task store.
//!
//! Security invariant: every invocation's `user_id` argument is
//! overwritten with the authenticated requester's id immediately before
//! dispatch. This happens here, unconditionally, for every tool -- it is
//! not a convention left to the individual handlers. A request without a
//! resolvable user id fails closed and is never dispatched.
//!
//! Every outcome, success or failure, is a [`ToolResult`]; store errors
//! during one invocation never abort the remaining invocations.

use std::sync::Arc;

use taskpilot_core::types::{NewTask, TaskPatch, ToolInvocation, ToolResult};
use taskpilot_core::StorageAdapter;
use tracing::{debug, warn};

/// Maximum task title length, in characters.
const MAX_TITLE_LEN: usize = 255;
/// Maximum task description length, in characters.
const MAX_DESCRIPTION_LEN: usize = 1000;

/// Executes tool invocations under per-user isolation.
pub struct ToolDispatcher {
    storage: Arc<dyn StorageAdapter>,
}

impl ToolDispatcher {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Dispatch a batch of invocations strictly in order.
    ///
    /// Returns the invocations as actually dispatched (user id bound) and
    /// their results, index-aligned. Each invocation runs against its own
    /// short-lived store operation; there is no cross-invocation
    /// transaction, and a failure does not stop later invocations.
    pub async fn dispatch_all(
        &self,
        invocations: Vec<ToolInvocation>,
        user_id: &str,
    ) -> (Vec<ToolInvocation>, Vec<ToolResult>) {
        let mut dispatched = Vec::with_capacity(invocations.len());
        let mut results = Vec::with_capacity(invocations.len());

        for invocation in invocations {
            let (invocation, result) = self.dispatch_one(invocation, user_id).await;
            if !result.success {
                warn!(
                    tool = invocation.name.as_str(),
                    error = result.error.as_deref().unwrap_or(""),
                    "tool invocation failed"
                );
            }
            dispatched.push(invocation);
            results.push(result);
        }

        (dispatched, results)
    }

    /// Dispatch a single invocation.
    async fn dispatch_one(
        &self,
        mut invocation: ToolInvocation,
        user_id: &str,
    ) -> (ToolInvocation, ToolResult) {
        if user_id.trim().is_empty() {
            return (
                invocation,
                ToolResult::fail(
                    "validation",
                    "Security validation failed: missing user identification",
                ),
            );
        }

        // Resolver argument payloads are untrusted structured data. Only a
        // JSON object can carry the user binding; anything else fails closed.
        if invocation.arguments.is_null() {
            invocation.arguments = serde_json::Value::Object(serde_json::Map::new());
        }
        if !invocation.arguments.is_object() {
            return (
                invocation,
                ToolResult::fail("validation", "Tool arguments must be a JSON object"),
            );
        }

        // The authenticated id always wins over anything the resolver or
        // the message text supplied.
        if let Some(args) = invocation.arguments.as_object_mut() {
            args.insert(
                "user_id".to_string(),
                serde_json::Value::String(user_id.to_string()),
            );
        }

        debug!(tool = invocation.name.as_str(), "dispatching tool invocation");

        let result = match invocation.name.as_str() {
            "add_task" => self.add_task(&invocation.arguments, user_id).await,
            "list_tasks" => self.list_tasks(user_id).await,
            "update_task" => self.update_task(&invocation.arguments, user_id).await,
            "complete_task" => self.complete_task(&invocation.arguments, user_id).await,
            "delete_task" => self.delete_task(&invocation.arguments, user_id).await,
            other => ToolResult::fail("unknown_tool", format!("Unknown tool: {other}")),
        };

        (invocation, result)
    }

    async fn add_task(&self, args: &serde_json::Value, user_id: &str) -> ToolResult {
        let title = args
            .get("title")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
            .trim();
        let title = if title.is_empty() { "Untitled" } else { title };
        if title.chars().count() > MAX_TITLE_LEN {
            return ToolResult::fail(
                "validation",
                format!("Task title must be at most {MAX_TITLE_LEN} characters"),
            );
        }

        let description = args
            .get("description")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|d| !d.is_empty());
        if let Some(description) = description
            && description.chars().count() > MAX_DESCRIPTION_LEN
        {
            return ToolResult::fail(
                "validation",
                format!("Task description must be at most {MAX_DESCRIPTION_LEN} characters"),
            );
        }

        let new_task = NewTask {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        match self.storage.create_task(&new_task).await {
            Ok(task) => ToolResult::ok(format!("Task '{}' created successfully", task.title))
                .with_data(serde_json::json!({ "task_id": task.id })),
            Err(e) => execution_error("add_task", &e),
        }
    }

    async fn list_tasks(&self, user_id: &str) -> ToolResult {
        match self.storage.list_tasks(user_id).await {
            Ok(tasks) => {
                let items: Vec<serde_json::Value> = tasks
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "id": t.id,
                            "title": t.title,
                            "description": t.description,
                            "completed": t.completed,
                        })
                    })
                    .collect();
                ToolResult::ok(format!("Retrieved {} tasks successfully", items.len()))
                    .with_data(serde_json::json!({ "tasks": items }))
            }
            Err(e) => execution_error("list_tasks", &e),
        }
    }

    async fn update_task(&self, args: &serde_json::Value, user_id: &str) -> ToolResult {
        let Some(task_id) = task_id_from(args) else {
            return ToolResult::fail("validation", "task_id must be an integer");
        };

        let title = args
            .get("title")
            .and_then(serde_json::Value::as_str)
            .map(str::trim);
        if let Some(title) = title {
            if title.is_empty() {
                return ToolResult::fail("validation", "Task title must not be empty");
            }
            if title.chars().count() > MAX_TITLE_LEN {
                return ToolResult::fail(
                    "validation",
                    format!("Task title must be at most {MAX_TITLE_LEN} characters"),
                );
            }
        }

        let description = args
            .get("description")
            .and_then(serde_json::Value::as_str)
            .map(str::trim);
        if let Some(description) = description
            && description.chars().count() > MAX_DESCRIPTION_LEN
        {
            return ToolResult::fail(
                "validation",
                format!("Task description must be at most {MAX_DESCRIPTION_LEN} characters"),
            );
        }

        let patch = TaskPatch {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
        };

        match self.storage.update_task(task_id, user_id, &patch).await {
            Ok(Some(_)) => ToolResult::ok(format!("Task {task_id} updated successfully")),
            Ok(None) => not_found(task_id),
            Err(e) => execution_error("update_task", &e),
        }
    }

    async fn complete_task(&self, args: &serde_json::Value, user_id: &str) -> ToolResult {
        let Some(task_id) = task_id_from(args) else {
            return ToolResult::fail("validation", "task_id must be an integer");
        };

        match self.storage.set_task_completed(task_id, user_id, true).await {
            Ok(Some(_)) => ToolResult::ok(format!("Task {task_id} marked as completed")),
            Ok(None) => not_found(task_id),
            Err(e) => execution_error("complete_task", &e),
        }
    }

    async fn delete_task(&self, args: &serde_json::Value, user_id: &str) -> ToolResult {
        let Some(task_id) = task_id_from(args) else {
            return ToolResult::fail("validation", "task_id must be an integer");
        };

        match self.storage.delete_task(task_id, user_id).await {
            Ok(true) => ToolResult::ok(format!("Task {task_id} deleted successfully")),
            Ok(false) => not_found(task_id),
            Err(e) => execution_error("delete_task", &e),
        }
    }
}

fn task_id_from(args: &serde_json::Value) -> Option<i64> {
    args.get("task_id").and_then(serde_json::Value::as_i64)
}

/// Covers both "task does not exist" and "task belongs to another user";
/// the two are intentionally indistinguishable to the caller.
fn not_found(task_id: i64) -> ToolResult {
    ToolResult::fail(
        "not_found",
        format!("Task {task_id} not found or does not belong to user"),
    )
}

fn execution_error(tool: &str, e: &taskpilot_core::TaskpilotError) -> ToolResult {
    ToolResult::fail(
        "execution_error",
        format!("Error executing tool {tool}: {e}"),
    )
}
