// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixed tool surface offered to the completion provider.
//!
//! Five operations, each with named, typed JSON-Schema parameters. The
//! `user_id` binding is deliberately absent from every schema: the
//! dispatcher injects it from the authenticated request and never trusts
//! a model-supplied value.

use taskpilot_core::ToolSchema;

/// System preamble describing the five permitted operations.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful assistant that manages todo tasks for users. \
You can add, list, update, complete, and delete tasks. \
Use the provided tools to perform these operations. \
Always respond naturally to the user's requests.";

/// Returns the five tool schemas, in a fixed order.
pub fn tool_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "add_task".to_string(),
            description: "Add a new task to the user's list".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "The title of the task"},
                    "description": {"type": "string", "description": "Optional description of the task"}
                },
                "required": ["title"]
            }),
        },
        ToolSchema {
            name: "list_tasks".to_string(),
            description: "List all tasks for the user".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolSchema {
            name: "update_task".to_string(),
            description: "Update an existing task".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": {"type": "integer", "description": "The ID of the task to update"},
                    "title": {"type": "string", "description": "The new title of the task"},
                    "description": {"type": "string", "description": "The new description of the task"}
                },
                "required": ["task_id"]
            }),
        },
        ToolSchema {
            name: "complete_task".to_string(),
            description: "Mark a task as completed".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": {"type": "integer", "description": "The ID of the task to complete"}
                },
                "required": ["task_id"]
            }),
        },
        ToolSchema {
            name: "delete_task".to_string(),
            description: "Delete a task".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": {"type": "integer", "description": "The ID of the task to delete"}
                },
                "required": ["task_id"]
            }),
        },
    ]
}
