// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat turn engine: one inbound message in, one reply envelope out.
//!
//! Pipeline per turn: resolve the conversation, assemble context, run the
//! provider-backed resolver (switching to the deterministic fallback on
//! any provider error), dispatch the resulting tool invocations strictly
//! in order, then assemble and persist the assistant reply.
//!
//! The engine is stateless across invocations except for the persisted
//! conversation, message, and task records it reads and writes.

use std::sync::Arc;

use taskpilot_core::types::{ChatReply, Conversation, NewMessage};
use taskpilot_core::{CompletionProvider, StorageAdapter, TaskpilotError};
use tracing::{debug, warn};

use crate::context;
use crate::dispatch::ToolDispatcher;
use crate::fallback::FallbackResolver;
use crate::resolver::{IntentResolver, ProviderResolver};

/// Maximum persisted message content length, in characters.
pub const MAX_MESSAGE_CONTENT: usize = 10_000;

/// Drives a single chat turn end to end.
pub struct ChatEngine {
    storage: Arc<dyn StorageAdapter>,
    primary: ProviderResolver,
    fallback: FallbackResolver,
    dispatcher: ToolDispatcher,
    history_window: usize,
}

impl ChatEngine {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        provider: Arc<dyn CompletionProvider>,
        model: String,
        max_tokens: u32,
        history_window: usize,
    ) -> Self {
        Self {
            primary: ProviderResolver::new(provider, model, max_tokens),
            fallback: FallbackResolver::new(),
            dispatcher: ToolDispatcher::new(Arc::clone(&storage)),
            storage,
            history_window,
        }
    }

    /// Handle one chat turn for an authenticated user.
    ///
    /// With `conversation_id` set, the conversation must belong to the
    /// user; an absent and a foreign conversation are indistinguishable
    /// ([`TaskpilotError::NotFoundOrForbidden`]). Without it, the user's
    /// active conversation is used, or a new one is created.
    ///
    /// Provider failures never surface here: the fallback parser takes
    /// over and the turn still produces a reply. Individual tool failures
    /// are captured in their [`taskpilot_core::ToolResult`] and the reply
    /// is assembled best-effort.
    pub async fn handle_chat_turn(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<i64>,
    ) -> Result<ChatReply, TaskpilotError> {
        if user_id.trim().is_empty() {
            return Err(TaskpilotError::Validation(
                "user id must not be empty".to_string(),
            ));
        }

        let conversation = self.resolve_conversation(user_id, conversation_id).await?;

        // Context first: the window covers prior turns, not the inbound
        // message, which both resolver paths receive separately.
        let history =
            context::assemble_history(self.storage.as_ref(), conversation.id, self.history_window)
                .await?;

        self.storage
            .insert_message(&NewMessage {
                conversation_id: conversation.id,
                role: "user".to_string(),
                content: clamp_content(message).to_string(),
                tool_calls: None,
                tool_results: None,
                created_at: chrono::Utc::now().to_rfc3339(),
            })
            .await?;
        debug!(conversation_id = conversation.id, "persisted user message");

        let resolution = match self.primary.resolve(&history, message).await {
            Ok(resolution) => resolution,
            Err(e) => {
                // Degraded mode: availability over intelligence. The turn
                // must not dead-end because the provider is unreachable.
                warn!(error = %e, "provider unavailable, using fallback parser");
                self.fallback.resolve(&history, message).await?
            }
        };

        let (tool_calls, tool_results) = self
            .dispatcher
            .dispatch_all(resolution.invocations, user_id)
            .await;

        let response = resolution
            .text
            .or_else(|| tool_results.last().map(|r| r.message.clone()))
            .unwrap_or_default();

        let tool_calls_json = if tool_calls.is_empty() {
            None
        } else {
            Some(to_json(&tool_calls)?)
        };
        let tool_results_json = if tool_results.is_empty() {
            None
        } else {
            Some(to_json(&tool_results)?)
        };

        let message_id = self
            .storage
            .insert_message(&NewMessage {
                conversation_id: conversation.id,
                role: "assistant".to_string(),
                content: clamp_content(&response).to_string(),
                tool_calls: tool_calls_json,
                tool_results: tool_results_json,
                created_at: chrono::Utc::now().to_rfc3339(),
            })
            .await?;
        debug!(
            conversation_id = conversation.id,
            message_id,
            tools = tool_calls.len(),
            "persisted assistant reply"
        );

        Ok(ChatReply {
            response,
            tool_calls,
            tool_results,
            conversation_id: conversation.id,
            message_id,
        })
    }

    /// Verify an explicit conversation id, or get-or-create the user's
    /// active conversation.
    async fn resolve_conversation(
        &self,
        user_id: &str,
        conversation_id: Option<i64>,
    ) -> Result<Conversation, TaskpilotError> {
        match conversation_id {
            Some(id) => match self.storage.get_conversation(id).await? {
                Some(conversation) if conversation.user_id == user_id => Ok(conversation),
                // Absent and foreign-owned collapse into one outcome.
                _ => Err(TaskpilotError::NotFoundOrForbidden {
                    resource: "conversation".to_string(),
                }),
            },
            None => match self.storage.get_active_conversation(user_id).await? {
                Some(conversation) => Ok(conversation),
                None => self.storage.create_conversation(user_id).await,
            },
        }
    }
}

/// Truncate message content to the persisted bound, on a char boundary.
fn clamp_content(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CONTENT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, TaskpilotError> {
    serde_json::to_string(value)
        .map_err(|e| TaskpilotError::Internal(format!("attachment serialization failed: {e}")))
}
