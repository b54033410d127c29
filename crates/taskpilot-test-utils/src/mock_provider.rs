// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements `CompletionProvider` with pre-scripted
//! outcomes, enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use taskpilot_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage, ToolCallRequest,
};
use taskpilot_core::{CompletionProvider, PluginAdapter, TaskpilotError};

/// One scripted outcome for a `complete` call.
enum ScriptedOutcome {
    Text(String),
    ToolCalls {
        text: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
    Failure(String),
}

/// A mock completion provider that pops pre-scripted outcomes from a
/// FIFO queue. When the queue is empty, a default text response is
/// returned.
pub struct MockProvider {
    outcomes: Arc<Mutex<VecDeque<ScriptedOutcome>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty outcome queue.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from([ScriptedOutcome::Text(
                text.into(),
            )]))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a plain text response.
    pub async fn push_text(&self, text: impl Into<String>) {
        self.outcomes
            .lock()
            .await
            .push_back(ScriptedOutcome::Text(text.into()));
    }

    /// Queue a single tool call with no accompanying text.
    pub async fn push_tool_call(&self, name: &str, input: serde_json::Value) {
        self.push_tool_calls(None, vec![(name.to_string(), input)])
            .await;
    }

    /// Queue a response carrying optional text plus tool calls in order.
    pub async fn push_tool_calls(
        &self,
        text: Option<String>,
        calls: Vec<(String, serde_json::Value)>,
    ) {
        let calls = calls
            .into_iter()
            .map(|(name, input)| ToolCallRequest {
                id: format!("toolu_{}", uuid::Uuid::new_v4().simple()),
                name,
                input,
            })
            .collect();
        self.outcomes
            .lock()
            .await
            .push_back(ScriptedOutcome::ToolCalls { text, calls });
    }

    /// Queue a provider failure (degraded-mode trigger).
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.outcomes
            .lock()
            .await
            .push_back(ScriptedOutcome::Failure(message.into()));
    }

    /// Requests observed so far, in call order.
    pub async fn recorded_requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TaskpilotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaskpilotError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, TaskpilotError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);

        let outcome = self.outcomes.lock().await.pop_front();
        let (text, tool_calls) = match outcome {
            Some(ScriptedOutcome::Text(text)) => (Some(text), vec![]),
            Some(ScriptedOutcome::ToolCalls { text, calls }) => (text, calls),
            Some(ScriptedOutcome::Failure(message)) => {
                return Err(TaskpilotError::Provider {
                    message,
                    source: None,
                });
            }
            None => (Some("mock response".to_string()), vec![]),
        };

        let stop_reason = if tool_calls.is_empty() {
            "end_turn"
        } else {
            "tool_use"
        };

        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            text,
            tool_calls,
            model,
            stop_reason: Some(stop_reason.to_string()),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
                cache_read_tokens: 0,
                cache_creation_tokens: 0,
            },
        })
    }
}
