// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent resolution: message + history -> zero or more tool invocations.
//!
//! Two implementations of one capability -- the provider-backed resolver
//! here and the deterministic [`crate::fallback::FallbackResolver`] --
//! selected by a single policy decision in the engine: the provider path
//! runs first, and any provider error switches the turn to the fallback.

use std::sync::Arc;

use async_trait::async_trait;
use taskpilot_core::types::{ProviderMessage, ProviderRequest, ToolInvocation};
use taskpilot_core::{CompletionProvider, TaskpilotError};
use tracing::debug;

use crate::toolset;

/// The outcome of intent resolution: optional free text plus the tool
/// invocations to dispatch, in order.
#[derive(Debug, Clone, Default)]
pub struct IntentResolution {
    pub text: Option<String>,
    pub invocations: Vec<ToolInvocation>,
}

/// Maps a message plus conversation context to an [`IntentResolution`].
#[async_trait]
pub trait IntentResolver: Send + Sync {
    async fn resolve(
        &self,
        history: &[ProviderMessage],
        message: &str,
    ) -> Result<IntentResolution, TaskpilotError>;
}

/// Resolver backed by an external completion provider.
///
/// Sends the fixed system preamble, the assembled history, the current
/// message, and the five tool schemas. Returned tool-call payloads are
/// untrusted; the dispatcher validates them.
pub struct ProviderResolver {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    max_tokens: u32,
}

impl ProviderResolver {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: String, max_tokens: u32) -> Self {
        Self {
            provider,
            model,
            max_tokens,
        }
    }
}

#[async_trait]
impl IntentResolver for ProviderResolver {
    async fn resolve(
        &self,
        history: &[ProviderMessage],
        message: &str,
    ) -> Result<IntentResolution, TaskpilotError> {
        let mut messages = history.to_vec();
        messages.push(ProviderMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        let request = ProviderRequest {
            model: self.model.clone(),
            system_prompt: Some(toolset::SYSTEM_PREAMBLE.to_string()),
            messages,
            max_tokens: self.max_tokens,
            tools: Some(toolset::tool_schemas()),
        };

        let response = self.provider.complete(request).await?;
        debug!(
            tool_calls = response.tool_calls.len(),
            stop_reason = response.stop_reason.as_deref().unwrap_or(""),
            "provider resolution complete"
        );

        let invocations = response
            .tool_calls
            .into_iter()
            .map(|tc| ToolInvocation {
                name: tc.name,
                arguments: tc.input,
            })
            .collect();

        Ok(IntentResolution {
            text: response.text.filter(|t| !t.trim().is_empty()),
            invocations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_test_utils::MockProvider;

    #[tokio::test]
    async fn provider_text_and_tool_calls_are_mapped() {
        let provider = MockProvider::new();
        provider
            .push_tool_call("add_task", serde_json::json!({"title": "buy milk"}))
            .await;

        let resolver = ProviderResolver::new(Arc::new(provider), "test-model".into(), 256);
        let resolution = resolver.resolve(&[], "add a task to buy milk").await.unwrap();

        assert_eq!(resolution.invocations.len(), 1);
        assert_eq!(resolution.invocations[0].name, "add_task");
        assert_eq!(resolution.invocations[0].arguments["title"], "buy milk");
    }

    #[tokio::test]
    async fn provider_error_propagates_for_engine_fallback() {
        let provider = MockProvider::new();
        provider.push_failure("connection refused").await;

        let resolver = ProviderResolver::new(Arc::new(provider), "test-model".into(), 256);
        let err = resolver.resolve(&[], "list my tasks").await.unwrap_err();
        assert!(matches!(err, TaskpilotError::Provider { .. }));
    }

    #[tokio::test]
    async fn blank_provider_text_becomes_none() {
        let provider = MockProvider::new();
        provider.push_text("   ").await;

        let resolver = ProviderResolver::new(Arc::new(provider), "test-model".into(), 256);
        let resolution = resolver.resolve(&[], "hello").await.unwrap();
        assert!(resolution.text.is_none());
        assert!(resolution.invocations.is_empty());
    }
}
