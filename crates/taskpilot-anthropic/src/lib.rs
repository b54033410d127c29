// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude completion provider for the Taskpilot engine.
//!
//! This crate implements [`CompletionProvider`] for the Anthropic Messages
//! API. The engine makes exactly one completion call per chat turn, so only
//! the non-streaming endpoint is used.

pub mod client;
pub mod types;

use async_trait::async_trait;
use taskpilot_config::TaskpilotConfig;
use taskpilot_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage, ToolCallRequest,
};
use taskpilot_core::{CompletionProvider, PluginAdapter, TaskpilotError};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, ResponseContentBlock, ToolDefinition};

/// Anthropic Claude provider implementing [`CompletionProvider`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from the given configuration.
    pub fn new(config: &TaskpilotConfig) -> Result<Self, TaskpilotError> {
        let api_key = resolve_api_key(&config.anthropic.api_key)?;
        let client = AnthropicClient::new(
            api_key,
            config.anthropic.api_version.clone(),
            config.anthropic.default_model.clone(),
        )?;

        info!(
            model = %config.anthropic.default_model,
            "Anthropic provider initialized"
        );

        Ok(Self { client })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Converts a [`ProviderRequest`] to an Anthropic [`MessageRequest`].
    ///
    /// The Messages API only accepts "user" and "assistant" roles; any
    /// other stored role is sent as "user".
    fn to_message_request(&self, request: &ProviderRequest) -> MessageRequest {
        let messages: Vec<ApiMessage> = request
            .messages
            .iter()
            .map(|m| ApiMessage {
                role: if m.role == "assistant" {
                    "assistant".to_string()
                } else {
                    "user".to_string()
                },
                content: m.content.clone(),
            })
            .collect();

        let tools = request.tools.as_ref().map(|schemas| {
            schemas
                .iter()
                .map(|s| ToolDefinition {
                    name: s.name.clone(),
                    description: s.description.clone(),
                    input_schema: s.input_schema.clone(),
                })
                .collect::<Vec<_>>()
        });

        MessageRequest {
            model: request.model.clone(),
            messages,
            system: request.system_prompt.clone(),
            max_tokens: request.max_tokens,
            tools,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TaskpilotError> {
        // A full check would make a lightweight API call, but we avoid
        // consuming tokens on health checks.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaskpilotError> {
        debug!("Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, TaskpilotError> {
        let api_request = self.to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                ResponseContentBlock::Text { text } => text_parts.push(text),
                ResponseContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCallRequest { id, name, input });
                }
            }
        }
        let text = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join(""))
        };

        Ok(ProviderResponse {
            id: response.id,
            text,
            tool_calls,
            model: response.model,
            stop_reason: response.stop_reason,
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
                cache_read_tokens: response.usage.cache_read_input_tokens,
                cache_creation_tokens: response.usage.cache_creation_input_tokens,
            },
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, TaskpilotError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        TaskpilotError::Config(
            "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::types::{ProviderMessage, ToolSchema};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_provider(base_url: &str) -> AnthropicProvider {
        let client = AnthropicClient::new(
            "test-key".into(),
            "2023-06-01".into(),
            "claude-sonnet-4-20250514".into(),
        )
        .unwrap()
        .with_base_url(base_url.to_string());
        AnthropicProvider::with_client(client)
    }

    fn test_request() -> ProviderRequest {
        ProviderRequest {
            model: "claude-sonnet-4-20250514".into(),
            system_prompt: Some("You manage tasks.".into()),
            messages: vec![ProviderMessage {
                role: "user".into(),
                content: "add a task to buy milk".into(),
            }],
            max_tokens: 1024,
            tools: Some(vec![ToolSchema {
                name: "add_task".into(),
                description: "Add a new task to the user's list".into(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {"title": {"type": "string"}},
                    "required": ["title"]
                }),
            }]),
        }
    }

    #[test]
    fn resolve_api_key_from_config() {
        let result = resolve_api_key(&Some("sk-test-123".into()));
        assert_eq!(result.unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        let result = resolve_api_key(&Some("".into()));
        // Will fail unless ANTHROPIC_API_KEY is set, which is fine for tests.
        // We just verify it doesn't return the empty string.
        if let Ok(key) = result {
            assert!(!key.is_empty());
        }
    }

    #[test]
    fn resolve_api_key_none_reports_missing() {
        let result = resolve_api_key(&None);
        if let Err(err) = result {
            assert!(err.to_string().contains("API key not found"));
        }
    }

    #[test]
    fn to_message_request_conversion() {
        let provider = test_provider("http://unused");
        let api_req = provider.to_message_request(&test_request());

        assert_eq!(api_req.model, "claude-sonnet-4-20250514");
        assert_eq!(api_req.max_tokens, 1024);
        assert_eq!(api_req.system.as_deref(), Some("You manage tasks."));
        assert_eq!(api_req.messages.len(), 1);
        assert_eq!(api_req.messages[0].role, "user");
        let tools = api_req.tools.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "add_task");
    }

    #[test]
    fn to_message_request_maps_system_role_to_user() {
        let provider = test_provider("http://unused");
        let request = ProviderRequest {
            model: "claude-sonnet-4-20250514".into(),
            system_prompt: None,
            messages: vec![
                ProviderMessage {
                    role: "system".into(),
                    content: "note".into(),
                },
                ProviderMessage {
                    role: "assistant".into(),
                    content: "hi".into(),
                },
            ],
            max_tokens: 512,
            tools: None,
        };
        let api_req = provider.to_message_request(&request);
        assert_eq!(api_req.messages[0].role, "user");
        assert_eq!(api_req.messages[1].role, "assistant");
    }

    #[tokio::test]
    async fn complete_extracts_text_and_tool_calls() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Adding that now."},
                {"type": "tool_use", "id": "toolu_1", "name": "add_task", "input": {"title": "buy milk"}}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 15}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let response = provider.complete(test_request()).await.unwrap();

        assert_eq!(response.text.as_deref(), Some("Adding that now."));
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "add_task");
        assert_eq!(response.tool_calls[0].input["title"], "buy milk");
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(response.usage.input_tokens, 20);
    }

    #[tokio::test]
    async fn complete_with_text_only_has_no_tool_calls() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "msg_2",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Hello!"}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 3}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let response = provider.complete(test_request()).await.unwrap();

        assert_eq!(response.text.as_deref(), Some("Hello!"));
        assert!(response.tool_calls.is_empty());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = test_provider("http://unused");
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.version(), semver::Version::new(0, 1, 0));
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
    }
}
