// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for LLM integrations.

use async_trait::async_trait;

use crate::error::TaskpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for completion provider integrations.
///
/// The engine makes exactly one completion call per chat turn. Any error
/// from this trait -- network failure, malformed response, auth/quota --
/// is treated identically by the caller as "provider unavailable" and
/// triggers the fallback intent parser.
#[async_trait]
pub trait CompletionProvider: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest)
        -> Result<ProviderResponse, TaskpilotError>;
}
