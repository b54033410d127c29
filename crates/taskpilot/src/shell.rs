// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive chat shell over the chat engine.
//!
//! Each line is one chat turn for the local user. Tool invocations and
//! their outcomes are printed below the assistant reply.

use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use taskpilot_agent::ChatEngine;
use taskpilot_anthropic::AnthropicProvider;
use taskpilot_config::TaskpilotConfig;
use taskpilot_core::{PluginAdapter, StorageAdapter, TaskpilotError};
use taskpilot_storage::SqliteStorage;
use tracing::info;

/// Run the interactive shell until EOF or interrupt.
pub async fn run(config: &TaskpilotConfig) -> Result<(), TaskpilotError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let provider = Arc::new(AnthropicProvider::new(config)?);
    let engine = ChatEngine::new(
        Arc::clone(&storage) as Arc<dyn StorageAdapter>,
        provider,
        config.anthropic.default_model.clone(),
        config.anthropic.max_tokens,
        config.agent.history_window,
    );

    let user_id = std::env::var("USER").unwrap_or_else(|_| "local".to_string());
    info!(user_id = user_id.as_str(), "chat shell starting");
    println!(
        "{} -- type a message, ctrl-d to exit",
        config.agent.name.bold()
    );

    let mut editor =
        DefaultEditor::new().map_err(|e| TaskpilotError::Internal(e.to_string()))?;

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                match engine.handle_chat_turn(&user_id, line, None).await {
                    Ok(reply) => {
                        println!("{}", reply.response);
                        for (call, result) in reply.tool_calls.iter().zip(&reply.tool_results) {
                            let marker = if result.success {
                                "ok".green()
                            } else {
                                "failed".red()
                            };
                            println!(
                                "  {} {} {}",
                                call.name.cyan(),
                                marker,
                                result.message.dimmed()
                            );
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", format!("error: {e}").red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    storage.shutdown().await?;
    Ok(())
}
