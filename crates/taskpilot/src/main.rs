// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Taskpilot - a chat-driven task assistant.
//!
//! This is the binary entry point for the Taskpilot CLI.

mod shell;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Taskpilot - a chat-driven task assistant.
#[derive(Parser, Debug)]
#[command(name = "taskpilot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat shell.
    Shell,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match taskpilot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            taskpilot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    match cli.command {
        Some(Commands::Shell) => {
            if let Err(e) = shell::run(&config).await {
                eprintln!("taskpilot: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            let mut redacted = config.clone();
            if redacted.anthropic.api_key.is_some() {
                redacted.anthropic.api_key = Some("<redacted>".to_string());
            }
            match toml::to_string_pretty(&redacted) {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    eprintln!("taskpilot: failed to render config: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("taskpilot: use --help for available commands");
        }
    }
}

/// RUST_LOG takes precedence; the configured level is the fallback.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = taskpilot_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "taskpilot");
    }
}
