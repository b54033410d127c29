// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic keyword/regex intent parser.
//!
//! Used whenever the completion provider is unavailable. A total function
//! from message text to `{intent, slots}`: every input resolves to exactly
//! one [`ParsedIntent`], with [`ParsedIntent::Unknown`] as the default.
//!
//! Intents are checked in a fixed precedence order (first matching keyword
//! rule wins). Create keywords like "task" appear in nearly every request,
//! so Create is checked first and is self-limiting through its
//! title-extraction failure path: a matched rule whose slot extraction
//! fails resolves to Unknown without consulting later rules.

use async_trait::async_trait;
use regex::Regex;
use taskpilot_core::types::{ProviderMessage, ToolInvocation};
use taskpilot_core::TaskpilotError;

use crate::resolver::{IntentResolution, IntentResolver};

/// The five recognizable intents, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Create,
    List,
    Complete,
    Update,
    Delete,
}

/// A fully parsed intent with its extracted slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedIntent {
    Create {
        title: String,
        description: Option<String>,
    },
    List,
    Complete {
        task_id: i64,
    },
    Update {
        task_id: i64,
        title: Option<String>,
    },
    Delete {
        task_id: i64,
    },
    Unknown,
}

/// One entry in the ordered intent table: an intent plus the whole-word
/// keywords that trigger it.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub kind: IntentKind,
    pub keywords: &'static [&'static str],
}

pub const CREATE_KEYWORDS: &[&str] = &["create", "add", "make", "new", "task", "todo"];
pub const LIST_KEYWORDS: &[&str] = &["list", "show", "view", "my", "tasks", "todos"];
pub const COMPLETE_KEYWORDS: &[&str] = &["complete", "done", "finish", "mark"];
pub const UPDATE_KEYWORDS: &[&str] = &["update", "change", "edit", "modify"];
pub const DELETE_KEYWORDS: &[&str] = &["delete", "remove", "cancel"];

/// The default rule table, in the fixed precedence order.
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule {
            kind: IntentKind::Create,
            keywords: CREATE_KEYWORDS,
        },
        IntentRule {
            kind: IntentKind::List,
            keywords: LIST_KEYWORDS,
        },
        IntentRule {
            kind: IntentKind::Complete,
            keywords: COMPLETE_KEYWORDS,
        },
        IntentRule {
            kind: IntentKind::Update,
            keywords: UPDATE_KEYWORDS,
        },
        IntentRule {
            kind: IntentKind::Delete,
            keywords: DELETE_KEYWORDS,
        },
    ]
}

/// Keyword/regex classifier with an immutable, injectable rule table.
pub struct FallbackParser {
    rules: Vec<IntentRule>,
    // Title extraction cascade, first match wins.
    task_to: Regex,
    command_title: Regex,
    bare_task_to: Regex,
    command_tail: Regex,
    leading_command: Regex,
    description: Regex,
    integer: Regex,
    update_title: Regex,
}

impl FallbackParser {
    /// Build a parser over the default rule table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Build a parser over a custom ordered rule table.
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self {
            rules,
            task_to: Regex::new(
                r"(?:create|add|make|new|task|todo)\s+(?:a\s+|the\s+)?(?:task|todo)\s+to\s+(.+?)(?:\s+and\b|$)",
            )
            .expect("static regex"),
            command_title: Regex::new(r"(?:create|add|make|new)\s+(.+?)(?:\s+to\s+.*)?$")
                .expect("static regex"),
            bare_task_to: Regex::new(r"(?:task|todo)\s+to\s+(.+?)(?:\s+and\b|$)")
                .expect("static regex"),
            command_tail: Regex::new(r"(?:create|add|make|new|task|todo)\s+(.+)$")
                .expect("static regex"),
            leading_command: Regex::new(r"^(?:create|add|make|new|task|todo)\b\s*")
                .expect("static regex"),
            description: Regex::new(r"(?i)\b(?:for|because|description:)\s*(.+)$")
                .expect("static regex"),
            integer: Regex::new(r"\b(\d+)\b").expect("static regex"),
            update_title: Regex::new(r"\b(?:to|as|new|called)\s+(.+?)(?:\s+and\b|$)")
                .expect("static regex"),
        }
    }

    /// Classify a message. Total: every input yields a ParsedIntent.
    pub fn parse(&self, message: &str) -> ParsedIntent {
        let raw = message.trim();
        let lower = raw.to_lowercase();

        for rule in &self.rules {
            if !has_keyword(&lower, rule.keywords) {
                continue;
            }
            // First matching rule wins; extraction failure lands on Unknown.
            return match rule.kind {
                IntentKind::Create => self.extract_create(&lower, raw),
                IntentKind::List => ParsedIntent::List,
                IntentKind::Complete => match self.first_integer(raw) {
                    Some(task_id) => ParsedIntent::Complete { task_id },
                    None => ParsedIntent::Unknown,
                },
                IntentKind::Update => match self.first_integer(raw) {
                    Some(task_id) => ParsedIntent::Update {
                        task_id,
                        title: self.extract_update_title(raw),
                    },
                    None => ParsedIntent::Unknown,
                },
                IntentKind::Delete => match self.first_integer(raw) {
                    Some(task_id) => ParsedIntent::Delete { task_id },
                    None => ParsedIntent::Unknown,
                },
            };
        }

        ParsedIntent::Unknown
    }

    /// Map a message to a resolution: zero or one tool invocation plus,
    /// for Unknown, an echo acknowledgment.
    ///
    /// Invocations never carry a `user_id`; the dispatcher injects the
    /// authenticated one.
    pub fn resolve(&self, message: &str) -> IntentResolution {
        match self.parse(message) {
            ParsedIntent::Create { title, description } => {
                let mut arguments = serde_json::json!({ "title": title });
                if let Some(description) = description {
                    arguments["description"] = serde_json::Value::String(description);
                }
                IntentResolution {
                    text: None,
                    invocations: vec![ToolInvocation {
                        name: "add_task".to_string(),
                        arguments,
                    }],
                }
            }
            ParsedIntent::List => IntentResolution {
                text: None,
                invocations: vec![ToolInvocation {
                    name: "list_tasks".to_string(),
                    arguments: serde_json::json!({}),
                }],
            },
            ParsedIntent::Complete { task_id } => IntentResolution {
                text: None,
                invocations: vec![ToolInvocation {
                    name: "complete_task".to_string(),
                    arguments: serde_json::json!({ "task_id": task_id }),
                }],
            },
            ParsedIntent::Update { task_id, title } => {
                let mut arguments = serde_json::json!({ "task_id": task_id });
                if let Some(title) = title {
                    arguments["title"] = serde_json::Value::String(title);
                }
                IntentResolution {
                    text: None,
                    invocations: vec![ToolInvocation {
                        name: "update_task".to_string(),
                        arguments,
                    }],
                }
            }
            ParsedIntent::Delete { task_id } => IntentResolution {
                text: None,
                invocations: vec![ToolInvocation {
                    name: "delete_task".to_string(),
                    arguments: serde_json::json!({ "task_id": task_id }),
                }],
            },
            ParsedIntent::Unknown => IntentResolution {
                text: Some(format!(
                    "I understood your request: '{message}'. You can ask me to create, list, update, complete, or delete tasks."
                )),
                invocations: vec![],
            },
        }
    }

    /// Title extraction cascade for Create, on the lowercased message.
    fn extract_create(&self, lower: &str, raw: &str) -> ParsedIntent {
        let extracted = if let Some(c) = self.task_to.captures(lower) {
            c[1].to_string()
        } else if let Some(c) = self.command_title.captures(lower) {
            c[1].to_string()
        } else if let Some(c) = self.bare_task_to.captures(lower) {
            c[1].to_string()
        } else if let Some(c) = self.command_tail.captures(lower) {
            c[1].to_string()
        } else {
            self.leading_command.replace(lower, "").to_string()
        };

        let title = strip_leading_filler(extracted.trim()).trim().to_string();
        if title.is_empty() {
            // Never emit Create with a blank title.
            return ParsedIntent::Unknown;
        }

        let description = self
            .description
            .captures(raw)
            .map(|c| c[1].trim().to_string());

        ParsedIntent::Create { title, description }
    }

    fn extract_update_title(&self, raw: &str) -> Option<String> {
        self.update_title
            .captures(raw)
            .map(|c| c[1].trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// First integer literal in the message, if any.
    fn first_integer(&self, raw: &str) -> Option<i64> {
        self.integer
            .captures(raw)
            .and_then(|c| c[1].parse::<i64>().ok())
    }
}

impl Default for FallbackParser {
    fn default() -> Self {
        Self::new()
    }
}

/// True when any whole word of the message is in the keyword set.
fn has_keyword(lower: &str, keywords: &[&str]) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| keywords.contains(&w))
}

/// Strip at most one leading filler word left behind by extraction.
fn strip_leading_filler(title: &str) -> &str {
    for prefix in ["to ", "task ", "a ", "the "] {
        if let Some(rest) = title.strip_prefix(prefix) {
            return rest;
        }
    }
    title
}

/// The degraded-mode resolver: wraps [`FallbackParser`] behind the same
/// capability as the provider-backed path. Infallible by construction.
pub struct FallbackResolver {
    parser: FallbackParser,
}

impl FallbackResolver {
    pub fn new() -> Self {
        Self {
            parser: FallbackParser::new(),
        }
    }
}

impl Default for FallbackResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentResolver for FallbackResolver {
    async fn resolve(
        &self,
        _history: &[ProviderMessage],
        message: &str,
    ) -> Result<IntentResolution, TaskpilotError> {
        Ok(self.parser.resolve(message))
    }
}
