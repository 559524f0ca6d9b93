//! Reduces assistant messages into the single "current activity" shown on
//! the first status line.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use super::format::{normalize_whitespace, shorten_path, truncate_chars};
use crate::event::{ContentBlock, Message};

/// Character budget for the JSON fallback of unknown tools.
const FALLBACK_ARGS_CHARS: usize = 40;

/// Lifecycle status shown when there is no message content to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    Starting,
    Working,
    Compacting,
    Retrying { attempt: u32, max_attempts: u32 },
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemStatus::Starting => write!(f, "Starting..."),
            SystemStatus::Working => write!(f, "Working..."),
            SystemStatus::Compacting => write!(f, "Compacting context..."),
            SystemStatus::Retrying {
                attempt,
                max_attempts,
            } => write!(f, "Retrying ({}/{})...", attempt, max_attempts),
        }
    }
}

/// What the agent is doing right now. Later events replace earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Tool { name: String, detail: String },
    Thinking(String),
    Text(String),
    System(SystemStatus),
}

impl Default for Activity {
    fn default() -> Self {
        Activity::System(SystemStatus::Starting)
    }
}

impl Activity {
    /// Derive the activity from a message snapshot.
    ///
    /// Priority is the last tool call, then the last thinking block, then the
    /// last text block. Returns `None` when the message has nothing to show.
    pub fn from_message(message: &Message, home: Option<&Path>) -> Option<Activity> {
        let blocks = &message.content;

        let tool = blocks.iter().rev().find_map(|b| match b {
            ContentBlock::ToolCall { name, arguments } => Some(Activity::Tool {
                name: name.clone(),
                detail: format_tool_args(name, arguments, home),
            }),
            _ => None,
        });
        let thinking = || {
            blocks.iter().rev().find_map(|b| match b {
                ContentBlock::Thinking { thinking } => {
                    Some(Activity::Thinking(normalize_whitespace(thinking)))
                }
                _ => None,
            })
        };
        let text = || {
            blocks.iter().rev().find_map(|b| match b {
                ContentBlock::Text { text } => Some(Activity::Text(normalize_whitespace(text))),
                _ => None,
            })
        };

        tool.or_else(thinking).or_else(text)
    }

    /// Next activity after seeing `message`; unchanged if it has no content yet.
    pub fn apply_message(&self, message: &Message, home: Option<&Path>) -> Activity {
        Activity::from_message(message, home).unwrap_or_else(|| self.clone())
    }

    pub fn is_retrying(&self) -> bool {
        matches!(self, Activity::System(SystemStatus::Retrying { .. }))
    }
}

/// Render tool-call arguments for the activity line.
///
/// No width truncation happens here; the renderer cuts the finished line.
pub fn format_tool_args(name: &str, args: &Value, home: Option<&Path>) -> String {
    let path_or = |default: &str| {
        let path = str_arg(args, "path");
        shorten_path(if path.is_empty() { default } else { path }, home)
    };

    match name {
        "read" | "write" | "edit" => {
            let path = match str_arg(args, "path") {
                "" => str_arg(args, "file_path"),
                p => p,
            };
            shorten_path(path, home)
        }
        "ls" => path_or("."),
        "grep" => format!("/{}/ in {}", str_arg(args, "pattern"), path_or(".")),
        "find" => format!("{} in {}", str_arg(args, "pattern"), path_or(".")),
        "bash" => normalize_whitespace(str_arg(args, "command")),
        _ => {
            let json = serde_json::to_string(args).unwrap_or_default();
            truncate_chars(&json, FALLBACK_ARGS_CHARS)
        }
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or("")
}
