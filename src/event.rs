//! Agent session events consumed by the status display.
//!
//! Only the fields the display needs are modelled. Unknown event types and
//! unknown content blocks deserialize to catch-all variants so that newer
//! producers never break an older display.

use serde::{Deserialize, Deserializer};

use crate::error::AgentlineError;

pub const ASSISTANT_ROLE: &str = "assistant";

/// One event from the agent session engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    MessageStart {
        message: Message,
    },
    MessageUpdate {
        message: Message,
    },
    MessageEnd {
        message: Message,
    },
    AutoCompactionStart {
        #[serde(default)]
        reason: Option<String>,
    },
    AutoRetryStart {
        #[serde(default)]
        attempt: u32,
        #[serde(default, rename = "maxAttempts")]
        max_attempts: u32,
    },
    #[serde(other)]
    Unknown,
}

impl AgentEvent {
    /// Parse one line of a JSONL event stream.
    pub fn from_json(line: &str) -> Result<Self, AgentlineError> {
        Ok(serde_json::from_str(line)?)
    }

    /// The assistant message carried by this event, if any.
    pub fn assistant_message(&self) -> Option<&Message> {
        match self {
            AgentEvent::MessageStart { message }
            | AgentEvent::MessageUpdate { message }
            | AgentEvent::MessageEnd { message } => Some(message).filter(|m| m.is_assistant()),
            _ => None,
        }
    }
}

/// A (possibly partial) conversation message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "content_blocks")]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Message {
    pub fn is_assistant(&self) -> bool {
        self.role == ASSISTANT_ROLE
    }

    /// Concatenated text of all text blocks, in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the message ended because the request failed or was aborted.
    pub fn is_failed(&self) -> bool {
        matches!(self.stop_reason.as_deref(), Some("error") | Some("aborted"))
    }
}

/// One block of message content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    ToolCall {
        #[serde(default)]
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// Token usage reported on a completed message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Usage {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub cost: Cost,
}

impl Usage {
    /// Total token footprint of the message.
    pub fn total_tokens(&self) -> u64 {
        self.input
            .saturating_add(self.output)
            .saturating_add(self.cache_read)
            .saturating_add(self.cache_write)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Cost {
    pub total: f64,
}

/// User messages may carry plain string content instead of blocks.
fn content_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawContent {
        Plain(String),
        Blocks(Vec<ContentBlock>),
    }

    Ok(match Option::<RawContent>::deserialize(deserializer)? {
        Some(RawContent::Plain(text)) => vec![ContentBlock::Text { text }],
        Some(RawContent::Blocks(blocks)) => blocks,
        None => Vec::new(),
    })
}
