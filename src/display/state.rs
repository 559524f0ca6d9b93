//! Display state and the pure reducers that advance it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::activity::{Activity, SystemStatus};
use super::usage::UsageStats;
use crate::event::AgentEvent;

/// Braille spinner, one glyph per clock tick.
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Reasoning effort selected for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    #[default]
    Off,
    Minimal,
    Low,
    Medium,
    High,
    Xhigh,
}

impl ThinkingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingLevel::Off => "off",
            ThinkingLevel::Minimal => "minimal",
            ThinkingLevel::Low => "low",
            ThinkingLevel::Medium => "medium",
            ThinkingLevel::High => "high",
            ThinkingLevel::Xhigh => "xhigh",
        }
    }
}

impl fmt::Display for ThinkingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model the session talks to, as far as the display cares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub reasoning: bool,
    /// Zero when unknown.
    pub context_window: u64,
}

/// Model details fixed at `start`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayModel {
    pub model: Option<ModelInfo>,
    pub thinking: ThinkingLevel,
}

impl DisplayModel {
    pub fn context_window(&self) -> u64 {
        self.model.as_ref().map_or(0, |m| m.context_window)
    }

    /// `id` or `id:level` when the model reasons and the level is not off.
    pub fn label(&self) -> Option<String> {
        let model = self.model.as_ref()?;
        if model.reasoning && self.thinking != ThinkingLevel::Off {
            Some(format!("{}:{}", model.id, self.thinking))
        } else {
            Some(model.id.clone())
        }
    }
}

/// Everything a frame is rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub model: DisplayModel,
    pub activity: Activity,
    pub usage: UsageStats,
    pub spinner: usize,
    home: Option<PathBuf>,
}

impl DisplayState {
    pub fn new(model: DisplayModel, home: Option<PathBuf>) -> Self {
        let usage = UsageStats::new(model.context_window());
        Self {
            model,
            activity: Activity::default(),
            usage,
            spinner: 0,
            home,
        }
    }

    /// State after `event`, or `None` when the event does not concern the display.
    pub fn reduce(&self, event: &AgentEvent) -> Option<DisplayState> {
        let mut next = self.clone();

        match event {
            AgentEvent::MessageStart { .. } => {
                event.assistant_message()?;
                next.activity = Activity::System(SystemStatus::Working);
            }
            AgentEvent::MessageUpdate { .. } => {
                let message = event.assistant_message()?;
                next.activity = self.activity.apply_message(message, self.home());
            }
            AgentEvent::MessageEnd { .. } => {
                let usage = event.assistant_message()?.usage?;
                next.usage = self.usage.record(&usage);
            }
            AgentEvent::AutoCompactionStart { reason } => {
                tracing::debug!(
                    reason = reason.as_deref().unwrap_or("unspecified"),
                    "context compaction started"
                );
                next.activity = Activity::System(SystemStatus::Compacting);
            }
            AgentEvent::AutoRetryStart {
                attempt,
                max_attempts,
            } => {
                next.activity = Activity::System(SystemStatus::Retrying {
                    attempt: *attempt,
                    max_attempts: *max_attempts,
                });
            }
            AgentEvent::Unknown => return None,
        }

        Some(next)
    }

    /// State after one clock tick.
    pub fn advance_spinner(&self) -> DisplayState {
        DisplayState {
            spinner: (self.spinner + 1) % SPINNER_FRAMES.len(),
            ..self.clone()
        }
    }

    pub fn spinner_glyph(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()]
    }

    fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ContentBlock, Cost, Message, Usage};

    fn assistant(content: Vec<ContentBlock>, usage: Option<Usage>) -> Message {
        Message {
            role: "assistant".into(),
            content,
            usage,
            ..Default::default()
        }
    }

    fn state() -> DisplayState {
        DisplayState::new(DisplayModel::default(), None)
    }

    #[test]
    fn test_initial_state() {
        let s = state();
        assert_eq!(s.activity, Activity::System(SystemStatus::Starting));
        assert_eq!(s.spinner, 0);
        assert!(!s.usage.has_stats());
    }

    #[test]
    fn test_message_start_sets_working() {
        let event = AgentEvent::MessageStart {
            message: assistant(vec![], None),
        };
        let next = state().reduce(&event).unwrap();
        assert_eq!(next.activity, Activity::System(SystemStatus::Working));
    }

    #[test]
    fn test_non_assistant_messages_are_ignored() {
        let user = Message {
            role: "user".into(),
            ..Default::default()
        };
        assert!(state()
            .reduce(&AgentEvent::MessageStart {
                message: user.clone()
            })
            .is_none());
        assert!(state()
            .reduce(&AgentEvent::MessageEnd { message: user })
            .is_none());
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert!(state().reduce(&AgentEvent::Unknown).is_none());
    }

    #[test]
    fn test_message_end_records_usage() {
        let usage = Usage {
            input: 10,
            output: 5,
            cost: Cost { total: 0.001 },
            ..Default::default()
        };
        let event = AgentEvent::MessageEnd {
            message: assistant(vec![], Some(usage)),
        };
        let next = state().reduce(&event).unwrap();
        assert_eq!(next.usage.totals().unwrap().input, 10);
        // Usage does not touch the activity line.
        assert_eq!(next.activity, state().activity);
    }

    #[test]
    fn test_lifecycle_events_set_system_status() {
        let compacting = state()
            .reduce(&AgentEvent::AutoCompactionStart { reason: None })
            .unwrap();
        assert_eq!(compacting.activity, Activity::System(SystemStatus::Compacting));

        let retrying = compacting
            .reduce(&AgentEvent::AutoRetryStart {
                attempt: 1,
                max_attempts: 3,
            })
            .unwrap();
        assert!(retrying.activity.is_retrying());
    }

    #[test]
    fn test_spinner_wraps() {
        let mut s = state();
        for _ in 0..SPINNER_FRAMES.len() {
            s = s.advance_spinner();
        }
        assert_eq!(s.spinner, 0);
        assert_eq!(s.advance_spinner().spinner_glyph(), "⠙");
    }

    #[test]
    fn test_model_label() {
        let mut model = DisplayModel {
            model: Some(ModelInfo {
                id: "claude-sonnet-4".into(),
                reasoning: true,
                context_window: 200_000,
            }),
            thinking: ThinkingLevel::High,
        };
        assert_eq!(model.label().as_deref(), Some("claude-sonnet-4:high"));

        model.thinking = ThinkingLevel::Off;
        assert_eq!(model.label().as_deref(), Some("claude-sonnet-4"));

        model.thinking = ThinkingLevel::Medium;
        if let Some(m) = model.model.as_mut() {
            m.reasoning = false;
        }
        assert_eq!(model.label().as_deref(), Some("claude-sonnet-4"));

        assert!(DisplayModel::default().label().is_none());
    }
}
