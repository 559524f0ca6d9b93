use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::DEFAULT_TICK;

const MIN_TICK_MS: u64 = 16;
const SLOW_TICK_MS: u64 = 1000;
/// Narrowest column budget accepted from the config file or `--width`.
pub const MIN_WIDTH: u16 = 10;

/// Settings for the live status display. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Spinner tick interval in milliseconds.
    pub tick_interval_ms: u64,

    /// Context window assumed when the model does not report one. 0 hides
    /// the context segment.
    pub context_window: u64,

    /// Fixed column budget. Unset means the terminal width is measured.
    pub width: Option<u16>,

    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK.as_millis() as u64,
            context_window: 0,
            width: None,
            color: true,
        }
    }
}

/// A message produced during config validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigMessage {
    Warning(String),
    Error(String),
}

impl DisplayConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check value ranges. Errors make the config unusable; warnings do not.
    pub fn validate(&self) -> Vec<ConfigMessage> {
        let mut messages = Vec::new();

        if self.tick_interval_ms < MIN_TICK_MS {
            messages.push(ConfigMessage::Error(format!(
                "tick_interval_ms must be at least {} (got {})",
                MIN_TICK_MS, self.tick_interval_ms
            )));
        } else if self.tick_interval_ms > SLOW_TICK_MS {
            messages.push(ConfigMessage::Warning(format!(
                "tick_interval_ms of {} makes the spinner look stalled",
                self.tick_interval_ms
            )));
        }

        if let Some(width) = self.width {
            if width < MIN_WIDTH {
                messages.push(ConfigMessage::Error(format!(
                    "width must be at least {} columns (got {})",
                    MIN_WIDTH, width
                )));
            }
        }

        messages
    }
}
