//! Shared CLI utility functions.
//!
//! Option handling that both subcommands need: logging setup, config
//! resolution and the model/width/color settings derived from it.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use crate::config::schema::MIN_WIDTH;
use crate::config::{self, DisplayConfig};
use crate::display::{Columns, DisplayModel, ModelInfo, ThinkingLevel};
use crate::event::AgentEvent;

/// Display options shared by `replay` and `frame`.
#[derive(ClapArgs, Debug, Default)]
pub struct DisplayArgs {
    /// Model id shown in the stats line
    #[arg(long)]
    pub model: Option<String>,

    /// Thinking level appended to the model id
    #[arg(long, value_enum, default_value_t = ThinkingLevel::Off)]
    pub thinking: ThinkingLevel,

    /// The model supports reasoning, so the thinking level is shown
    #[arg(long)]
    pub reasoning: bool,

    /// Context window of the model in tokens (requires --model)
    #[arg(long)]
    pub context_window: Option<u64>,

    /// Override terminal width (default: terminal, then $COLUMNS, then 80)
    #[arg(long, value_parser = clap::value_parser!(u16).range(MIN_WIDTH as i64..))]
    pub width: Option<u16>,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,

    /// Path to a config file (default: $AGENTLINE_CONFIG or ~/.config/agentline/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Display settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: DisplayModel,
    pub columns: Columns,
    pub tick: Duration,
    pub color: bool,
}

impl DisplayArgs {
    /// Load the config file and merge these flags over it. Flags win.
    pub fn settings(&self) -> Result<Settings> {
        let config = config::load(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("failed to load config from {}", path.display()),
            None => "failed to load config".to_string(),
        })?;
        Ok(self.merge(&config))
    }

    fn merge(&self, config: &DisplayConfig) -> Settings {
        let model = self.model.as_ref().map(|id| ModelInfo {
            id: id.clone(),
            reasoning: self.reasoning,
            context_window: self.context_window.unwrap_or(config.context_window),
        });

        let columns = match self.width.or(config.width) {
            Some(width) => Columns::Fixed(width),
            None => Columns::Detect,
        };

        Settings {
            model: DisplayModel {
                model,
                thinking: self.thinking,
            },
            columns,
            tick: config.tick_interval(),
            color: !self.no_color && config.color,
        }
    }
}

/// Pin styling for the stream the output goes to.
///
/// `colored` would otherwise decide from stdout alone, which is wrong for the
/// live frame on stderr when stdout is piped.
pub fn apply_color(enabled: bool, is_terminal: bool) {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    colored::control::set_override(color_enabled(enabled, no_color_env, is_terminal));
}

fn color_enabled(enabled: bool, no_color_env: bool, is_terminal: bool) -> bool {
    enabled && !no_color_env && is_terminal
}

/// Install the tracing subscriber. Without a level, logging stays off so the
/// live frame owns stderr.
pub fn init_tracing(log_level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    let Some(log_level) = log_level else {
        return Ok(());
    };

    let filter = match log_level {
        "off" => "off",
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        other => {
            eprintln!(
                "warning: unknown log level '{}', defaulting to 'warn'",
                other
            );
            "warn"
        }
    };

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init();
        }
    }

    Ok(())
}

/// Parse one JSONL line. Blank lines yield `None`; malformed ones are logged
/// and yield `None` as well.
pub fn parse_line(line: &str, line_no: usize) -> Option<AgentEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match AgentEvent::from_json(line) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::warn!(line = line_no, error = %err, "skipping malformed event");
            None
        }
    }
}

/// Whether stderr is attached to a terminal.
pub fn stderr_is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Whether stdout is attached to a terminal.
pub fn stdout_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = DisplayArgs {
            model: Some("gpt-5".into()),
            reasoning: true,
            thinking: ThinkingLevel::Low,
            context_window: Some(400_000),
            width: Some(100),
            ..Default::default()
        };
        let config = DisplayConfig {
            context_window: 128_000,
            width: Some(60),
            tick_interval_ms: 50,
            ..Default::default()
        };

        let settings = args.merge(&config);
        assert_eq!(settings.columns, Columns::Fixed(100));
        assert_eq!(settings.model.context_window(), 400_000);
        assert_eq!(settings.model.label().as_deref(), Some("gpt-5:low"));
        assert_eq!(settings.tick, Duration::from_millis(50));
        assert!(settings.color);
    }

    #[test]
    fn test_config_fills_unset_flags() {
        let args = DisplayArgs {
            model: Some("gpt-5".into()),
            ..Default::default()
        };
        let config = DisplayConfig {
            context_window: 128_000,
            width: Some(60),
            color: false,
            ..Default::default()
        };

        let settings = args.merge(&config);
        assert_eq!(settings.columns, Columns::Fixed(60));
        assert_eq!(settings.model.context_window(), 128_000);
        assert!(!settings.color);
    }

    #[test]
    fn test_no_model_means_no_label() {
        let settings = DisplayArgs::default().merge(&DisplayConfig::default());
        assert!(settings.model.label().is_none());
        assert_eq!(settings.columns, Columns::Detect);
    }

    #[test]
    fn test_no_color_flag() {
        let args = DisplayArgs {
            no_color: true,
            ..Default::default()
        };
        assert!(!args.merge(&DisplayConfig::default()).color);
    }

    #[test]
    fn test_color_follows_target_stream() {
        // stderr on a terminal keeps color even when stdout is piped
        assert!(color_enabled(true, false, true));
        assert!(!color_enabled(true, false, false));
        assert!(!color_enabled(true, true, true));
        assert!(!color_enabled(false, false, true));
    }

    #[test]
    fn test_parse_line_skips_blank_and_malformed() {
        assert!(parse_line("   ", 1).is_none());
        assert!(parse_line("{not json", 2).is_none());
        assert_eq!(
            parse_line(r#"{"type":"auto_compaction_start"}"#, 3),
            Some(AgentEvent::AutoCompactionStart { reason: None })
        );
    }
}
