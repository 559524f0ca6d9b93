//! Frame composition and the in-place terminal redraw protocol.
//!
//! The renderer owns four physical lines: blank, activity, stats, blank.
//! After every render the cursor rests at the start of the trailing blank
//! line; a repaint moves up three lines and rewrites all four, clearing each
//! one before writing it.

use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;

use super::activity::Activity;
use super::ansi::truncate_to_width;
use super::format::{format_elapsed, format_tokens, single_line};
use super::state::DisplayState;
use super::usage::UsageStats;

/// Shown in place of a measurement that has not arrived yet.
pub const PLACEHOLDER: &str = "---";

const CLEAR_LINE: &str = "\x1b[K";
const OWNED_LINES: usize = 4;
const DEFAULT_COLUMNS: u16 = 80;

/// Where the column budget comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Columns {
    /// Terminal on stderr, then `$COLUMNS`, then 80. Measured on every render.
    Detect,
    Fixed(u16),
}

impl Columns {
    pub fn resolve(&self) -> usize {
        match self {
            Columns::Fixed(width) => *width as usize,
            Columns::Detect => detect_columns() as usize,
        }
    }
}

fn detect_columns() -> u16 {
    let terminal = terminal_size::terminal_size_of(io::stderr()).map(|(w, _)| w.0);
    pick_columns(terminal, std::env::var("COLUMNS").ok().as_deref())
}

fn pick_columns(terminal: Option<u16>, env: Option<&str>) -> u16 {
    terminal
        .filter(|w| *w > 0)
        .or_else(|| env.and_then(|cols| cols.trim().parse::<u16>().ok()).filter(|w| *w > 0))
        .unwrap_or(DEFAULT_COLUMNS)
}

/// Context occupancy severity, by percentage of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLevel {
    Normal,
    Warning,
    Critical,
}

impl ContextLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent > 90.0 {
            ContextLevel::Critical
        } else if percent > 70.0 {
            ContextLevel::Warning
        } else {
            ContextLevel::Normal
        }
    }
}

/// The two width-bounded status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub activity: String,
    pub stats: String,
}

/// Build both lines for `state`, each cut to `width` visible columns.
pub fn compose(state: &DisplayState, elapsed: Duration, width: usize) -> Frame {
    Frame {
        activity: truncate_to_width(&activity_line(state), width),
        stats: truncate_to_width(&stats_line(state, elapsed), width),
    }
}

fn activity_line(state: &DisplayState) -> String {
    let glyph = state.spinner_glyph();
    let spinner = if state.activity.is_retrying() {
        glyph.yellow()
    } else {
        glyph.cyan()
    };

    // Anything that would move the cursor breaks the fixed line count of a repaint.
    let (label, detail) = match &state.activity {
        Activity::Tool { name, detail } => (
            Some(format!("[{}]", single_line(name)).bold().to_string()),
            single_line(detail),
        ),
        Activity::Thinking(detail) => {
            let detail = single_line(detail);
            let detail = if detail.is_empty() {
                detail
            } else {
                detail.dimmed().to_string()
            };
            (Some("[thinking]".dimmed().to_string()), detail)
        }
        Activity::Text(text) => (None, single_line(text)),
        Activity::System(status) => (None, status.to_string()),
    };

    let mut line = spinner.to_string();
    for part in [label.unwrap_or_default(), detail] {
        if !part.is_empty() {
            line.push(' ');
            line.push_str(&part);
        }
    }
    line
}

fn stats_line(state: &DisplayState, elapsed: Duration) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(8);

    match state.usage.totals() {
        Some(totals) => {
            segments.push(format!("↑{}", format_tokens(totals.input)));
            segments.push(format!("↓{}", format_tokens(totals.output)));
            segments.push(format!("R{}", format_tokens(totals.cache_read)));
            segments.push(format!("W{}", format_tokens(totals.cache_write)));
            segments.push(format!("${:.3}", totals.cost));
        }
        None => {
            for prefix in ["↑", "↓", "R", "W", "$"] {
                segments.push(format!("{}{}", prefix, PLACEHOLDER));
            }
        }
    }

    if let Some(context) = context_segment(&state.usage) {
        segments.push(context);
    }
    if let Some(label) = state.model.label() {
        segments.push(label);
    }
    segments.push(format_elapsed(elapsed));

    segments.join(&format!(" {} ", "|".dimmed()))
}

fn context_segment(usage: &UsageStats) -> Option<String> {
    let context = usage.context();
    if context.window == 0 {
        return None;
    }

    let window = format_tokens(context.window);
    if !usage.has_stats() {
        return Some(format!("{}/{}", PLACEHOLDER, window));
    }

    let percent = context.percent()?;
    let text = format!("{:.1}%/{}", percent, window);
    Some(match ContextLevel::from_percent(percent) {
        ContextLevel::Critical => text.red().to_string(),
        ContextLevel::Warning => text.yellow().to_string(),
        ContextLevel::Normal => text,
    })
}

fn cursor_up(lines: usize) -> String {
    format!("\x1b[{}A\r", lines)
}

/// Writes frames to the terminal, tracking first paint vs repaint.
pub struct FrameRenderer {
    out: Box<dyn Write + Send>,
    columns: Columns,
    painted: bool,
}

impl FrameRenderer {
    pub fn new(out: Box<dyn Write + Send>, columns: Columns) -> Self {
        Self {
            out,
            columns,
            painted: false,
        }
    }

    pub fn stderr(columns: Columns) -> Self {
        Self::new(Box::new(io::stderr()), columns)
    }

    #[allow(dead_code)]
    pub fn has_painted(&self) -> bool {
        self.painted
    }

    /// Forget the previous paint; the next render starts a fresh block.
    pub fn reset(&mut self) {
        self.painted = false;
    }

    pub fn render(&mut self, state: &DisplayState, elapsed: Duration) {
        let frame = compose(state, elapsed, self.columns.resolve());

        let mut buf = String::with_capacity(frame.activity.len() + frame.stats.len() + 32);
        if self.painted {
            buf.push_str(&cursor_up(OWNED_LINES - 1));
        }
        let lines = ["", frame.activity.as_str(), frame.stats.as_str(), ""];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                buf.push('\n');
            }
            buf.push_str(CLEAR_LINE);
            buf.push_str(line);
        }

        self.write(&buf);
        self.painted = true;
    }

    /// Blank all owned lines and leave the cursor on the first of them.
    ///
    /// Without a previous paint the block is cleared downward from the
    /// current line, so output above the cursor is never touched.
    pub fn clear(&mut self) {
        let mut buf = if self.painted {
            cursor_up(OWNED_LINES - 1)
        } else {
            "\r".to_string()
        };
        buf.push_str(&[CLEAR_LINE; OWNED_LINES].join("\n"));
        buf.push_str(&cursor_up(OWNED_LINES - 1));

        self.write(&buf);
        self.painted = false;
    }

    fn write(&mut self, data: &str) {
        let result = self
            .out
            .write_all(data.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            tracing::debug!(error = %err, "terminal write failed");
        }
    }
}
