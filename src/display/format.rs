//! Small text formatters shared by the activity tracker and the frame renderer.

use std::path::Path;
use std::time::Duration;

/// Format a token count compactly (e.g. 1500 -> "1.5k", 45230 -> "45k").
pub fn format_tokens(count: u64) -> String {
    if count < 1_000 {
        count.to_string()
    } else if count < 10_000 {
        format!("{:.1}k", count as f64 / 1_000.0)
    } else if count < 1_000_000 {
        format!("{}k", (count as f64 / 1_000.0).round() as u64)
    } else if count < 10_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else {
        format!("{}M", (count as f64 / 1_000_000.0).round() as u64)
    }
}

/// Format elapsed time as "42s" or "3m 42s".
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    if seconds < 60 {
        format!("{}s", seconds)
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}

/// Collapse runs of whitespace into single spaces and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Flatten `text` onto one terminal line: whitespace runs collapse to a
/// space and any other control character (including a bare ESC) is dropped.
pub fn single_line(text: &str) -> String {
    normalize_whitespace(text)
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Replace a leading home directory with `~`.
pub fn shorten_path(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home.filter(|h| !h.as_os_str().is_empty()) else {
        return path.to_string();
    };

    match Path::new(path).strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display()),
        Err(_) => path.to_string(),
    }
}

/// Keep at most `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}...", kept)
}
