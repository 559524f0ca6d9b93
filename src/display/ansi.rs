//! ANSI-aware width measurement and truncation.
//!
//! Width and truncation walk the same token stream: either a complete style
//! sequence (`ESC [ <digits and ;> m`) or one visible character. An escape
//! byte that does not open a complete style sequence is an ordinary
//! character, so malformed input is measured instead of rejected.

/// Style-reset sequence appended before an inserted ellipsis.
pub const RESET: &str = "\x1b[0m";

/// Default ellipsis used by [`truncate_to_width`].
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Style(&'a str),
    Char(char),
}

struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let mut chars = self.rest.chars();
        let c = chars.next()?;

        if c == '\x1b' {
            if let Some(len) = style_len(self.rest) {
                let (seq, rest) = self.rest.split_at(len);
                self.rest = rest;
                return Some(Token::Style(seq));
            }
        }

        self.rest = chars.as_str();
        Some(Token::Char(c))
    }
}

fn tokens(s: &str) -> Tokens<'_> {
    Tokens { rest: s }
}

/// Byte length of the style sequence starting at `s`, if `s` starts with one.
fn style_len(s: &str) -> Option<usize> {
    let body = s.strip_prefix("\x1b[")?;
    let params = body
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b';')
        .count();

    (body.as_bytes().get(params) == Some(&b'm')).then_some(2 + params + 1)
}

/// Remove every recognized style sequence from `s`.
pub fn strip_styling(s: &str) -> String {
    tokens(s)
        .filter_map(|t| match t {
            Token::Char(c) => Some(c),
            Token::Style(_) => None,
        })
        .collect()
}

/// Number of visible characters in `s`; style sequences are zero-width.
pub fn visible_width(s: &str) -> usize {
    tokens(s)
        .filter(|t| matches!(t, Token::Char(_)))
        .count()
}

/// Truncate `s` to at most `max_width` visible characters using `"..."`.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    truncate_with(s, max_width, ELLIPSIS)
}

/// Truncate `s` to at most `max_width` visible characters.
///
/// Style sequences are copied through without consuming the budget. When
/// anything is cut, a [`RESET`] is written before `ellipsis` so no style
/// leaks past the end of the line. If `max_width` cannot even hold the
/// ellipsis, the visible prefix of the ellipsis alone is returned.
pub fn truncate_with(s: &str, max_width: usize, ellipsis: &str) -> String {
    if visible_width(s) <= max_width {
        return s.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    if max_width < ellipsis_width {
        return strip_styling(ellipsis).chars().take(max_width).collect();
    }

    let budget = max_width - ellipsis_width;
    let mut out = String::with_capacity(s.len() + RESET.len() + ellipsis.len());
    let mut used = 0;

    for token in tokens(s) {
        match token {
            Token::Style(seq) => out.push_str(seq),
            Token::Char(c) => {
                if used == budget {
                    break;
                }
                out.push(c);
                used += 1;
            }
        }
    }

    out.push_str(RESET);
    out.push_str(ellipsis);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "hello",
        "\x1b[31mred\x1b[0m",
        "\x1b[1;36mbold cyan\x1b[0m and plain",
        "↑1.0k | ↓500 | R2.0k",
        "⠋ \x1b[1m[bash]\x1b[0m cargo test --workspace -- --nocapture",
        "\x1b[31munterminated style",
        "broken \x1b[31 escape",
        "lone \x1b escape",
        "\x1b[38;5;208morange\x1b[39m",
    ];

    #[test]
    fn test_visible_width_ignores_styling() {
        assert_eq!(visible_width("hello"), 5);
        assert_eq!(visible_width("\x1b[31mred\x1b[0m"), 3);
        assert_eq!(visible_width(""), 0);
        assert_eq!(visible_width("↑↓"), 2);
    }

    #[test]
    fn test_strip_styling() {
        assert_eq!(strip_styling("\x1b[1;36mbold\x1b[0m text"), "bold text");
        assert_eq!(strip_styling("plain"), "plain");
    }

    #[test]
    fn test_stripping_does_not_change_width() {
        for s in SAMPLES {
            assert_eq!(visible_width(&strip_styling(s)), visible_width(s), "{:?}", s);
        }
    }

    #[test]
    fn test_malformed_escape_counts_as_characters() {
        // ESC, '[', '3', '1', ' ' are all ordinary characters here.
        assert_eq!(visible_width("broken \x1b[31 escape"), 18);
        assert_eq!(visible_width("lone \x1b escape"), 13);
        assert_eq!(strip_styling("a\x1bb"), "a\x1bb");
    }

    #[test]
    fn test_truncate_identity_within_width() {
        for s in SAMPLES {
            let width = visible_width(s);
            assert_eq!(truncate_to_width(s, width), *s);
            assert_eq!(truncate_to_width(s, width + 10), *s);
        }
    }

    #[test]
    fn test_truncate_never_exceeds_width() {
        for s in SAMPLES {
            for max in 0..=visible_width(s) + 2 {
                let out = truncate_to_width(s, max);
                assert!(
                    visible_width(&out) <= max,
                    "{:?} at {} gave {:?}",
                    s,
                    max,
                    out
                );
            }
        }
    }

    #[test]
    fn test_truncate_plain_text() {
        assert_eq!(truncate_to_width("hello world", 8), "hello\x1b[0m...");
        assert_eq!(visible_width(&truncate_to_width("hello world", 8)), 8);
    }

    #[test]
    fn test_truncate_keeps_styles_and_resets_before_ellipsis() {
        let out = truncate_to_width("\x1b[31mred text here\x1b[0m", 6);
        assert_eq!(out, "\x1b[31mred\x1b[0m...");
    }

    #[test]
    fn test_truncate_never_splits_escape_sequence() {
        let s = "ab\x1b[38;5;208mcdefgh";
        let out = truncate_to_width(s, 5);
        assert_eq!(out, "ab\x1b[38;5;208m\x1b[0m...");
    }

    #[test]
    fn test_truncate_degenerate_width_returns_ellipsis_prefix() {
        assert_eq!(truncate_to_width("hello", 2), "..");
        assert_eq!(truncate_to_width("hello", 0), "");
        assert_eq!(truncate_with("hello", 1, "…"), "\x1b[0m…");
    }

    #[test]
    fn test_truncate_with_custom_ellipsis() {
        assert_eq!(truncate_with("abcdef", 4, "…"), "abc\x1b[0m…");
    }
}
