//! Terminal display utilities for CLI output formatting.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;

/// Terminal information with cached size and capabilities.
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Get the global terminal information, initialized on first call.
pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| {
        let width = terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH);

        Terminal {
            width,
            is_tty: io::stdout().is_terminal(),
        }
    })
}

/// Get the current terminal width in characters.
#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

/// Truncate text to fit within the specified width using unicode-aware
/// truncation.
///
/// Returns a string that fits within `max_width` display columns, with an
/// ellipsis appended when truncation occurred.
///
/// # Examples
///
/// ```
/// use scopus_scout::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();

    if total_width <= max_width {
        return text.to_string();
    }

    // Find the longest prefix that fits, leaving room for the ellipsis
    let mut current_width = 0;
    let mut end_idx = 0;

    for (i, (_c, w)) in char_widths.iter().enumerate() {
        if current_width + w > max_width.saturating_sub(3) {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    if end_idx == 0 {
        return "...".to_string();
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated)
}
