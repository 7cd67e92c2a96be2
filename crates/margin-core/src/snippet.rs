//! Preview windows around matches.
//!
//! A window is the byte range `[starts, ends)` from the nearest newline at or
//! before a match to the nearest newline at or after it. The window never
//! splits a line, always contains the match, and costs one scan in each
//! direction with no allocation.

use serde::{Deserialize, Serialize};

/// Byte range of a preview window inside a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewWindow {
    pub starts: usize,
    pub ends: usize,
}

impl PreviewWindow {
    /// Window around the single position `offset`.
    pub fn extract(text: &str, offset: usize) -> Self {
        Self::around(text, offset, offset)
    }

    /// Window around the match `[start, end)`.
    ///
    /// The closing newline is searched from the end of the match, so a match
    /// spanning several lines still fits inside its window. Offsets past the
    /// end of `text` are clamped.
    pub fn around(text: &str, start: usize, end: usize) -> Self {
        let bytes = text.as_bytes();
        let len = bytes.len();
        let start = start.min(len);
        let end = end.max(start).min(len);

        // at or before `start`
        let starts = bytes[..(start + 1).min(len)]
            .iter()
            .rposition(|&b| b == b'\n')
            .unwrap_or(0);

        // at or after `end`
        let ends = bytes[end..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(len, |pos| end + pos);

        PreviewWindow { starts, ends }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "hello\nworld\nhello again";

    #[test]
    fn test_first_line() {
        let window = PreviewWindow::extract(TEXT, 0);
        assert_eq!(window, PreviewWindow { starts: 0, ends: 5 });
    }

    #[test]
    fn test_middle_line_includes_leading_newline() {
        let window = PreviewWindow::extract(TEXT, 7);
        assert_eq!(window, PreviewWindow { starts: 5, ends: 11 });
        assert_eq!(&TEXT[window.starts..window.ends], "\nworld");
    }

    #[test]
    fn test_last_line_runs_to_end() {
        let window = PreviewWindow::around(TEXT, 12, 17);
        assert_eq!(window, PreviewWindow { starts: 11, ends: 23 });

        let last = TEXT.len() - 1;
        assert_eq!(PreviewWindow::extract(TEXT, last).ends, TEXT.len());
    }

    #[test]
    fn test_no_newlines() {
        let text = "a single line of text";
        let window = PreviewWindow::extract(text, 9);
        assert_eq!(window, PreviewWindow { starts: 0, ends: text.len() });
    }

    #[test]
    fn test_match_spanning_lines() {
        // "world\nhello" starts at 6, ends at 17
        let window = PreviewWindow::around(TEXT, 6, 17);
        assert_eq!(window, PreviewWindow { starts: 5, ends: 23 });
    }

    #[test]
    fn test_offset_on_newline() {
        let window = PreviewWindow::extract(TEXT, 5);
        assert_eq!(window, PreviewWindow { starts: 5, ends: 5 });
    }

    #[test]
    fn test_clamps_out_of_range() {
        let window = PreviewWindow::extract("abc", 10);
        assert_eq!(window, PreviewWindow { starts: 0, ends: 3 });

        let window = PreviewWindow::extract("", 0);
        assert_eq!(window, PreviewWindow { starts: 0, ends: 0 });
    }
}
