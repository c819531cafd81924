//! Utility functions for UI rendering
//!
//! Pure functions for layout calculations and text wrapping.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculate a centered rectangular area within a parent area.
///
/// Returns a `Rect` that is centered both horizontally and vertically,
/// sized as a percentage of the parent area.
pub fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Centered popup sized as a percentage of `area`, but never smaller than
/// `min_width` x `min_height` (or larger than `area` itself).
pub fn popup_area(
    area: Rect,
    percent_x: u16,
    percent_y: u16,
    min_width: u16,
    min_height: u16,
) -> Rect {
    let centered = centered_area(area, percent_x, percent_y);
    let width = centered.width.max(min_width).min(area.width);
    let height = centered.height.max(min_height).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Wrap a single line of text to `width` display columns.
///
/// Breaks at the last space that fits, or mid-word when a word is wider
/// than the line. Always returns at least one (possibly empty) line.
pub fn wrap_line(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.width() <= width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut last_space: Option<usize> = None;

    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if current_width + w > width {
            // A space that would overflow becomes the break itself
            if c == ' ' {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
                last_space = None;
                continue;
            }
            match last_space {
                Some(idx) if idx > 0 => {
                    let rest = current.split_off(idx + 1);
                    lines.push(current.trim_end().to_string());
                    current = rest;
                }
                _ => lines.push(std::mem::take(&mut current)),
            }
            current_width = current.width();
            last_space = None;
        }
        if c == ' ' {
            last_space = Some(current.len());
        }
        current.push(c);
        current_width += w;
    }
    lines.push(current);
    lines
}

/// Truncate `text` to at most `width` display columns, adding an ellipsis
/// when something was cut.
/// A line count as a terminal row count, saturating at `u16::MAX`.
pub fn row_count(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX)
}

pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_saturates() {
        assert_eq!(row_count(0), 0);
        assert_eq!(row_count(120), 120);
        assert_eq!(row_count(65_535), u16::MAX);
        assert_eq!(row_count(70_000), u16::MAX);
    }

    #[test]
    fn test_popup_area_respects_minimum() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = popup_area(area, 10, 10, 40, 10);
        assert_eq!(popup.width, 40);
        assert_eq!(popup.height, 10);
        assert_eq!(popup.x, 30);
        assert_eq!(popup.y, 15);

        let small = Rect::new(0, 0, 20, 5);
        let popup = popup_area(small, 50, 50, 40, 10);
        assert_eq!((popup.width, popup.height), (20, 5));
    }

    #[test]
    fn test_wrap_line_short() {
        assert_eq!(wrap_line("hello", 10), vec!["hello"]);
        assert_eq!(wrap_line("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_line_at_spaces() {
        assert_eq!(
            wrap_line("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_line("abc def", 3), vec!["abc", "def"]);
    }

    #[test]
    fn test_wrap_line_long_word() {
        assert_eq!(wrap_line("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_line_wide_chars() {
        // Each CJK character is two columns wide
        assert_eq!(wrap_line("日本語テキスト", 6), vec!["日本語", "テキス", "ト"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long label", 6), "a lon…");
    }
}
