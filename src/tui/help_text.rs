//! Contents of the F1 help popup.

use crate::tui::theme::Theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Width of the key column
const KEY_COLUMN_WIDTH: usize = 14;

const SCROLL_HINT: &str = "Use ↓/↑ to scroll | Press Esc or F1 to close";

/// A titled group of key bindings.
struct KeyGroup {
    title: &'static str,
    keys: &'static [(&'static str, &'static str)],
}

const KEY_GROUPS: &[KeyGroup] = &[
    KeyGroup {
        title: "Message",
        keys: &[
            ("Enter", "Send message"),
            ("Alt+Enter", "Insert a line break"),
            ("Ctrl+L", "Clear the input box"),
        ],
    },
    KeyGroup {
        title: "Conversation",
        keys: &[
            ("Ctrl+N", "Start a new chat"),
            ("PgUp/PgDn", "Scroll the conversation"),
            ("Ctrl+Home", "Jump to the first message"),
            ("Ctrl+End", "Jump to the latest message"),
        ],
    },
    KeyGroup {
        title: "Code Sections",
        keys: &[
            ("Tab", "Select next code section"),
            ("Shift+Tab", "Select previous code section"),
            ("Ctrl+Y", "Copy selected code section"),
        ],
    },
    KeyGroup {
        title: "General",
        keys: &[
            ("F1", "Toggle this help"),
            ("F2", "Show current settings"),
            ("Esc", "Close popup / dismiss error"),
            ("Ctrl+C", "Quit"),
        ],
    },
];

/// Number of lines [`build_help_text`] produces.
pub fn help_line_count() -> usize {
    // title, hint, blank + per group: header, keys, blank + note, blank, hint
    let groups: usize = KEY_GROUPS.iter().map(|g| g.keys.len() + 2).sum();
    3 + groups + 3
}

/// Build the help text with theme colors applied
pub fn build_help_text(theme: &Theme) -> Vec<Line<'static>> {
    let hint = || {
        Line::from(Span::styled(
            SCROLL_HINT,
            Style::default()
                .fg(theme.modal_description)
                .add_modifier(Modifier::ITALIC),
        ))
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "netgpt - Keyboard Shortcuts",
            Style::default()
                .fg(theme.modal_title)
                .add_modifier(Modifier::BOLD),
        )),
        hint(),
        Line::default(),
    ];

    for group in KEY_GROUPS {
        lines.push(Line::from(Span::styled(
            group.title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (key, desc) in group.keys {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {key:<KEY_COLUMN_WIDTH$}"),
                    Style::default().fg(theme.modal_key),
                ),
                Span::raw(*desc),
            ]));
        }
        lines.push(Line::default());
    }

    lines.push(Line::from(vec![
        Span::styled(
            "Note: ",
            Style::default()
                .fg(theme.modal_title)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Settings are changed with `netgpt config` and `netgpt login`",
            Style::default().fg(theme.modal_description),
        ),
    ]));
    lines.push(Line::default());
    lines.push(hint());
    lines
}
