//! Conversation transcript rendering.
//!
//! The transcript is laid out into plain lines here, wrapped to the pane
//! width, so the scroll range is known exactly.

use super::util::{row_count, wrap_line};
use crate::message::{Message, MessageType, SenderType};
use crate::parser::format_code_content;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const INDENT: &str = "  ";

/// Laid-out transcript.
pub struct ChatView {
    pub lines: Vec<Line<'static>>,
    /// First line of the selected code section
    pub selection_line: Option<u16>,
}

pub fn build_chat_view(app: &App, width: u16) -> ChatView {
    let theme = &app.theme;
    let width = width as usize;
    let body_width = width.saturating_sub(INDENT.len()).max(1);
    let mut lines = Vec::new();
    let mut selection_line = None;
    let mut code_index = 0;

    for (index, message) in app.session.history().iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        lines.push(sender_line(message, app.config.ui.show_timestamps, theme));

        for section in &message.sections {
            match section.message_type {
                MessageType::Text => {
                    let style = Style::default().fg(theme.foreground);
                    for line in section.content.trim_end_matches('\n').split('\n') {
                        for wrapped in wrap_line(line, body_width) {
                            lines.push(Line::from(vec![
                                Span::raw(INDENT),
                                Span::styled(wrapped, style),
                            ]));
                        }
                    }
                }
                MessageType::Error => {
                    let style = Style::default().fg(theme.error_fg);
                    let text = format!("✗ {}", section.content.trim_end());
                    for wrapped in wrap_line(&text, body_width) {
                        lines.push(Line::from(vec![
                            Span::raw(INDENT),
                            Span::styled(wrapped, style),
                        ]));
                    }
                }
                MessageType::Code => {
                    let selected = app.selected_code == Some(code_index);
                    if selected {
                        selection_line = Some(row_count(lines.len()));
                    }
                    code_index += 1;
                    lines.extend(code_block(
                        &section.content,
                        code_index,
                        selected,
                        body_width,
                        theme,
                    ));
                }
            }
        }

        if let Some(caption) = app.session.caption(index) {
            let style = Style::default()
                .fg(theme.caption_fg)
                .add_modifier(Modifier::ITALIC);
            for wrapped in wrap_line(caption, body_width) {
                lines.push(Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(wrapped, style),
                ]));
            }
        }
    }

    ChatView {
        lines,
        selection_line,
    }
}

fn sender_line(message: &Message, show_timestamps: bool, theme: &Theme) -> Line<'static> {
    let color = match message.sender {
        SenderType::You => theme.user_label,
        SenderType::NetGPT => theme.bot_label,
    };
    let mut spans = vec![Span::styled(
        format!("▌{}", message.sender),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if show_timestamps {
        if let Some(time) = format_time(message.timestamp) {
            spans.push(Span::styled(
                format!(" · {time}"),
                Style::default().fg(theme.timestamp),
            ));
        }
    }
    Line::from(spans)
}

fn format_time(timestamp: i64) -> Option<String> {
    let utc = chrono::DateTime::from_timestamp(timestamp, 0)?;
    Some(utc.with_timezone(&chrono::Local).format("%H:%M").to_string())
}

/// Boxed code section. JSON objects are shown the way they are copied.
fn code_block(
    content: &str,
    number: usize,
    selected: bool,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let border = if selected {
        Style::default()
            .fg(theme.code_selected)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.code_border)
    };
    let code = Style::default().fg(theme.code_fg);
    let inner = width.saturating_sub(2).max(1);

    let label = if selected {
        format!("─ code {number} ▸ Ctrl+Y copies ")
    } else {
        format!("─ code {number} ")
    };
    let fill = width.saturating_sub(1 + label.width());
    let mut lines = vec![Line::from(vec![
        Span::raw(INDENT),
        Span::styled(format!("┌{label}{}", "─".repeat(fill)), border),
    ])];

    let formatted = format_code_content(content);
    for line in formatted.trim_end_matches('\n').split('\n') {
        for wrapped in wrap_line(line, inner) {
            lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled("│ ", border),
                Span::styled(wrapped, code),
            ]));
        }
    }

    lines.push(Line::from(vec![
        Span::raw(INDENT),
        Span::styled(format!("└{}", "─".repeat(width.saturating_sub(1))), border),
    ]));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::config::Config;
    use crate::message::BotMessage;
    use crate::tui::terminal_compat::ColorMode;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("auth.json"));
        let mut config = Config::default();
        config.ui.show_timestamps = false;
        (App::new(config, None, store, None, ColorMode::Rgb), dir)
    }

    #[test]
    fn test_transcript_layout() {
        let (mut app, _dir) = app();
        let mut reply = BotMessage::quick(MessageType::Text, "Config:\n```\nhostname r1\n```");
        reply.caption = Some("From r1".into());
        app.session.receive(reply);

        let view = build_chat_view(&app, 30);
        let rendered: Vec<String> = view.lines.iter().map(text).collect();

        assert_eq!(rendered[0], "▌NetGPT");
        assert_eq!(rendered[1], "  Config:");
        assert!(rendered[2].starts_with("  ┌─ code 1 ─"));
        assert_eq!(rendered[3], "  │ hostname r1");
        assert!(rendered[4].starts_with("  └─"));
        assert_eq!(rendered[5], "  From r1");
        assert_eq!(view.selection_line, None);
    }

    #[test]
    fn test_selection_line() {
        let (mut app, _dir) = app();
        app.session
            .receive(BotMessage::quick(MessageType::Text, "a\n```\nx\n```\nb\n```\ny\n```"));
        app.selected_code = Some(1);

        let view = build_chat_view(&app, 40);
        let line = view.selection_line.unwrap() as usize;
        assert!(text(&view.lines[line]).contains("code 2 ▸"));
    }

    #[test]
    fn test_json_code_is_formatted() {
        let (mut app, _dir) = app();
        app.session.receive(BotMessage::quick(
            MessageType::Code,
            r#"{"interface": "Gi0/1", "status": "up"}"#,
        ));

        let view = build_chat_view(&app, 40);
        let rendered: Vec<String> = view.lines.iter().map(text).collect();
        assert_eq!(rendered[2], "  │ INTERFACE");
        assert_eq!(rendered[3], "  │ Gi0/1");
        assert_eq!(rendered[4], "  │ STATUS");
    }

    #[test]
    fn test_error_section() {
        let (mut app, _dir) = app();
        app.session
            .receive(BotMessage::quick(MessageType::Error, "Device unreachable"));
        let view = build_chat_view(&app, 40);
        assert_eq!(text(&view.lines[1]), "  ✗ Device unreachable");
    }

    #[test]
    fn test_selection_line_saturates_on_long_transcripts() {
        let (mut app, _dir) = app();
        let output = "x\n".repeat(70_000);
        app.session.receive(BotMessage::quick(
            MessageType::Text,
            format!("{output}```\nshow tech\n```"),
        ));
        app.selected_code = Some(0);

        let view = build_chat_view(&app, 40);
        assert!(view.lines.len() > usize::from(u16::MAX));
        assert_eq!(view.selection_line, Some(u16::MAX));
    }
}
