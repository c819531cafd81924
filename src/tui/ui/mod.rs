mod chat;
mod layout;
mod popups;
mod util;

use layout::ChatLayout;

use crate::session::Readiness;
use crate::tui::app::App;
use chat::build_chat_view;
use popups::{render_error_notification, render_help_popup, render_settings_popup};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use unicode_width::UnicodeWidthStr;
use util::{row_count, truncate, wrap_line};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Tallest the input box grows, borders included
const MAX_INPUT_HEIGHT: u16 = 8;

pub fn render(frame: &mut Frame, app: &mut App) {
    app.clear_expired_status_message();

    let area = frame.area();
    let input_lines = input_lines(&app.input, area.width.saturating_sub(2));
    let input_height = row_count(input_lines.len())
        .saturating_add(2)
        .clamp(3, MAX_INPUT_HEIGHT);
    let error = app.session.error().map(str::to_string);

    let layout = ChatLayout::new(area, input_height, error.is_some());

    render_header(frame, app, layout.header);
    render_chat(frame, app, layout.chat);
    if let (Some(message), Some(notification_area)) = (&error, layout.notification) {
        render_error_notification(frame, message, &app.theme, notification_area);
    }
    render_input(frame, app, &input_lines, layout.input);
    render_status_bar(frame, app, layout.status);

    if app.show_help {
        render_help_popup(frame, app, area);
    }

    if app.show_settings {
        render_settings_popup(frame, app, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [left, middle, right] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let badge_width = left.width.saturating_sub(12) as usize;
    let platform = Line::from(vec![
        Span::styled(" Platform ", Style::default().fg(theme.caption_fg)),
        Span::styled(
            format!(" {} ", truncate(app.platform().unwrap_or("none"), badge_width)),
            theme.badge_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(platform), left);

    let progress = if app.session.is_waiting() {
        Line::from(vec![
            Span::styled(
                SPINNER[app.tick % SPINNER.len()],
                Style::default().fg(theme.border_focused),
            ),
            Span::styled(
                " NetGPT is thinking",
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(Span::styled(
            "netgpt",
            Style::default()
                .fg(theme.bot_label)
                .add_modifier(Modifier::BOLD),
        ))
    };
    frame.render_widget(Paragraph::new(progress).alignment(Alignment::Center), middle);

    let language = Line::from(vec![
        Span::styled(" Language ", Style::default().fg(theme.caption_fg)),
        Span::styled(
            format!(" {} ", truncate(app.language().unwrap_or("none"), badge_width)),
            theme.badge_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(language).alignment(Alignment::Right), right);
}

fn render_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(app.selected_code.is_some()))
        .title(" Chat ");
    let inner = block.inner(area);

    // One column is left free for the scrollbar
    let view = build_chat_view(app, inner.width.saturating_sub(1));
    app.update_chat_metrics(row_count(view.lines.len()), inner.height, view.selection_line);

    if view.lines.is_empty() {
        let hint = Readiness::check(&app.config, app.credentials.as_ref())
            .message()
            .unwrap_or("Type a message and press Enter to start chatting.");
        let placeholder = Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default()
                .fg(app.theme.caption_fg)
                .add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center)
        .block(block)
        .style(app.theme.content_style());
        frame.render_widget(placeholder, area);
        return;
    }

    let total = view.lines.len();
    let paragraph = Paragraph::new(view.lines)
        .block(block)
        .style(app.theme.content_style())
        .scroll((app.chat_scroll, 0));
    frame.render_widget(paragraph, area);

    if app.chat_lines > app.chat_viewport {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .style(Style::default().fg(app.theme.border));
        let mut state = ScrollbarState::new(total.saturating_sub(app.chat_viewport as usize))
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }
}

/// Input text split into display lines for a box `width` columns wide.
fn input_lines(input: &str, width: u16) -> Vec<String> {
    // Keep a column free for the cursor
    let width = width.saturating_sub(1).max(1) as usize;
    input
        .split('\n')
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn render_input(frame: &mut Frame, app: &App, lines: &[String], area: Rect) {
    let theme = &app.theme;
    let waiting = app.session.is_waiting();
    let title = if waiting {
        " Waiting for reply "
    } else {
        " Message "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(!waiting && !app.show_help && !app.show_settings))
        .title(title)
        .title_bottom(Line::from(" Enter: Send • Alt+Enter: Newline ").right_aligned());
    let inner = block.inner(area);

    let scroll = row_count(lines.len()).saturating_sub(inner.height);
    let text: Vec<Line> = lines.iter().map(|l| Line::raw(l.clone())).collect();
    let paragraph = Paragraph::new(text)
        .block(block)
        .style(theme.content_style())
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    if !app.show_help && !app.show_settings {
        let last = row_count(lines.last().map(|l| l.width()).unwrap_or(0));
        let row = row_count(lines.len()).saturating_sub(1).saturating_sub(scroll);
        frame.set_cursor_position(Position::new(
            inner.x + last.min(inner.width.saturating_sub(1)),
            inner.y + row.min(inner.height.saturating_sub(1)),
        ));
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // If there's a status message, display it prominently
    if let Some(ref msg) = app.status_message {
        let status = Paragraph::new(format!(" {msg}")).style(
            Style::default()
                .bg(app.theme.status_message_bg)
                .fg(app.theme.foreground)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status, area);
        return;
    }

    let user = match (&app.credentials, app.username()) {
        (Some(_), Some(name)) => format!("● {name}"),
        (Some(_), None) => "● signed in".to_string(),
        (None, _) => "○ logged out".to_string(),
    };
    let code = match (app.selected_code, app.code_section_count()) {
        (Some(i), n) => format!(" • Code {}/{}", i + 1, n),
        (None, 0) => String::new(),
        (None, n) => format!(" • {n} code sections"),
    };

    let status_text = format!(
        " {user}{code} • Tab:Code • Ctrl+Y:Copy • Ctrl+N:New chat • F1:Help • F2:Settings • Ctrl+C:Quit "
    );
    let status = Paragraph::new(status_text).style(app.theme.status_bar_style());
    frame.render_widget(status, area);
}
