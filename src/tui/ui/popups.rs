//! Popup and overlay rendering for the TUI
//!
//! Handles the help popup, the settings summary and the error notification.

use crate::tui::app::App;
use crate::tui::help_text;
use crate::tui::theme::Theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};

use super::util::popup_area;

/// Render the help popup with keyboard shortcuts
pub fn render_help_popup(frame: &mut Frame, app: &App, area: Rect) {
    // Min 40 cols for readability, min 10 rows for usable scroll area
    let popup_area = popup_area(area, 60, 70, 40, 10);
    let theme = &app.theme;

    frame.render_widget(Clear, popup_area);

    let help_lines = help_text::build_help_text(theme);
    let help_text_len = help_lines.len();

    let paragraph = Paragraph::new(help_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.modal_border))
                .title(" Help ")
                .style(Style::default().bg(theme.modal_bg)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, popup_area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(Style::default().fg(theme.modal_border));

    let mut scrollbar_state = ScrollbarState::new(help_text_len).position(app.help_scroll as usize);

    frame.render_stateful_widget(
        scrollbar,
        popup_area.inner(ratatui::layout::Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

/// Render a read-only summary of the active configuration
pub fn render_settings_popup(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = popup_area(area, 60, 60, 44, 14);
    let theme = &app.theme;

    frame.render_widget(Clear, popup_area);

    let not_set = "(not set)".to_string();
    let network = app.config.network.as_ref();
    let mut lines = vec![
        heading("Server", theme),
        row("URL", app.config.server().map(str::to_string).unwrap_or_else(|| not_set.clone()), theme),
        row(
            "Signed in as",
            match (&app.credentials, app.username()) {
                (Some(_), Some(name)) => name,
                (Some(_), None) => "(unknown user)".to_string(),
                (None, _) => "(logged out)".to_string(),
            },
            theme,
        ),
        Line::from(""),
        heading("Network", theme),
        row(
            "Device type",
            network.map(|n| n.device_type.clone()).unwrap_or_else(|| not_set.clone()),
            theme,
        ),
        row(
            "Username",
            network.map(|n| n.username.clone()).unwrap_or_else(|| not_set.clone()),
            theme,
        ),
        row(
            "Enable password",
            match network.and_then(|n| n.enable_password.as_ref()) {
                Some(_) => "set".to_string(),
                None => "none".to_string(),
            },
            theme,
        ),
        Line::from(""),
        heading("Language", theme),
        row(
            "Model",
            app.language().map(str::to_string).unwrap_or_else(|| not_set.clone()),
            theme,
        ),
    ];

    if let Some(language) = &app.config.language {
        let missing = language.missing_fields();
        if !missing.is_empty() {
            lines.push(row("Missing", missing.join(", "), theme));
        }
    }

    lines.push(row("Aliases", app.config.aliases.len().to_string(), theme));
    lines.push(Line::from(""));
    lines.push(heading("Files", theme));
    if let Some(path) = app.config_path() {
        lines.push(row("Config", path.display().to_string(), theme));
    }
    lines.push(row("Credentials", app.store().path().display().to_string(), theme));
    if let Some(path) = &app.log_path {
        lines.push(row("Log", path.display().to_string(), theme));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.modal_border))
                .title(" Settings ")
                .title_bottom(" F2/Esc: Close ")
                .style(Style::default().bg(theme.modal_bg)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// Render the current error above the input box
pub fn render_error_notification(frame: &mut Frame, message: &str, theme: &Theme, area: Rect) {
    let text = Line::from(vec![
        Span::styled(
            "✗ ",
            Style::default()
                .fg(theme.error_fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.to_string(), Style::default().fg(theme.foreground)),
    ]);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.error_fg))
                .title(" Error ")
                .title_bottom(" Esc: Dismiss ")
                .style(Style::default().bg(theme.modal_bg)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn heading(text: &'static str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(theme.modal_title)
            .add_modifier(Modifier::BOLD),
    ))
}

fn row(label: &'static str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {label:<16}"),
            Style::default().fg(theme.modal_description),
        ),
        Span::styled(value, Style::default().fg(theme.foreground)),
    ])
}
