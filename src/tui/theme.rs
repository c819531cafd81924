//! Colors for the chat view.

use crate::tui::terminal_compat::ColorMode;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub user_label: Color,
    pub bot_label: Color,
    pub timestamp: Color,
    pub code_fg: Color,
    pub code_border: Color,
    pub code_selected: Color,
    pub error_fg: Color,
    pub caption_fg: Color,
    pub badge_fg: Color,
    pub badge_bg: Color,
    pub status_bar_fg: Color,
    pub status_bar_bg: Color,
    pub status_message_bg: Color,
    pub modal_bg: Color,
    pub modal_border: Color,
    pub modal_title: Color,
    pub modal_key: Color,
    pub modal_description: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(24, 26, 33),
            foreground: Color::Rgb(220, 223, 228),
            border: Color::Rgb(92, 99, 112),
            border_focused: Color::Rgb(97, 175, 239),
            user_label: Color::Rgb(229, 192, 123),
            bot_label: Color::Rgb(97, 175, 239),
            timestamp: Color::Rgb(92, 99, 112),
            code_fg: Color::Rgb(152, 195, 121),
            code_border: Color::Rgb(92, 99, 112),
            code_selected: Color::Rgb(198, 120, 221),
            error_fg: Color::Rgb(224, 108, 117),
            caption_fg: Color::Rgb(171, 178, 191),
            badge_fg: Color::Rgb(24, 26, 33),
            badge_bg: Color::Rgb(86, 182, 194),
            status_bar_fg: Color::Rgb(171, 178, 191),
            status_bar_bg: Color::Rgb(40, 44, 52),
            status_message_bg: Color::Rgb(0, 80, 120),
            modal_bg: Color::Rgb(33, 37, 43),
            modal_border: Color::Rgb(97, 175, 239),
            modal_title: Color::Rgb(229, 192, 123),
            modal_key: Color::Rgb(152, 195, 121),
            modal_description: Color::Rgb(171, 178, 191),
        }
    }
}

impl Theme {
    /// Convert every RGB color to its nearest 256-color palette entry when
    /// the terminal cannot show true color.
    pub fn with_color_mode(self, mode: ColorMode) -> Self {
        if mode == ColorMode::Rgb {
            return self;
        }
        let c = to_indexed;
        Self {
            background: c(self.background),
            foreground: c(self.foreground),
            border: c(self.border),
            border_focused: c(self.border_focused),
            user_label: c(self.user_label),
            bot_label: c(self.bot_label),
            timestamp: c(self.timestamp),
            code_fg: c(self.code_fg),
            code_border: c(self.code_border),
            code_selected: c(self.code_selected),
            error_fg: c(self.error_fg),
            caption_fg: c(self.caption_fg),
            badge_fg: c(self.badge_fg),
            badge_bg: c(self.badge_bg),
            status_bar_fg: c(self.status_bar_fg),
            status_bar_bg: c(self.status_bar_bg),
            status_message_bg: c(self.status_message_bg),
            modal_bg: c(self.modal_bg),
            modal_border: c(self.modal_border),
            modal_title: c(self.modal_title),
            modal_key: c(self.modal_key),
            modal_description: c(self.modal_description),
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn content_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().fg(self.status_bar_fg).bg(self.status_bar_bg)
    }

    pub fn badge_style(&self) -> Style {
        Style::default()
            .fg(self.badge_fg)
            .bg(self.badge_bg)
            .add_modifier(Modifier::BOLD)
    }
}

/// Map an RGB color onto the xterm 6x6x6 color cube or grayscale ramp.
fn to_indexed(color: Color) -> Color {
    let Color::Rgb(r, g, b) = color else {
        return color;
    };

    // Near-gray colors map better onto the 24-step ramp (232..=255)
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max - min < 12 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        if avg < 8 {
            return Color::Indexed(16);
        }
        if avg > 238 {
            return Color::Indexed(231);
        }
        return Color::Indexed(232 + ((avg - 8) / 10).min(23) as u8);
    }

    let level = |v: u8| -> u8 {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            (v - 35) / 40
        }
    };
    Color::Indexed(16 + 36 * level(r) + 6 * level(g) + level(b))
}
