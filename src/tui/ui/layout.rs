//! Screen regions of the chat view.

use ratatui::layout::{Constraint, Layout, Rect};

const HEADER_HEIGHT: u16 = 2;
const NOTIFICATION_HEIGHT: u16 = 3;
const MIN_CHAT_HEIGHT: u16 = 3;

/// Areas of the main screen, top to bottom.
///
/// The notification row only exists while an error is shown; the chat pane
/// absorbs the remaining height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub header: Rect,
    pub chat: Rect,
    pub notification: Option<Rect>,
    pub input: Rect,
    pub status: Rect,
}

impl ChatLayout {
    pub fn new(area: Rect, input_height: u16, show_notification: bool) -> Self {
        let mut constraints = vec![
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(MIN_CHAT_HEIGHT),
        ];
        if show_notification {
            constraints.push(Constraint::Length(NOTIFICATION_HEIGHT));
        }
        constraints.push(Constraint::Length(input_height));
        constraints.push(Constraint::Length(1));

        let rows = Layout::vertical(constraints).split(area);
        let mut rows = rows.iter().copied();
        let mut next = || rows.next().unwrap_or_default();

        let header = next();
        let chat = next();
        let notification = show_notification.then(&mut next);
        let input = next();
        let status = next();

        Self {
            header,
            chat,
            notification,
            input,
            status,
        }
    }
}
