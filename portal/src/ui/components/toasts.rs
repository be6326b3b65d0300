use ratatui::prelude::Rect;
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::collections::VecDeque;

use crate::state::Toast;
use crate::ui::theme;

/// Stack the pending toasts in the top-right corner, newest last.
pub fn render_toasts(f: &mut Frame, toasts: &VecDeque<Toast>) {
    if toasts.is_empty() {
        return;
    }

    let screen = f.area();
    let width = (screen.width / 2).max(30).min(screen.width);
    let height = (toasts.len() as u16 + 2).min(screen.height);
    let area = Rect {
        x: screen.x + screen.width - width,
        y: screen.y,
        width,
        height,
    };

    let lines: Vec<Line> = toasts
        .iter()
        .map(|toast| Line::from(Span::styled(toast.message.as_str(), theme::toast_style(toast.level))))
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme::info_border_style()),
            ),
        area,
    );
}
