//! Shared "no data" and "loading" placeholders.

use ratatui::prelude::Rect;
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme;

/// Render an empty state message with consistent styling.
///
/// Used when a list has no data to display.
pub fn render_empty_state(
    f: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    hint: Option<&str>,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(message, theme::loading_style())),
    ];

    if let Some(hint_text) = hint {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            hint_text,
            theme::help_text_style(),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(paragraph, area);
}

/// Render a loading state message with consistent styling.
pub fn render_loading_state(f: &mut Frame, area: Rect, title: &str, message: &str) {
    render_empty_state(f, area, title, message, None);
}

/// Render a failed load with its reason.
pub fn render_error_state(f: &mut Frame, area: Rect, title: &str, error: &str, hint: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(error, theme::error_style())),
        Line::from(""),
        Line::from(Span::styled(hint, theme::help_text_style())),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(paragraph, area);
}
