use ratatui::prelude::Rect;
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme;

/// Render the `:` prompt with the cursor after the typed text.
pub fn render_command_line(f: &mut Frame, area: Rect, line: &str) {
    let prompt = Paragraph::new(Line::from(vec![
        Span::styled(":", theme::title_style()),
        Span::styled(line, theme::loading_style()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Command (Enter: run, Esc: cancel)"),
    );

    f.render_widget(prompt, area);
    place_cursor(f, area, 1 + line.chars().count());
}

/// Render a labelled single-line input (live search).
pub fn render_text_input(f: &mut Frame, area: Rect, title: &str, text: &str) {
    let input = Paragraph::new(text)
        .style(theme::loading_style())
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
    place_cursor(f, area, text.chars().count());
}

/// Put the terminal cursor `offset` cells into the box's text row.
pub fn place_cursor(f: &mut Frame, area: Rect, offset: usize) {
    let max = area.width.saturating_sub(2);
    let column = u16::try_from(offset).unwrap_or(u16::MAX).min(max);
    f.set_cursor_position((area.x + 1 + column, area.y + 1));
}
