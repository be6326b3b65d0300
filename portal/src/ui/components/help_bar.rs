//! Bottom bar: key hints, or the `:` prompt while it is open.

use ratatui::prelude::Rect;
use ratatui::{
    layout::Alignment,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::state::{AppState, InputMode};
use crate::ui::theme;

use super::command_line;

/// Render a standard help bar with the given text.
pub fn render_help_bar(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .style(theme::help_text_style())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, area);
}

/// The prompt replaces the help bar while the user is typing a command.
pub fn render_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    if state.input_mode == InputMode::Command {
        command_line::render_command_line(f, area, &state.command_line);
    } else {
        render_help_bar(f, area, help_text);
    }
}
