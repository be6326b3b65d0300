use ratatui::{
    prelude::*,
    widgets::{Row, Table},
};
use tracing::Level;

use crate::log_buffer::LogBuffer;
use crate::ui::{components::popup, layouts, theme};

/// Newest session logs over the current screen.
pub fn render_logs_popup(f: &mut Frame, log_buffer: &LogBuffer) {
    let inner = popup::render_popup_frame(
        f,
        f.area(),
        layouts::popup_sizes::LARGE,
        &format!(" Logs ({} entries, L or Esc to close) ", log_buffer.len()),
        theme::accent_border_style(),
    );

    // Header row and its margin
    let visible = inner.height.saturating_sub(2) as usize;
    let rows: Vec<Row> = log_buffer
        .tail(visible)
        .into_iter()
        .map(|entry| {
            let level_style = match entry.level {
                Level::ERROR => theme::error_style(),
                Level::WARN => Style::default().fg(theme::COLOR_LOADING),
                Level::INFO => Style::default().fg(theme::COLOR_SUCCESS),
                Level::DEBUG => Style::default().fg(Color::Blue),
                Level::TRACE => Style::default().fg(theme::COLOR_MUTED),
            };

            Row::new(vec![
                entry.timestamp.format("%H:%M:%S%.3f").to_string(),
                entry.level.to_string(),
                truncate_target(&entry.target, 25),
                entry.message,
            ])
            .style(level_style)
        })
        .collect();

    let widths = [
        Constraint::Length(12), // Time
        Constraint::Length(5),  // Level
        Constraint::Length(25), // Target
        Constraint::Min(30),    // Message
    ];

    let table = Table::new(rows, widths).header(
        Row::new(vec!["Time", "Level", "Target", "Message"])
            .style(theme::header_style())
            .bottom_margin(1),
    );

    f.render_widget(table, inner);
}

fn truncate_target(target: &str, max_len: usize) -> String {
    let count = target.chars().count();
    if count <= max_len {
        target.to_string()
    } else {
        let tail: String = target.chars().skip(count - max_len + 3).collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_targets_keep_their_end() {
        assert_eq!(truncate_target("portal::app", 25), "portal::app");
        let cut = truncate_target("portal::background::data_loader", 20);
        assert_eq!(cut, "...ound::data_loader");
        assert_eq!(cut.chars().count(), 20);
    }
}
