//! Title row: page name, who is signed in, and the loading indicator.

use ratatui::prelude::Rect;
use ratatui::{
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::state::{AppState, LoadingState};
use crate::ui::{layouts, theme};

use super::loading_indicator;

pub fn render_screen_title(f: &mut Frame, area: Rect, state: &AppState, loading: &LoadingState) {
    let (title_area, indicator_area) = layouts::title_with_loading(area);

    let title = Line::from(vec![
        Span::styled(state.route.title(), theme::title_style()),
        Span::raw("  "),
        Span::styled(session_line(state), theme::help_text_style()),
    ]);
    f.render_widget(Paragraph::new(title), title_area);

    loading_indicator::render_loading_indicator(f, indicator_area, loading, &state.spinner);
}

fn session_line(state: &AppState) -> String {
    match &state.identity {
        Some(identity) => {
            let roles: Vec<&str> = identity.roles.iter().map(String::as_str).collect();
            let mut line = format!("{} ({})", identity.username, roles.join(", "));
            if state.notifications.unread > 0 {
                line.push_str(&format!(" | {} unread", state.notifications.unread));
            }
            line
        }
        None if !state.session_checked => "checking session...".to_string(),
        None => "guest".to_string(),
    }
}
