use ratatui::Frame;

use crate::state::{AppState, LoadingState};
use crate::ui::{
    components::{empty_state, help_bar, screen_title},
    layouts,
};

pub fn render(f: &mut Frame, state: &AppState) {
    let (title_area, content_area, help_area) = layouts::screen_layout(f.area());

    screen_title::render_screen_title(f, title_area, state, &LoadingState::NotStarted);
    empty_state::render_empty_state(
        f,
        content_area,
        "Access denied",
        "You do not have access to this page",
        Some("Press Enter to go to your home page"),
    );
    help_bar::render_footer(f, help_area, state, "Enter/Esc: home | ?: help | q: quit");
}
