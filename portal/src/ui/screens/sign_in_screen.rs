use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::state::{AppState, InputMode, LoadingState, SignInField};
use crate::ui::{
    components::{command_line, help_bar, screen_title},
    layouts, theme,
};

const FORM_WIDTH: u16 = 50;
const HELP_TEXT: &str = "Tab: switch field | Enter: sign in | Esc: browse jobs | : (empty field) register, oauth, forgot";

pub fn render(f: &mut Frame, state: &AppState) {
    let (title_area, content_area, help_area) = layouts::screen_layout(f.area());

    screen_title::render_screen_title(f, title_area, state, &LoadingState::NotStarted);
    render_form(f, content_area, state);
    help_bar::render_footer(f, help_area, state, HELP_TEXT);
}

fn render_form(f: &mut Frame, area: Rect, state: &AppState) {
    let form_area = layouts::centered_box(FORM_WIDTH, 8, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(theme::INPUT_HEIGHT),
            Constraint::Length(theme::INPUT_HEIGHT),
            Constraint::Length(2),
        ])
        .split(form_area);

    let form = &state.sign_in;
    let masked = "•".repeat(form.password.expose().chars().count());
    let fields = [
        (SignInField::Email, "Email", form.email.clone(), chunks[0]),
        (SignInField::Password, "Password", masked, chunks[1]),
    ];

    for (field, label, text, field_area) in fields {
        let focused = form.focus == field;
        let (style, border) = if focused {
            (theme::form_field_focused_style(), theme::accent_border_style())
        } else {
            (theme::form_field_style(), Style::default())
        };
        let input = Paragraph::new(text.as_str()).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(label),
        );
        f.render_widget(input, field_area);

        if focused && state.input_mode == InputMode::Normal {
            command_line::place_cursor(f, field_area, text.chars().count());
        }
    }

    let hint = Paragraph::new("New here? Type :register <role> <email> <password> <name>")
        .style(theme::help_text_style())
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[2]);
}
