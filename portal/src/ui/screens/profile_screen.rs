use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::state::{AppState, LoadingState, ProfileState};
use crate::ui::{
    components::{empty_state, help_bar, screen_title},
    layouts, theme,
};

const HELP_TEXT: &str = "r: reload | : edit-profile, password, settings | ?: help";

pub fn render(f: &mut Frame, state: &AppState) {
    let (title_area, content_area, help_area) = layouts::screen_layout(f.area());
    let profile = &state.profile;

    screen_title::render_screen_title(f, title_area, state, &profile.loading);
    render_content(f, content_area, profile);
    help_bar::render_footer(f, help_area, state, HELP_TEXT);
}

fn render_content(f: &mut Frame, area: Rect, state: &ProfileState) {
    let Some(profile) = &state.profile else {
        match &state.loading {
            LoadingState::Error(message) => empty_state::render_error_state(
                f,
                area,
                "Profile",
                message,
                "Press r to try again",
            ),
            _ => empty_state::render_loading_state(f, area, "Profile", "Loading profile..."),
        }
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(5)])
        .split(area);

    let not_set = || "-".to_string();
    let account = vec![
        field("Username", profile.username.clone()),
        field("Email", profile.email.clone()),
        field("Name", profile.full_name.clone().unwrap_or_else(not_set)),
        field("Phone", profile.phone.clone().unwrap_or_else(not_set)),
        field("Roles", profile.roles.join(", ")),
        field(
            "Company",
            profile
                .company_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(not_set),
        ),
    ];
    f.render_widget(
        Paragraph::new(account).block(Block::default().borders(Borders::ALL).title("Account")),
        chunks[0],
    );

    let settings = match &state.settings {
        Some(settings) => vec![
            field("Email notifications", on_off(settings.email_notifications)),
            field("Job alerts", on_off(settings.job_alerts)),
            field(
                "Language",
                settings.language.clone().unwrap_or_else(not_set),
            ),
        ],
        None => vec![Line::from(Span::styled(
            "Settings not loaded",
            theme::help_text_style(),
        ))],
    };
    f.render_widget(
        Paragraph::new(settings).block(Block::default().borders(Borders::ALL).title("Settings")),
        chunks[1],
    );
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<22}", label), theme::header_style()),
        Span::raw(value),
    ])
}

fn on_off(value: bool) -> String {
    if value { "on" } else { "off" }.to_string()
}
