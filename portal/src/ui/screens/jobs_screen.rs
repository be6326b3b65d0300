use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::state::{AppState, InputMode, LoadingState, LocationState};
use crate::ui::{
    components::{command_line, empty_state, help_bar, screen_title},
    layouts, theme,
};
use portal_api::endpoints::jobs::Job;
use portal_api::Page;

const HELP_TEXT: &str = "j/k: move | Enter: open | /: search | n/p: page | l: near me | c: clear | ?: help";
const SEARCH_HELP_TEXT: &str = "Type to search | Enter/Esc: done | Backspace: delete";

pub fn render(f: &mut Frame, state: &AppState) {
    let (title_area, content_area, help_area) = if state.input_mode == InputMode::Search {
        let (title_area, input_area, content_area, help_area) =
            layouts::screen_layout_with_input(f.area());
        let keyword = state.jobs.filter.keyword.as_deref().unwrap_or_default();
        command_line::render_text_input(f, input_area, "Search (Enter: done)", keyword);
        (title_area, content_area, help_area)
    } else {
        layouts::screen_layout(f.area())
    };

    screen_title::render_screen_title(f, title_area, state, &state.jobs.loading);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(content_area);
    render_filters(f, chunks[0], state);
    render_results(f, chunks[1], state);

    let help = if state.input_mode == InputMode::Search {
        SEARCH_HELP_TEXT
    } else {
        HELP_TEXT
    };
    help_bar::render_footer(f, help_area, state, help);
}

fn render_filters(f: &mut Frame, area: Rect, state: &AppState) {
    let filter = &state.jobs.filter;
    let mut active = Vec::new();
    if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
        active.push(format!("keyword: {}", keyword));
    }
    if let Some(location) = filter.location.as_deref().filter(|l| !l.trim().is_empty()) {
        active.push(format!("location: {}", location));
    }
    if let Some(job_type) = filter.job_type {
        active.push(format!("type: {}", job_type));
    }
    match &state.location {
        LocationState::Locating => active.push("finding your location...".to_string()),
        LocationState::Found(label) => active.push(format!("near: {}", label)),
        LocationState::Unknown | LocationState::Unavailable => {}
    }

    let text = if active.is_empty() {
        "All jobs".to_string()
    } else {
        active.join(" | ")
    };
    f.render_widget(Paragraph::new(text).style(theme::help_text_style()), area);
}

fn render_results(f: &mut Frame, area: Rect, state: &AppState) {
    match (&state.jobs.loading, &state.jobs.results) {
        (LoadingState::Error(message), _) => empty_state::render_error_state(
            f,
            area,
            "Jobs",
            &format!("Search failed: {}", message),
            "Press c to clear filters or : to run another search",
        ),
        (_, Some(page)) if !page.content.is_empty() => {
            render_job_list(f, area, page, state.selected, &page_title(page));
        }
        (_, Some(_)) => empty_state::render_empty_state(
            f,
            area,
            "Jobs",
            "No jobs match these filters",
            Some("Press c to clear filters"),
        ),
        (LoadingState::Loading, None) => {
            empty_state::render_loading_state(f, area, "Jobs", "Searching...")
        }
        _ => empty_state::render_empty_state(f, area, "Jobs", "No search yet", None),
    }
}

fn page_title(page: &Page<Job>) -> String {
    format!(
        "Jobs (page {} of {}, {} total)",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    )
}

/// Job rows with the selected one highlighted. Shared with the HR dashboard.
pub fn render_job_list(f: &mut Frame, area: Rect, page: &Page<Job>, selected: usize, title: &str) {
    let items: Vec<ListItem> = page
        .content
        .iter()
        .enumerate()
        .map(|(i, job)| {
            let style = if i == selected {
                theme::selection_style()
            } else {
                Style::default()
            };
            ListItem::new(job_line(job)).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn job_line(job: &Job) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("#{:<6}", job.id), theme::help_text_style()),
        Span::raw(job.title.clone()),
    ];
    if let Some(company) = &job.company_name {
        spans.push(Span::styled(format!(" @ {}", company), theme::title_style()));
    }
    if let Some(location) = &job.location {
        spans.push(Span::styled(format!(" ({})", location), theme::help_text_style()));
    }
    if let Some(job_type) = job.job_type {
        spans.push(Span::styled(format!(" [{}]", job_type), theme::loading_style()));
    }
    Line::from(spans)
}
