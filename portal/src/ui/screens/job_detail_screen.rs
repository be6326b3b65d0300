use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::state::{AppState, LoadingState};
use crate::ui::{
    components::{empty_state, help_bar, screen_title},
    layouts, theme,
};
use portal_api::endpoints::jobs::Job;

const HELP_TEXT: &str = "a: apply | h/Esc: back to jobs | ?: help";

pub fn render(f: &mut Frame, state: &AppState) {
    let (title_area, content_area, help_area) = layouts::screen_layout(f.area());

    let loading = if state.job_detail.is_some() {
        LoadingState::Loaded
    } else {
        LoadingState::Loading
    };
    screen_title::render_screen_title(f, title_area, state, &loading);

    match &state.job_detail {
        Some(job) => render_job(f, content_area, job),
        None => empty_state::render_loading_state(f, content_area, "Job", "Loading job..."),
    }
    help_bar::render_footer(f, help_area, state, HELP_TEXT);
}

fn render_job(f: &mut Frame, area: Rect, job: &Job) {
    let mut lines = vec![Line::from(Span::styled(job.title.clone(), theme::title_style()))];

    let mut field = |label: &str, value: String| {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", label), theme::header_style()),
            Span::raw(value),
        ]));
    };
    if let Some(company) = &job.company_name {
        field("Company", company.clone());
    }
    if let Some(location) = &job.location {
        field("Location", location.clone());
    }
    if let Some(job_type) = job.job_type {
        field("Type", job_type.to_string());
    }
    match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) => field("Salary", format!("{:.0} - {:.0}", min, max)),
        (Some(amount), None) | (None, Some(amount)) => field("Salary", format!("{:.0}", amount)),
        (None, None) => {}
    }
    if !job.skills.is_empty() {
        field("Skills", job.skills.join(", "));
    }

    if let Some(description) = &job.description {
        lines.push(Line::from(""));
        lines.extend(description.lines().map(|line| Line::from(line.to_string())));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(format!("Job #{}", job.id)));
    f.render_widget(paragraph, area);
}
