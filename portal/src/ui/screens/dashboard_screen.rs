use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::state::{AppState, DashboardState, LoadingState, Route};
use crate::ui::{
    components::{empty_state, help_bar, screen_title},
    layouts, theme,
};

use super::jobs_screen;
use portal_api::endpoints::reports::ReportStatus;

const CANDIDATE_HELP: &str = "j/k: move | r: refresh | m: mark read | : upload, apply, report | ?: help";
const HR_HELP: &str = "j/k: move | Enter: applicants | r: refresh | : status, assign, post-job | ?: help";
const ADMIN_HELP: &str = "j/k: move | r: refresh | : report-status, add-skill | ?: help";

pub fn render(f: &mut Frame, state: &AppState) {
    let (title_area, content_area, help_area) = layouts::screen_layout(f.area());
    let dashboard = &state.dashboard;

    screen_title::render_screen_title(f, title_area, state, &dashboard.loading);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(content_area);
    render_overview(f, chunks[0], dashboard);

    let (list_area, detail_area) = layouts::list_with_details(chunks[1]);
    render_main_list(f, list_area, state);
    render_details(f, detail_area, state);

    let help = match state.route {
        Route::HrDashboard | Route::HrManagerDashboard => HR_HELP,
        Route::AdminDashboard => ADMIN_HELP,
        _ => CANDIDATE_HELP,
    };
    help_bar::render_footer(f, help_area, state, help);
}

fn render_overview(f: &mut Frame, area: Rect, dashboard: &DashboardState) {
    let text = if let Some(stats) = &dashboard.system_stats {
        format!(
            "Users {} (candidates {}) | companies {} | jobs {} open of {} | applications {}",
            stats.total_users,
            stats.total_candidates,
            stats.total_companies,
            stats.open_jobs,
            stats.total_jobs,
            stats.total_applications
        )
    } else if let Some(stats) = &dashboard.stats {
        format!(
            "Applications {} | pending {} | reviewing {} | interview {} | accepted {} | rejected {}",
            stats.total,
            stats.pending,
            stats.reviewing,
            stats.interview,
            stats.accepted,
            stats.rejected
        )
    } else if let LoadingState::Error(message) = &dashboard.loading {
        format!("Could not load: {}", message)
    } else {
        String::new()
    };

    let overview = Paragraph::new(text)
        .style(theme::header_style())
        .block(Block::default().borders(Borders::ALL).title("Overview"));
    f.render_widget(overview, area);
}

/// The selectable list: applications, the company's jobs, or reports.
fn render_main_list(f: &mut Frame, area: Rect, state: &AppState) {
    let dashboard = &state.dashboard;

    let (title, items): (&str, Option<Vec<ListItem>>) = match state.route {
        Route::HrDashboard | Route::HrManagerDashboard => {
            if let Some(page) = dashboard.hr_jobs.as_ref().filter(|p| !p.content.is_empty()) {
                jobs_screen::render_job_list(f, area, page, state.selected, "Our jobs");
                return;
            }
            ("Our jobs", dashboard.hr_jobs.as_ref().map(|_| Vec::new()))
        }
        Route::AdminDashboard => (
            "Reports",
            dashboard.reports.as_ref().map(|page| {
                page.content
                    .iter()
                    .map(|report| {
                        ListItem::new(format!(
                            "#{:<5} {:<12} {}{}",
                            report.id,
                            report_status_label(report.status),
                            report.title,
                            report
                                .reporter
                                .as_deref()
                                .map(|who| format!(" ({})", who))
                                .unwrap_or_default()
                        ))
                    })
                    .collect()
            }),
        ),
        _ => (
            "My applications",
            dashboard.applications.as_ref().map(|page| {
                page.content
                    .iter()
                    .map(|application| {
                        ListItem::new(Line::from(vec![
                            Span::styled(
                                format!("{:<10} ", application.status),
                                Style::default()
                                    .fg(theme::application_status_color(application.status)),
                            ),
                            Span::raw(
                                application
                                    .job_title
                                    .clone()
                                    .unwrap_or_else(|| format!("Job #{}", application.job_id)),
                            ),
                        ]))
                    })
                    .collect()
            }),
        ),
    };

    match items {
        Some(items) if !items.is_empty() => {
            let items: Vec<ListItem> = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    if i == state.selected {
                        item.style(theme::selection_style())
                    } else {
                        item
                    }
                })
                .collect();
            let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(list, area);
        }
        Some(_) => empty_state::render_empty_state(f, area, title, "Nothing here yet", None),
        None if dashboard.loading == LoadingState::Loading => {
            empty_state::render_loading_state(f, area, title, "Loading...")
        }
        None => empty_state::render_empty_state(f, area, title, "Not loaded", Some("Press r to refresh")),
    }
}

/// Everything else the dashboard loaded, as labelled sections.
fn render_details(f: &mut Frame, area: Rect, state: &AppState) {
    let dashboard = &state.dashboard;
    let mut lines: Vec<Line> = Vec::new();

    if let Some(page) = &dashboard.applicants {
        push_section(&mut lines, "Applicants".to_string());
        if page.content.is_empty() {
            lines.push(Line::from("  none"));
        }
        for application in &page.content {
            lines.push(Line::from(vec![
                Span::raw(format!("  #{:<6} ", application.id)),
                Span::styled(
                    format!("{:<10} ", application.status),
                    Style::default().fg(theme::application_status_color(application.status)),
                ),
                Span::raw(application.candidate_name.clone().unwrap_or_default()),
                Span::styled(
                    application
                        .assigned_hr
                        .as_deref()
                        .map(|hr| format!(" -> {}", hr))
                        .unwrap_or_default(),
                    theme::help_text_style(),
                ),
            ]));
        }
    }

    if let Some((id, entries)) = &dashboard.history {
        push_section(&mut lines, format!("History of application #{}", id));
        for entry in entries {
            lines.push(Line::from(format!(
                "  {} {} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.action,
                entry.actor.as_deref().unwrap_or("")
            )));
        }
    }

    if !dashboard.cvs.is_empty() {
        push_section(&mut lines, "CVs".to_string());
        for cv in &dashboard.cvs {
            lines.push(Line::from(format!("  {} {}", cv.id, cv.file_name)));
        }
    }

    if !dashboard.skills.is_empty() {
        push_section(&mut lines, "Skills".to_string());
        for skill in &dashboard.skills {
            lines.push(Line::from(format!(
                "  #{:<4} {}{}",
                skill.id,
                skill.name,
                skill
                    .category
                    .as_deref()
                    .map(|c| format!(" ({})", c))
                    .unwrap_or_default()
            )));
        }
    }

    if let Some(log) = &dashboard.audit_log {
        push_section(&mut lines, "Audit log".to_string());
        for entry in &log.content {
            lines.push(Line::from(format!(
                "  {} {:<24} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.action,
                entry.actor.as_deref().unwrap_or("system")
            )));
        }
    }

    if !state.notifications.items.is_empty() {
        push_section(&mut lines, "Notifications".to_string());
        for notification in &state.notifications.items {
            let marker = if notification.read { " " } else { "•" };
            lines.push(Line::from(format!(
                "  {} #{} {}",
                marker, notification.id, notification.title
            )));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("Nothing else to show", theme::help_text_style())));
    }

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Details"));
    f.render_widget(details, area);
}

fn push_section(lines: &mut Vec<Line>, heading: String) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(heading, theme::header_style())));
}

fn report_status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Open => "open",
        ReportStatus::InProgress => "in progress",
        ReportStatus::Resolved => "resolved",
        ReportStatus::Rejected => "rejected",
    }
}
