use ratatui::{
    prelude::*,
    widgets::{List, ListItem},
};

use crate::state::{AppState, InputMode, Route};
use crate::ui::{components::popup, layouts, theme};

pub fn render_help_popup(f: &mut Frame, state: &AppState) {
    let inner = popup::render_popup_frame(
        f,
        f.area(),
        layouts::popup_sizes::LARGE,
        " Help (press ? or Esc to close) ",
        theme::accent_border_style(),
    );

    let items: Vec<ListItem> = help_items(state)
        .into_iter()
        .map(|(key, description)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:22}", key), theme::header_style()),
                Span::raw(description),
            ]))
        })
        .collect();

    let list = List::new(items).style(Style::default().fg(Color::White));

    f.render_widget(list, inner);
}

fn help_items(state: &AppState) -> Vec<(&'static str, &'static str)> {
    let mut items = vec![];

    match state.route {
        Route::SignIn => {
            items.push(("Type", "Fill the focused field"));
            items.push(("Tab/↑/↓", "Switch between email and password"));
            items.push(("Enter", "Next field, then sign in"));
            items.push((":", "Command prompt, when the focused field is empty"));
            items.push(("Esc", "Browse jobs as a guest"));
        }
        Route::VerifyOtp => {
            items.push(("0-9", "Fill the focused digit"));
            items.push(("Backspace", "Erase a digit"));
            items.push(("Ctrl+V / paste", "Spread a copied code over the cells"));
            items.push(("Enter", "Verify the code"));
            items.push(("r", "Send a new code once the countdown ends"));
            items.push(("Esc", "Back to sign in"));
        }
        Route::Jobs => {
            items.push(("↑/k ↓/j", "Move selection"));
            items.push(("Enter", "Open the selected job"));
            items.push(("/", "Search as you type"));
            if state.input_mode == InputMode::Search {
                items.push(("Enter/Esc", "Leave search (keep the keyword)"));
                items.push(("Backspace", "Delete last character"));
            }
            items.push(("n/PgDn p/PgUp", "Next or previous page"));
            items.push(("l", "Jobs near my location"));
            items.push(("c", "Clear all filters"));
        }
        Route::JobDetail(_) => {
            items.push(("a", "Apply to this job"));
            items.push(("h/←/Esc", "Back to the job list"));
        }
        Route::CandidateDashboard | Route::AdminDashboard => {
            items.push(("↑/k ↓/j", "Move selection"));
            items.push(("r", "Refresh"));
            items.push(("m", "Mark all notifications read"));
        }
        Route::HrDashboard | Route::HrManagerDashboard => {
            items.push(("↑/k ↓/j", "Move selection"));
            items.push(("Enter", "Show applicants for the selected job"));
            items.push(("r", "Refresh"));
            items.push(("m", "Mark all notifications read"));
        }
        Route::Profile => {
            items.push(("r", "Reload profile and settings"));
        }
        Route::AccessDenied => {
            items.push(("Enter/Esc", "Go to your home page"));
        }
    }

    items.push(("", ""));
    items.push(("--- Global ---", ""));
    items.push(("H / J / P", "Home, jobs, profile"));
    items.push(("L", "Toggle session logs"));
    items.push((":", "Open the command prompt"));
    items.push(("?", "Toggle this help"));
    items.push(("q / Ctrl+C", "Quit application"));

    items.push(("", ""));
    items.push(("--- Commands (:) ---", ""));
    items.push(("login register", "<email> <password> | <role> <email> <password> <name>"));
    items.push(("oauth forgot reset", "<provider> [code state] | <email> | <token> <password>"));
    items.push(("logout verify resend", "End the session, submit or resend the code"));
    items.push(("search location type", "<words> | <city> | <type|any>"));
    items.push(("page next prev clear", "Move through results, reset filters"));
    items.push(("job apply", "<id> | [job] [cv]"));
    items.push(("applicants status", "<job> | <application> <status>"));
    items.push(("assign history", "<application> <hr> | <application>"));
    items.push(("post-job edit-job", "\"title\" \"description\" [location= type= min= max= skills=]"));
    items.push(("delete-job banner", "<job> | <job> <image>"));
    items.push(("skills add-skill", "list | <name> [category]"));
    items.push(("edit-skill delete-skill", "<id> <name> [category] | <id>"));
    items.push(("report reports", "<title> [description] [images...] | list"));
    items.push(("report-status", "<id> <open|in-progress|resolved|rejected>"));
    items.push(("profile edit-profile", "open | name=.. phone=.."));
    items.push(("password settings", "<current> <new> | <setting> <value>"));
    items.push(("cvs upload download", "list | <path> | <cv> <destination>"));
    items.push(("delete-cv", "<cv>"));
    items.push(("notifications read", "list | <id>"));
    items.push(("read-all go home logs", "Mark all read, open a page, toggle logs"));

    items
}
