use crate::events::{AppCommand, Secret};
use crate::input::{InputLine, Key, KeyEvent};
use crate::state::*;
use portal_api::endpoints::{jobs::JobDraft, profile::UserSettings, JobId};
use std::fmt::Display;
use std::str::FromStr;

/// Map user input (KeyEvent) to AppCommand based on current UI state
/// Returns None if the key should be ignored
///
/// Enter at the `:` prompt is not handled here; the caller takes the line
/// and runs it through [`handle_line`].
pub fn handle_key_input(event: KeyEvent, state: &AppState) -> Option<AppCommand> {
    let key = event.key;

    // Priority 0: Ctrl+C always quits
    if event.modifiers.ctrl && key == Key::Char('c') {
        return Some(AppCommand::Quit);
    }

    // Priority 1: the command prompt owns every key
    if state.input_mode == InputMode::Command {
        return handle_command_line_keys(key, state);
    }

    // Priority 2: live search on the jobs list
    if state.input_mode == InputMode::Search {
        return handle_search_keys(key, state);
    }

    // Priority 3: help popup
    if state.help_visible {
        return match key {
            Key::Char('?') | Key::Esc => Some(AppCommand::ToggleHelp),
            Key::Char('q') => Some(AppCommand::Quit),
            _ => None,
        };
    }

    // Priority 4: logs overlay
    if state.logs_visible {
        return match key {
            Key::Char('L') | Key::Esc => Some(AppCommand::ToggleLogs),
            Key::Char('q') => Some(AppCommand::Quit),
            _ => None,
        };
    }

    // Priority 5: text entry screens
    match state.route {
        Route::SignIn => return handle_sign_in_keys(key, state),
        Route::VerifyOtp => {
            if let Some(command) = handle_otp_keys(key) {
                return Some(command);
            }
        }
        _ => {}
    }

    // Priority 6: global keys
    match key {
        Key::Char('q') => return Some(AppCommand::Quit),
        Key::Char('?') => return Some(AppCommand::ToggleHelp),
        Key::Char(':') => return Some(AppCommand::SetInputMode(InputMode::Command)),
        Key::Char('L') => return Some(AppCommand::ToggleLogs),
        Key::Char('H') => return Some(AppCommand::NavigateHome),
        Key::Char('J') => return Some(AppCommand::Navigate(Route::Jobs)),
        Key::Char('P') => return Some(AppCommand::Navigate(Route::Profile)),
        Key::Char('j') | Key::Down if state.list_len() > 0 => {
            return Some(AppCommand::SelectNext)
        }
        Key::Char('k') | Key::Up if state.list_len() > 0 => {
            return Some(AppCommand::SelectPrevious)
        }
        _ => {}
    }

    // Priority 7: page keys
    match (state.route, key) {
        (Route::Jobs, Key::Enter) => state.selected_job().map(|job| AppCommand::OpenJob(job.id)),
        (Route::Jobs, Key::Char('/')) => Some(AppCommand::SetInputMode(InputMode::Search)),
        (Route::Jobs, Key::Char('n') | Key::PageDown) => {
            let page = &state.jobs.results;
            let has_next = page
                .as_ref()
                .is_some_and(|p| p.number.saturating_add(1) < p.total_pages);
            has_next.then(|| AppCommand::SetPage(state.jobs.filter.page.saturating_add(1)))
        }
        (Route::Jobs, Key::Char('p') | Key::PageUp) if state.jobs.filter.page > 0 => {
            Some(AppCommand::SetPage(state.jobs.filter.page - 1))
        }
        (Route::Jobs, Key::Char('c')) => Some(AppCommand::ClearFilters),
        (Route::Jobs, Key::Char('l')) => Some(AppCommand::UseMyLocation),

        (Route::JobDetail(job_id), Key::Char('a')) => Some(AppCommand::Apply {
            job_id,
            cv_id: None,
        }),
        (Route::JobDetail(_), Key::Esc | Key::Char('h') | Key::Left) => {
            Some(AppCommand::Navigate(Route::Jobs))
        }

        (
            Route::CandidateDashboard
            | Route::HrDashboard
            | Route::HrManagerDashboard
            | Route::AdminDashboard,
            Key::Char('r'),
        ) => Some(AppCommand::LoadDashboard),
        (
            Route::CandidateDashboard
            | Route::HrDashboard
            | Route::HrManagerDashboard
            | Route::AdminDashboard,
            Key::Char('m'),
        ) if state.notifications.unread > 0 => Some(AppCommand::MarkAllNotificationsRead),
        (Route::HrDashboard | Route::HrManagerDashboard, Key::Enter) => state
            .selected_job()
            .map(|job| AppCommand::LoadApplicants(job.id)),

        (Route::Profile, Key::Char('r')) => Some(AppCommand::LoadProfile),

        (Route::AccessDenied, Key::Esc | Key::Enter) => Some(AppCommand::NavigateHome),

        _ => None,
    }
}

/// Pasted text goes to whatever is taking typed input.
pub fn handle_paste(text: &str, state: &AppState) -> Option<AppCommand> {
    if text.is_empty() {
        return None;
    }

    match state.input_mode {
        InputMode::Command => {
            let line = format!("{}{}", state.command_line, single_line(text));
            return Some(AppCommand::SetCommandLine(line));
        }
        InputMode::Search => {
            let keyword = format!("{}{}", current_keyword(state), single_line(text));
            return Some(AppCommand::SetKeyword(keyword));
        }
        InputMode::Normal => {}
    }

    match state.route {
        Route::VerifyOtp => Some(AppCommand::OtpPaste(text.to_string())),
        Route::SignIn => {
            let value = format!("{}{}", state.sign_in.focused_text(), single_line(text));
            Some(AppCommand::SetSignInField(Secret::new(value)))
        }
        _ => None,
    }
}

fn handle_command_line_keys(key: Key, state: &AppState) -> Option<AppCommand> {
    match key {
        Key::Esc => Some(AppCommand::SetInputMode(InputMode::Normal)),
        Key::Backspace if state.command_line.is_empty() => {
            Some(AppCommand::SetInputMode(InputMode::Normal))
        }
        Key::Backspace => {
            let mut line = state.command_line.clone();
            line.pop();
            Some(AppCommand::SetCommandLine(line))
        }
        Key::Char(c) if c != '\0' => {
            let mut line = state.command_line.clone();
            line.push(c);
            Some(AppCommand::SetCommandLine(line))
        }
        _ => None,
    }
}

/// Every keystroke updates the keyword; the executor debounces the search.
fn handle_search_keys(key: Key, state: &AppState) -> Option<AppCommand> {
    match key {
        Key::Enter | Key::Esc => Some(AppCommand::SetInputMode(InputMode::Normal)),
        Key::Backspace => {
            let mut keyword = current_keyword(state).to_string();
            keyword.pop()?;
            Some(AppCommand::SetKeyword(keyword))
        }
        Key::Char(c) if c != '\0' => {
            let mut keyword = current_keyword(state).to_string();
            keyword.push(c);
            Some(AppCommand::SetKeyword(keyword))
        }
        _ => None,
    }
}

fn handle_sign_in_keys(key: Key, state: &AppState) -> Option<AppCommand> {
    let form = &state.sign_in;
    match key {
        Key::Esc => Some(AppCommand::Navigate(Route::Jobs)),
        Key::Tab | Key::BackTab | Key::Up | Key::Down => Some(AppCommand::NextSignInField),
        Key::Enter => match form.focus {
            SignInField::Email => Some(AppCommand::NextSignInField),
            SignInField::Password => Some(AppCommand::SignIn {
                email: form.email.trim().to_string(),
                password: form.password.clone(),
            }),
        },
        Key::Backspace => {
            let mut value = form.focused_text().to_string();
            value.pop()?;
            Some(AppCommand::SetSignInField(Secret::new(value)))
        }
        // ':' is text once the field has some
        Key::Char(':') if form.focused_text().is_empty() => {
            Some(AppCommand::SetInputMode(InputMode::Command))
        }
        Key::Char(c) if c != '\0' => {
            let mut value = form.focused_text().to_string();
            value.push(c);
            Some(AppCommand::SetSignInField(Secret::new(value)))
        }
        _ => None,
    }
}

/// `None` lets the key fall through to the global keys.
fn handle_otp_keys(key: Key) -> Option<AppCommand> {
    match key {
        Key::Char(c) if c.is_ascii_digit() => Some(AppCommand::OtpType(c)),
        Key::Backspace => Some(AppCommand::OtpBackspace),
        Key::Enter => Some(AppCommand::SubmitOtp),
        Key::Char('r') => Some(AppCommand::ResendOtp),
        Key::Esc => Some(AppCommand::Navigate(Route::SignIn)),
        _ => None,
    }
}

fn current_keyword(state: &AppState) -> &str {
    state.jobs.filter.keyword.as_deref().unwrap_or_default()
}

fn single_line(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Map one line typed at the `:` prompt to an AppCommand.
///
/// `Ok(None)` means the line is ignored; `Err` carries a usage message for
/// the user.
pub fn handle_line(line: &str, state: &AppState) -> Result<Option<AppCommand>, String> {
    let Some(input) = InputLine::parse(line)? else {
        return Ok(None);
    };

    let command = match input.command.as_str() {
        "help" | "?" => AppCommand::ToggleHelp,
        "quit" | "exit" | "q" => AppCommand::Quit,
        "logs" => AppCommand::ToggleLogs,

        // Navigation
        "home" | "dashboard" => AppCommand::NavigateHome,
        "jobs" => AppCommand::Navigate(Route::Jobs),
        "go" => AppCommand::Navigate(parse_route(required(&input, 0, "route")?)?),
        "refresh" => AppCommand::LoadDashboard,

        // Authentication
        "login" | "signin" => AppCommand::SignIn {
            email: required(&input, 0, "email")?.to_string(),
            password: Secret::new(required(&input, 1, "password")?),
        },
        "register" | "signup" => {
            let role = parse(&input, 0, "role")?;
            let email = required(&input, 1, "email")?.to_string();
            let password = Secret::new(required(&input, 2, "password")?);
            AppCommand::Register {
                email,
                password,
                role,
                full_name: input.rest(3),
            }
        }
        "verify" => AppCommand::SubmitOtp,
        "resend" => AppCommand::ResendOtp,
        "oauth" => {
            let provider = parse(&input, 0, "provider")?;
            match (input.arg(1), input.arg(2)) {
                (None, _) => AppCommand::StartOAuth(provider),
                (Some(code), Some(oauth_state)) => AppCommand::CompleteOAuth {
                    provider,
                    code: code.to_string(),
                    state: oauth_state.to_string(),
                },
                (Some(_), None) => return Err(usage("oauth <provider> [<code> <state>]")),
            }
        }
        "forgot" => AppCommand::ForgotPassword {
            email: required(&input, 0, "email")?.to_string(),
        },
        "reset" => AppCommand::ResetPassword {
            token: Secret::new(required(&input, 0, "token")?),
            new_password: Secret::new(required(&input, 1, "new password")?),
        },
        "logout" | "signout" => AppCommand::SignOut,

        // Job search
        "search" => AppCommand::SetKeyword(input.rest(0)),
        "location" => AppCommand::SetLocation(input.rest(0)),
        "near-me" => AppCommand::UseMyLocation,
        "type" => match required(&input, 0, "job type")? {
            "any" | "all" => AppCommand::SetJobType(None),
            _ => AppCommand::SetJobType(Some(parse(&input, 0, "job type")?)),
        },
        "clear" => AppCommand::ClearFilters,
        "page" => {
            let page: u32 = parse(&input, 0, "page")?;
            AppCommand::SetPage(page.saturating_sub(1))
        }
        "next" => AppCommand::SetPage(state.jobs.filter.page.saturating_add(1)),
        "prev" => AppCommand::SetPage(state.jobs.filter.page.saturating_sub(1)),
        "job" | "open" => AppCommand::OpenJob(parse(&input, 0, "job id")?),

        // Applications
        "apply" => {
            let job_id = match (input.arg(0), state.route) {
                (Some(_), _) => parse(&input, 0, "job id")?,
                (None, Route::JobDetail(id)) => id,
                (None, _) => return Err(usage("apply <job id> [cv id]")),
            };
            AppCommand::Apply {
                job_id,
                cv_id: optional(&input, 1, "cv id")?,
            }
        }
        "applicants" => AppCommand::LoadApplicants(parse(&input, 0, "job id")?),
        "status" => AppCommand::UpdateApplicationStatus {
            id: parse(&input, 0, "application id")?,
            status: parse(&input, 1, "status")?,
        },
        "assign" => AppCommand::AssignApplication {
            id: parse(&input, 0, "application id")?,
            hr_username: required(&input, 1, "hr username")?.to_string(),
        },
        "history" => AppCommand::LoadApplicationHistory(parse(&input, 0, "application id")?),

        // Posted jobs
        "post-job" => AppCommand::CreateJob(parse_draft(&input, 0)?),
        "edit-job" => AppCommand::UpdateJob {
            id: parse(&input, 0, "job id")?,
            draft: parse_draft(&input, 1)?,
        },
        "delete-job" => AppCommand::DeleteJob(parse(&input, 0, "job id")?),
        "banner" => AppCommand::UploadJobBanner {
            id: parse(&input, 0, "job id")?,
            path: required(&input, 1, "path")?.into(),
        },

        // Skills
        "skills" => AppCommand::LoadSkills,
        "add-skill" => AppCommand::CreateSkill {
            name: required(&input, 0, "name")?.to_string(),
            category: input.arg(1).map(str::to_string),
        },
        "edit-skill" => AppCommand::UpdateSkill {
            id: parse(&input, 0, "skill id")?,
            name: required(&input, 1, "name")?.to_string(),
            category: input.arg(2).map(str::to_string),
        },
        "delete-skill" => AppCommand::DeleteSkill(parse(&input, 0, "skill id")?),

        // Reports
        "reports" => AppCommand::LoadReports,
        "report" => AppCommand::CreateReport {
            title: required(&input, 0, "title")?.to_string(),
            description: input.arg(1).unwrap_or_default().to_string(),
            attachments: input.args.iter().skip(2).map(Into::into).collect(),
        },
        "report-status" => AppCommand::UpdateReportStatus {
            id: parse(&input, 0, "report id")?,
            status: parse(&input, 1, "status")?,
        },

        // Profile
        "profile" => AppCommand::Navigate(Route::Profile),
        "edit-profile" => {
            let mut full_name = None;
            let mut phone = None;
            for (key, value) in options(&input, 0)? {
                match key {
                    "name" => full_name = Some(value.to_string()),
                    "phone" => phone = Some(value.to_string()),
                    other => return Err(format!("Unknown profile field '{}'", other)),
                }
            }
            AppCommand::UpdateProfile { full_name, phone }
        }
        "password" => AppCommand::ChangePassword {
            current: Secret::new(required(&input, 0, "current password")?),
            new_password: Secret::new(required(&input, 1, "new password")?),
        },
        "settings" => AppCommand::UpdateSettings(parse_settings(&input, state)?),

        // CVs
        "cvs" => AppCommand::LoadCvs,
        "upload" => AppCommand::UploadCv(required(&input, 0, "path")?.into()),
        "download" => AppCommand::DownloadCv {
            id: parse(&input, 0, "cv id")?,
            dest: required(&input, 1, "destination")?.into(),
        },
        "delete-cv" => AppCommand::DeleteCv(parse(&input, 0, "cv id")?),

        // Notifications
        "notifications" | "inbox" => AppCommand::LoadNotifications,
        "read" => AppCommand::MarkNotificationRead(parse(&input, 0, "notification id")?),
        "read-all" => AppCommand::MarkAllNotificationsRead,

        other => return Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
    };

    Ok(Some(command))
}

fn parse_route(name: &str) -> Result<Route, String> {
    let route = match name.to_ascii_lowercase().as_str() {
        "signin" | "sign-in" | "login" => Route::SignIn,
        "jobs" => Route::Jobs,
        "candidate" => Route::CandidateDashboard,
        "hr" => Route::HrDashboard,
        "hr-manager" | "manager" => Route::HrManagerDashboard,
        "admin" => Route::AdminDashboard,
        "profile" => Route::Profile,
        other => match other.parse::<JobId>() {
            Ok(id) => Route::JobDetail(id),
            Err(_) => return Err(format!("Unknown page '{}'", name)),
        },
    };
    Ok(route)
}

/// `post-job "<title>" "<description>" [location=..] [type=..] [min=..] [max=..] [skills=1,2]`
fn parse_draft(input: &InputLine, from: usize) -> Result<JobDraft, String> {
    let mut draft = JobDraft::new(
        required(input, from, "title")?,
        required(input, from + 1, "description")?,
    );

    for (key, value) in options(input, from + 2)? {
        match key {
            "location" => draft.location = Some(value.to_string()),
            "type" => draft.job_type = Some(parse_value("job type", value)?),
            "min" => draft.salary_min = Some(parse_value("salary", value)?),
            "max" => draft.salary_max = Some(parse_value("salary", value)?),
            "skills" => {
                draft.skill_ids = value
                    .split(',')
                    .filter(|id| !id.trim().is_empty())
                    .map(|id| parse_value("skill id", id.trim()))
                    .collect::<Result<_, _>>()?;
            }
            other => return Err(format!("Unknown job field '{}'", other)),
        }
    }
    Ok(draft)
}

/// Change one setting on top of the loaded ones:
/// `settings email-notifications on`, `settings language pt`.
fn parse_settings(input: &InputLine, state: &AppState) -> Result<UserSettings, String> {
    let Some(mut settings) = state.profile.settings.clone() else {
        return Err("Open your profile first (type 'profile')".to_string());
    };

    let value = required(input, 1, "value")?;
    match required(input, 0, "setting")? {
        "email-notifications" => settings.email_notifications = parse_switch(value)?,
        "job-alerts" => settings.job_alerts = parse_switch(value)?,
        "language" => settings.language = Some(value.to_string()),
        other => return Err(format!("Unknown setting '{}'", other)),
    }
    Ok(settings)
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(format!("Expected on or off, got '{}'", value)),
    }
}

/// `key=value` arguments from `from` on.
fn options(input: &InputLine, from: usize) -> Result<Vec<(&str, &str)>, String> {
    input
        .args
        .iter()
        .skip(from)
        .map(|arg| {
            arg.split_once('=')
                .ok_or_else(|| format!("Expected key=value, got '{}'", arg))
        })
        .collect()
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| format!("Invalid {} '{}': {}", name, raw, e))
}

fn usage(text: &str) -> String {
    format!("Usage: {}", text)
}

fn required<'a>(input: &'a InputLine, index: usize, name: &str) -> Result<&'a str, String> {
    input
        .arg(index)
        .ok_or_else(|| format!("Missing {} for '{}'", name, input.command))
}

fn parse<T>(input: &InputLine, index: usize, name: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(name, required(input, index, name)?)
}

fn optional<T>(input: &InputLine, index: usize, name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match input.arg(index) {
        Some(_) => parse(input, index, name).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_api::endpoints::{
        applications::ApplicationStatus, jobs::JobType, reports::ReportStatus, ApplicationId,
        NotificationId, ReportId, SkillId,
    };
    use portal_auth::{OAuthProvider, Role};

    fn command(line: &str, state: &AppState) -> AppCommand {
        handle_line(line, state).unwrap().unwrap()
    }

    fn key(key: Key, state: &AppState) -> Option<AppCommand> {
        handle_key_input(KeyEvent::new(key), state)
    }

    fn otp_state() -> AppState {
        let mut state = AppState::new();
        state.route = Route::VerifyOtp;
        state
    }

    fn jobs_state(ids: &[i64]) -> AppState {
        let content = ids
            .iter()
            .map(|id| serde_json::from_value(serde_json::json!({ "id": id, "title": "Job" })).unwrap())
            .collect();
        let mut state = AppState::new();
        state.jobs.results = Some(portal_api::Page {
            content,
            total_elements: ids.len() as u64,
            total_pages: 2,
            number: 0,
            size: 20,
        });
        state
    }

    #[test]
    fn test_quit_keys() {
        let state = AppState::new();
        assert_eq!(key(Key::Char('q'), &state), Some(AppCommand::Quit));
        assert_eq!(
            handle_key_input(KeyEvent::with_ctrl(Key::Char('c')), &state),
            Some(AppCommand::Quit)
        );
    }

    #[test]
    fn test_help_popup_takes_precedence() {
        let mut state = AppState::new();
        assert_eq!(key(Key::Char('?'), &state), Some(AppCommand::ToggleHelp));

        state.help_visible = true;
        assert_eq!(key(Key::Esc, &state), Some(AppCommand::ToggleHelp));
        assert_eq!(key(Key::Char('/'), &state), None);
        assert_eq!(key(Key::Char('q'), &state), Some(AppCommand::Quit));
    }

    #[test]
    fn test_colon_opens_the_prompt_and_keys_edit_it() {
        let mut state = AppState::new();
        assert_eq!(
            key(Key::Char(':'), &state),
            Some(AppCommand::SetInputMode(InputMode::Command))
        );

        state.input_mode = InputMode::Command;
        state.command_line = "jo".into();
        assert_eq!(
            key(Key::Char('b'), &state),
            Some(AppCommand::SetCommandLine("job".into()))
        );
        // 'q' is text here, not quit
        assert_eq!(
            key(Key::Char('q'), &state),
            Some(AppCommand::SetCommandLine("joq".into()))
        );
        assert_eq!(
            key(Key::Backspace, &state),
            Some(AppCommand::SetCommandLine("j".into()))
        );
        assert_eq!(
            key(Key::Esc, &state),
            Some(AppCommand::SetInputMode(InputMode::Normal))
        );

        state.command_line.clear();
        assert_eq!(
            key(Key::Backspace, &state),
            Some(AppCommand::SetInputMode(InputMode::Normal))
        );
    }

    #[test]
    fn test_search_keystrokes_update_the_keyword() {
        let mut state = AppState::new();
        assert_eq!(
            key(Key::Char('/'), &state),
            Some(AppCommand::SetInputMode(InputMode::Search))
        );

        state.input_mode = InputMode::Search;
        state.jobs.filter.keyword = Some("rus".into());
        assert_eq!(
            key(Key::Char('t'), &state),
            Some(AppCommand::SetKeyword("rust".into()))
        );
        assert_eq!(
            key(Key::Backspace, &state),
            Some(AppCommand::SetKeyword("ru".into()))
        );
        assert_eq!(
            key(Key::Enter, &state),
            Some(AppCommand::SetInputMode(InputMode::Normal))
        );

        state.jobs.filter.keyword = None;
        assert_eq!(key(Key::Backspace, &state), None);
    }

    #[test]
    fn test_job_list_keys() {
        let mut state = jobs_state(&[4, 8]);
        assert_eq!(key(Key::Char('j'), &state), Some(AppCommand::SelectNext));
        assert_eq!(key(Key::Up, &state), Some(AppCommand::SelectPrevious));

        state.selected = 1;
        assert_eq!(key(Key::Enter, &state), Some(AppCommand::OpenJob(JobId(8))));
        assert_eq!(key(Key::Char('n'), &state), Some(AppCommand::SetPage(1)));
        // Already on the first page
        assert_eq!(key(Key::Char('p'), &state), None);
        assert_eq!(key(Key::Char('c'), &state), Some(AppCommand::ClearFilters));
        assert_eq!(key(Key::Char('l'), &state), Some(AppCommand::UseMyLocation));

        let empty = AppState::new();
        assert_eq!(key(Key::Enter, &empty), None);
        assert_eq!(key(Key::Char('j'), &empty), None);
    }

    #[test]
    fn test_job_detail_keys() {
        let mut state = AppState::new();
        state.route = Route::JobDetail(JobId(7));
        assert_eq!(
            key(Key::Char('a'), &state),
            Some(AppCommand::Apply {
                job_id: JobId(7),
                cv_id: None,
            })
        );
        assert_eq!(key(Key::Esc, &state), Some(AppCommand::Navigate(Route::Jobs)));
    }

    #[test]
    fn test_hr_dashboard_enter_loads_applicants() {
        let mut state = AppState::new();
        state.route = Route::HrDashboard;
        state.dashboard.hr_jobs = jobs_state(&[3]).jobs.results;
        assert_eq!(key(Key::Enter, &state), Some(AppCommand::LoadApplicants(JobId(3))));
        assert_eq!(key(Key::Char('r'), &state), Some(AppCommand::LoadDashboard));
        // Nothing unread
        assert_eq!(key(Key::Char('m'), &state), None);
    }

    #[test]
    fn test_sign_in_form_keys() {
        let mut state = AppState::new();
        state.route = Route::SignIn;
        state.sign_in.email = "ana@example.co".into();
        assert_eq!(
            key(Key::Char('m'), &state),
            Some(AppCommand::SetSignInField(Secret::new("ana@example.com")))
        );
        // Letters are text on this page
        assert!(matches!(
            key(Key::Char('q'), &state),
            Some(AppCommand::SetSignInField(_))
        ));
        assert!(matches!(
            key(Key::Char(':'), &state),
            Some(AppCommand::SetSignInField(_))
        ));
        assert_eq!(key(Key::Tab, &state), Some(AppCommand::NextSignInField));
        assert_eq!(key(Key::Enter, &state), Some(AppCommand::NextSignInField));

        state.sign_in.focus = SignInField::Password;
        state.sign_in.password = Secret::new("hunter22");
        assert_eq!(
            key(Key::Enter, &state),
            Some(AppCommand::SignIn {
                email: "ana@example.co".into(),
                password: Secret::new("hunter22"),
            })
        );
        assert_eq!(key(Key::Esc, &state), Some(AppCommand::Navigate(Route::Jobs)));

        state.sign_in.password = Secret::default();
        assert_eq!(
            key(Key::Char(':'), &state),
            Some(AppCommand::SetInputMode(InputMode::Command))
        );
    }

    #[test]
    fn test_otp_cells_take_key_presses() {
        let state = otp_state();
        assert_eq!(key(Key::Char('4'), &state), Some(AppCommand::OtpType('4')));
        assert_eq!(key(Key::Backspace, &state), Some(AppCommand::OtpBackspace));
        assert_eq!(key(Key::Enter, &state), Some(AppCommand::SubmitOtp));
        assert_eq!(key(Key::Char('r'), &state), Some(AppCommand::ResendOtp));
        assert_eq!(key(Key::Esc, &state), Some(AppCommand::Navigate(Route::SignIn)));
        // Global keys still reach through
        assert_eq!(key(Key::Char('?'), &state), Some(AppCommand::ToggleHelp));
    }

    #[test]
    fn test_paste_goes_to_the_active_input() {
        let mut state = otp_state();
        assert_eq!(
            handle_paste("123-456", &state),
            Some(AppCommand::OtpPaste("123-456".into()))
        );

        state.route = Route::SignIn;
        state.sign_in.email = "ana@".into();
        assert_eq!(
            handle_paste("example.com\n", &state),
            Some(AppCommand::SetSignInField(Secret::new("ana@example.com")))
        );

        state.route = Route::Jobs;
        assert_eq!(handle_paste("anything", &state), None);

        state.input_mode = InputMode::Search;
        assert_eq!(
            handle_paste("rust dev", &state),
            Some(AppCommand::SetKeyword("rust dev".into()))
        );
    }

    #[test]
    fn test_quit_command() {
        let state = AppState::new();
        assert_eq!(command("quit", &state), AppCommand::Quit);
        assert_eq!(command("q", &state), AppCommand::Quit);
    }

    #[test]
    fn test_help_and_logs_words() {
        let state = AppState::new();
        assert_eq!(command("help", &state), AppCommand::ToggleHelp);
        assert_eq!(command("logs", &state), AppCommand::ToggleLogs);
        assert_eq!(handle_line("   ", &state).unwrap(), None);
    }

    #[test]
    fn test_login_wraps_password() {
        let state = AppState::new();
        assert_eq!(
            command("login ana@example.com hunter22", &state),
            AppCommand::SignIn {
                email: "ana@example.com".into(),
                password: Secret::new("hunter22"),
            }
        );
        assert!(handle_line("login ana@example.com", &state)
            .unwrap_err()
            .contains("password"));
    }

    #[test]
    fn test_register_takes_rest_as_full_name() {
        let state = AppState::new();
        assert_eq!(
            command("register hr-manager bo@example.com Secret123 Bo Lind", &state),
            AppCommand::Register {
                email: "bo@example.com".into(),
                password: Secret::new("Secret123"),
                role: Role::HrManager,
                full_name: "Bo Lind".into(),
            }
        );
        assert!(handle_line("register wizard a@b.co pw Name", &state).is_err());
    }

    #[test]
    fn test_oauth_start_and_complete() {
        let state = AppState::new();
        assert_eq!(
            command("oauth github", &state),
            AppCommand::StartOAuth(OAuthProvider::Github)
        );
        assert_eq!(
            command("oauth google abc xyz", &state),
            AppCommand::CompleteOAuth {
                provider: OAuthProvider::Google,
                code: "abc".into(),
                state: "xyz".into(),
            }
        );
        assert!(handle_line("oauth google abc", &state).is_err());
    }

    #[test]
    fn test_prompt_on_otp_screen() {
        let state = otp_state();
        assert_eq!(command("verify", &state), AppCommand::SubmitOtp);
        assert_eq!(command("resend", &state), AppCommand::ResendOtp);
        assert_eq!(command("jobs", &state), AppCommand::Navigate(Route::Jobs));
        // Digits are typed into the cells, not the prompt
        assert!(handle_line("123456", &state).is_err());
    }

    #[test]
    fn test_search_filters() {
        let state = AppState::new();
        assert_eq!(
            command("search rust developer", &state),
            AppCommand::SetKeyword("rust developer".into())
        );
        assert_eq!(command("search", &state), AppCommand::SetKeyword(String::new()));
        assert_eq!(
            command(r#"location "São Paulo""#, &state),
            AppCommand::SetLocation("São Paulo".into())
        );
        assert_eq!(
            command("type part-time", &state),
            AppCommand::SetJobType(Some(JobType::PartTime))
        );
        assert_eq!(command("type any", &state), AppCommand::SetJobType(None));
        assert_eq!(command("near-me", &state), AppCommand::UseMyLocation);
    }

    #[test]
    fn test_pages_are_one_based_for_the_user() {
        let mut state = AppState::new();
        assert_eq!(command("page 3", &state), AppCommand::SetPage(2));
        assert_eq!(command("page 0", &state), AppCommand::SetPage(0));
        assert_eq!(command("prev", &state), AppCommand::SetPage(0));

        state.jobs.filter.page = 4;
        assert_eq!(command("next", &state), AppCommand::SetPage(5));
        assert!(handle_line("page two", &state).is_err());
    }

    #[test]
    fn test_apply_uses_open_job() {
        let mut state = AppState::new();
        assert!(handle_line("apply", &state).is_err());

        state.route = Route::JobDetail(JobId(7));
        assert_eq!(
            command("apply", &state),
            AppCommand::Apply {
                job_id: JobId(7),
                cv_id: None,
            }
        );
        assert!(handle_line("apply 7 not-a-uuid", &state).is_err());
    }

    #[test]
    fn test_hr_commands() {
        let state = AppState::new();
        assert_eq!(
            command("status 12 interview", &state),
            AppCommand::UpdateApplicationStatus {
                id: ApplicationId(12),
                status: ApplicationStatus::Interview,
            }
        );
        assert_eq!(
            command("assign 12 carla", &state),
            AppCommand::AssignApplication {
                id: ApplicationId(12),
                hr_username: "carla".into(),
            }
        );
        assert_eq!(
            command("applicants 3", &state),
            AppCommand::LoadApplicants(JobId(3))
        );
    }

    #[test]
    fn test_go_routes() {
        let state = AppState::new();
        assert_eq!(
            command("go admin", &state),
            AppCommand::Navigate(Route::AdminDashboard)
        );
        assert_eq!(
            command("go 42", &state),
            AppCommand::Navigate(Route::JobDetail(JobId(42)))
        );
        assert!(handle_line("go nowhere", &state).is_err());
    }

    #[test]
    fn test_post_job_with_options() {
        let state = AppState::new();
        let AppCommand::CreateJob(draft) = command(
            r#"post-job "Rust engineer" "Build services" location=Hanoi type=remote min=1000 skills=1,4"#,
            &state,
        ) else {
            panic!("expected a job draft");
        };
        assert_eq!(draft.title, "Rust engineer");
        assert_eq!(draft.location.as_deref(), Some("Hanoi"));
        assert_eq!(draft.job_type, Some(JobType::Remote));
        assert_eq!(draft.salary_min, Some(1000.0));
        assert_eq!(draft.skill_ids, vec![SkillId(1), SkillId(4)]);

        assert!(handle_line(r#"post-job "T" "D" pay=lots"#, &state).is_err());
        assert!(handle_line(r#"post-job "T" "D" remote"#, &state).is_err());
        assert!(handle_line("edit-job 4 OnlyTitle", &state).is_err());
    }

    #[test]
    fn test_report_collects_attachments() {
        let state = AppState::new();
        assert_eq!(
            command(r#"report "Broken link" "404 on apply" a.png b.jpg"#, &state),
            AppCommand::CreateReport {
                title: "Broken link".into(),
                description: "404 on apply".into(),
                attachments: vec!["a.png".into(), "b.jpg".into()],
            }
        );
        assert_eq!(
            command("report-status 9 in-progress", &state),
            AppCommand::UpdateReportStatus {
                id: ReportId(9),
                status: ReportStatus::InProgress,
            }
        );
    }

    #[test]
    fn test_skill_words() {
        let state = AppState::new();
        assert_eq!(
            command("edit-skill 2 Rust Languages", &state),
            AppCommand::UpdateSkill {
                id: SkillId(2),
                name: "Rust".into(),
                category: Some("Languages".into()),
            }
        );
        assert_eq!(command("delete-skill 2", &state), AppCommand::DeleteSkill(SkillId(2)));
    }

    #[test]
    fn test_settings_build_on_loaded_values() {
        let mut state = AppState::new();
        assert!(handle_line("settings job-alerts on", &state)
            .unwrap_err()
            .contains("profile"));

        state.profile.settings = Some(UserSettings {
            email_notifications: true,
            job_alerts: false,
            language: Some("en".into()),
        });
        assert_eq!(
            command("settings job-alerts on", &state),
            AppCommand::UpdateSettings(UserSettings {
                email_notifications: true,
                job_alerts: true,
                language: Some("en".into()),
            })
        );
        assert!(handle_line("settings job-alerts maybe", &state).is_err());
    }

    #[test]
    fn test_profile_words() {
        let state = AppState::new();
        assert_eq!(command("profile", &state), AppCommand::Navigate(Route::Profile));
        assert_eq!(
            command(r#"edit-profile name="Ana Lee" phone=123"#, &state),
            AppCommand::UpdateProfile {
                full_name: Some("Ana Lee".into()),
                phone: Some("123".into()),
            }
        );
        assert_eq!(
            command("read 5", &state),
            AppCommand::MarkNotificationRead(NotificationId(5))
        );
    }
}
