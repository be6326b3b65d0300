use crate::background::{data_loader::DataLoader, BackgroundTaskManager};
use crate::events::AppCommand;
use crate::state::validators::{
    validate_email, validate_full_name, validate_otp, validate_password,
};
use crate::state::*;
use portal_api::endpoints::jobs::{JobDraft, JobFilter};
use portal_api::endpoints::skills::SkillInput;
use portal_auth::{Registration, Role};
use std::time::Instant;

const HIRING_ROLES: &[Role] = &[Role::Hr, Role::HrManager];

/// Execute a command: apply its local state change, then spawn whatever
/// background work it needs.
pub fn execute_command(
    command: AppCommand,
    state: &mut AppState,
    task_manager: &mut BackgroundTaskManager,
    data_loader: &DataLoader,
) {
    if !apply_local(&command, state) {
        return;
    }

    let loader = data_loader.clone();
    match command {
        AppCommand::Navigate(_) | AppCommand::NavigateHome | AppCommand::OpenJob(_) => {
            load_route(state, task_manager, data_loader);
        }

        // Authentication
        AppCommand::SignIn { email, password } => {
            task_manager.spawn_load_task("auth", async move {
                loader.sign_in(email.trim().to_string(), password).await;
            });
        }
        AppCommand::Register {
            email,
            password,
            role,
            full_name,
        } => {
            let registration = Registration {
                full_name: full_name.split_whitespace().collect::<Vec<_>>().join(" "),
                email: email.trim().to_string(),
                password: password.expose().to_string(),
                role,
                phone: None,
            };
            task_manager.spawn_load_task("auth", async move {
                loader.register(registration).await;
            });
        }
        AppCommand::SubmitOtp => {
            let Some((email, code)) = state
                .otp
                .as_ref()
                .and_then(|flow| Some((flow.email.clone(), flow.input.code()?)))
            else {
                return;
            };
            task_manager.spawn_load_task("auth", async move {
                loader.verify_otp(email, code).await;
            });
        }
        AppCommand::ResendOtp => {
            let Some(email) = state.otp.as_ref().map(|flow| flow.email.clone()) else {
                return;
            };
            task_manager.spawn_load_task("resend_otp", async move {
                loader.resend_otp(email).await;
            });
        }
        AppCommand::StartOAuth(provider) => {
            task_manager.spawn_load_task("auth", async move {
                loader.start_oauth(provider).await;
            });
        }
        AppCommand::CompleteOAuth {
            provider,
            code,
            state: oauth_state,
        } => {
            task_manager.spawn_load_task("auth", async move {
                loader.complete_oauth(provider, code, oauth_state).await;
            });
        }
        AppCommand::ForgotPassword { email } => {
            task_manager.spawn_load_task("password", async move {
                loader.forgot_password(email.trim().to_string()).await;
            });
        }
        AppCommand::ResetPassword {
            token,
            new_password,
        } => {
            task_manager.spawn_load_task("password", async move {
                loader.reset_password(token, new_password).await;
            });
        }
        AppCommand::SignOut => {
            task_manager.spawn_load_task("auth", async move {
                loader.sign_out().await;
            });
        }

        // Job search: typing is debounced, paging is immediate
        AppCommand::SetKeyword(_)
        | AppCommand::SetLocation(_)
        | AppCommand::SetJobType(_)
        | AppCommand::ClearFilters => {
            let generation = state.jobs.generation;
            let filter = state.jobs.filter.clone().normalized();
            task_manager.spawn_debounced_search(move || async move {
                loader.search_jobs(generation, filter).await;
            });
        }
        AppCommand::SetPage(_) => {
            search_now(state, task_manager, data_loader);
        }
        AppCommand::UseMyLocation => {
            task_manager.spawn_load_task("locate", async move {
                loader.locate().await;
            });
        }

        // Applications
        AppCommand::Apply { job_id, cv_id } => {
            task_manager.spawn_load_task(format!("apply_{}", job_id), async move {
                loader.apply(job_id, cv_id).await;
            });
        }
        AppCommand::LoadApplicants(job_id) => {
            task_manager.spawn_load_task("applicants", async move {
                loader.load_applicants(job_id).await;
            });
        }
        AppCommand::UpdateApplicationStatus { id, status } => {
            task_manager.spawn_load_task(format!("application_{}", id), async move {
                loader.update_application_status(id, status).await;
            });
        }
        AppCommand::AssignApplication { id, hr_username } => {
            task_manager.spawn_load_task(format!("application_{}", id), async move {
                loader.assign_application(id, hr_username).await;
            });
        }
        AppCommand::LoadApplicationHistory(id) => {
            task_manager.spawn_load_task("application_history", async move {
                loader.load_application_history(id).await;
            });
        }

        // Posted jobs
        AppCommand::CreateJob(draft) => {
            task_manager.spawn_load_task("post_job", async move {
                loader.create_job(draft).await;
            });
        }
        AppCommand::UpdateJob { id, draft } => {
            task_manager.spawn_load_task(format!("job_{}", id), async move {
                loader.update_job(id, draft).await;
            });
        }
        AppCommand::DeleteJob(id) => {
            task_manager.spawn_load_task(format!("job_{}", id), async move {
                loader.delete_job(id).await;
            });
        }
        AppCommand::UploadJobBanner { id, path } => {
            task_manager.spawn_load_task(format!("banner_{}", id), async move {
                loader.upload_job_banner(id, path).await;
            });
        }

        // Skills
        AppCommand::LoadSkills => {
            task_manager.spawn_load_task("skills", async move {
                loader.load_skills().await;
            });
        }
        AppCommand::CreateSkill { name, category } => {
            task_manager.spawn_load_task("save_skill", async move {
                loader.save_skill(None, name, category).await;
            });
        }
        AppCommand::UpdateSkill { id, name, category } => {
            task_manager.spawn_load_task(format!("skill_{}", id), async move {
                loader.save_skill(Some(id), name, category).await;
            });
        }
        AppCommand::DeleteSkill(id) => {
            task_manager.spawn_load_task(format!("skill_{}", id), async move {
                loader.delete_skill(id).await;
            });
        }

        // Reports
        AppCommand::LoadReports => {
            task_manager.spawn_load_task("reports", async move {
                loader.load_reports().await;
            });
        }
        AppCommand::CreateReport {
            title,
            description,
            attachments,
        } => {
            task_manager.spawn_load_task("send_report", async move {
                loader.create_report(title, description, attachments).await;
            });
        }
        AppCommand::UpdateReportStatus { id, status } => {
            task_manager.spawn_load_task(format!("report_{}", id), async move {
                loader.update_report_status(id, status).await;
            });
        }

        // Profile
        AppCommand::LoadProfile => {
            task_manager.spawn_load_task("profile", async move {
                loader.load_profile().await;
            });
        }
        AppCommand::UpdateProfile { full_name, phone } => {
            task_manager.spawn_load_task("update_profile", async move {
                loader.update_profile(full_name, phone).await;
            });
        }
        AppCommand::ChangePassword {
            current,
            new_password,
        } => {
            task_manager.spawn_load_task("password", async move {
                loader.change_password(current, new_password).await;
            });
        }
        AppCommand::UpdateSettings(settings) => {
            task_manager.spawn_load_task("settings", async move {
                loader.update_settings(settings).await;
            });
        }

        // CVs
        AppCommand::LoadCvs => {
            task_manager.spawn_load_task("cvs", async move {
                loader.load_cvs().await;
            });
        }
        AppCommand::UploadCv(path) => {
            task_manager.spawn_load_task("upload_cv", async move {
                loader.upload_cv(path).await;
            });
        }
        AppCommand::DownloadCv { id, dest } => {
            task_manager.spawn_load_task(format!("download_cv_{}", id), async move {
                loader.download_cv(id, dest).await;
            });
        }
        AppCommand::DeleteCv(id) => {
            task_manager.spawn_load_task(format!("delete_cv_{}", id), async move {
                loader.delete_cv(id).await;
            });
        }

        // Notifications
        AppCommand::LoadNotifications => {
            task_manager.spawn_load_task("notifications", async move {
                loader.load_notifications().await;
            });
        }
        AppCommand::MarkNotificationRead(id) => {
            task_manager.spawn_load_task(format!("notification_{}", id), async move {
                loader.mark_notification_read(id).await;
            });
        }
        AppCommand::MarkAllNotificationsRead => {
            task_manager.spawn_load_task("notifications_read", async move {
                loader.mark_all_notifications_read().await;
            });
        }

        AppCommand::LoadDashboard => {
            if let Some(identity) = state.identity.clone() {
                task_manager.spawn_load_task("dashboard", async move {
                    loader.load_dashboard(identity).await;
                });
            }
        }

        // Purely local
        AppCommand::OtpType(_)
        | AppCommand::OtpBackspace
        | AppCommand::OtpPaste(_)
        | AppCommand::SetInputMode(_)
        | AppCommand::SetCommandLine(_)
        | AppCommand::SetSignInField(_)
        | AppCommand::NextSignInField
        | AppCommand::SelectNext
        | AppCommand::SelectPrevious
        | AppCommand::ToggleLogs
        | AppCommand::ToggleHelp
        | AppCommand::Quit => {}
    }
}

/// Synchronous command execution for testing (no background tasks)
///
/// Applies the same state changes as [`execute_command`]; tests inject the
/// resulting `DataEvent`s themselves.
pub fn execute_command_sync(command: AppCommand, state: &mut AppState) {
    apply_local(&command, state);
}

/// State change a command makes before any I/O. Returns `false` when the
/// command was rejected or needs no background work.
fn apply_local(command: &AppCommand, state: &mut AppState) -> bool {
    match command {
        AppCommand::Navigate(route) => {
            state.navigate_to(*route);
            true
        }
        AppCommand::NavigateHome => {
            state.navigate_home();
            true
        }
        AppCommand::OpenJob(id) => {
            state.navigate_to(Route::JobDetail(*id));
            true
        }

        // Authentication
        AppCommand::SignIn { email, password } => {
            check(state, [
                validate_email(email).map(drop),
                validate_password(password.expose()),
            ])
        }
        AppCommand::Register {
            email,
            password,
            full_name,
            ..
        } => check(state, [
            validate_full_name(full_name).map(drop),
            validate_email(email).map(drop),
            validate_password(password.expose()),
        ]),
        AppCommand::OtpType(c) => {
            if let Some(flow) = state.otp.as_mut() {
                flow.input.type_char(*c);
            }
            false
        }
        AppCommand::OtpBackspace => {
            if let Some(flow) = state.otp.as_mut() {
                flow.input.backspace();
            }
            false
        }
        AppCommand::OtpPaste(text) => {
            if let Some(flow) = state.otp.as_mut() {
                flow.input.paste(text);
            }
            false
        }
        AppCommand::SubmitOtp => {
            let Some(flow) = state.otp.as_ref() else {
                state.push_toast(ToastLevel::Error, "No code was requested");
                return false;
            };
            let code = flow.input.code().unwrap_or_default();
            check(state, [validate_otp(&code)])
        }
        AppCommand::ResendOtp => {
            let Some(flow) = state.otp.as_ref() else {
                return false;
            };
            let remaining = flow.resend.remaining(Instant::now());
            if remaining.is_zero() {
                true
            } else {
                state.push_toast(
                    ToastLevel::Info,
                    format!("You can request a new code in {}s", remaining.as_secs().max(1)),
                );
                false
            }
        }
        AppCommand::StartOAuth(_) | AppCommand::CompleteOAuth { .. } => true,
        AppCommand::ForgotPassword { email } => check(state, [validate_email(email).map(drop)]),
        AppCommand::ResetPassword {
            token,
            new_password,
        } => {
            let token = if token.expose().trim().is_empty() {
                Err("Reset token is required".to_string())
            } else {
                Ok(())
            };
            check(state, [token, validate_password(new_password.expose())])
        }
        AppCommand::SignOut => state.identity.is_some(),

        // Job search
        AppCommand::SetKeyword(keyword) => {
            update_filter(state, |filter| filter.keyword = Some(keyword.clone()));
            true
        }
        AppCommand::SetLocation(location) => {
            update_filter(state, |filter| filter.location = Some(location.clone()));
            true
        }
        AppCommand::SetJobType(job_type) => {
            update_filter(state, |filter| filter.job_type = *job_type);
            true
        }
        AppCommand::ClearFilters => {
            state.location = LocationState::Unknown;
            update_filter(state, |filter| *filter = JobFilter::new());
            true
        }
        AppCommand::SetPage(page) => {
            state.jobs.filter.page = *page;
            true
        }
        AppCommand::UseMyLocation => {
            state.location = LocationState::Locating;
            true
        }

        // Everything below needs a signed-in user
        AppCommand::Apply { .. } => {
            if state.identity.is_none() {
                state.return_to = Some(state.route);
                state.route = Route::SignIn;
                state.push_toast(ToastLevel::Info, "Sign in to apply");
                false
            } else if !state.has_role(Role::Candidate) {
                state.push_toast(ToastLevel::Error, "Only candidates can apply to jobs");
                false
            } else {
                true
            }
        }
        AppCommand::LoadApplicants(_)
        | AppCommand::UpdateApplicationStatus { .. }
        | AppCommand::AssignApplication { .. }
        | AppCommand::LoadApplicationHistory(_) => require_role(state, HIRING_ROLES),
        AppCommand::CreateJob(draft) | AppCommand::UpdateJob { draft, .. } => {
            require_role(state, HIRING_ROLES) && check_draft(state, draft)
        }
        AppCommand::DeleteJob(_) | AppCommand::UploadJobBanner { .. } => {
            require_role(state, HIRING_ROLES)
        }

        // Skills are public to read, managed by admins
        AppCommand::LoadSkills => true,
        AppCommand::CreateSkill { name, category }
        | AppCommand::UpdateSkill { name, category, .. } => {
            require_role(state, &[Role::Admin])
                && check(state, [SkillInput::new(name.as_str(), category.clone())
                    .map(drop)
                    .map_err(|e| e.to_string())])
        }
        AppCommand::DeleteSkill(_) => require_role(state, &[Role::Admin]),

        // Anyone signed in can file a report; admins triage them
        AppCommand::CreateReport { title, .. } => {
            let title = if title.trim().is_empty() {
                Err("Report title is required".to_string())
            } else {
                Ok(())
            };
            require_sign_in(state) && check(state, [title])
        }
        AppCommand::LoadReports | AppCommand::UpdateReportStatus { .. } => {
            require_role(state, &[Role::Admin])
        }

        // Profile
        AppCommand::LoadProfile => {
            if !require_sign_in(state) {
                return false;
            }
            state.profile.loading = LoadingState::Loading;
            true
        }
        AppCommand::UpdateProfile { full_name, phone } => {
            let changed = if full_name.is_none() && phone.is_none() {
                Err("Nothing to update".to_string())
            } else {
                Ok(())
            };
            let name = match full_name {
                Some(name) => validate_full_name(name).map(drop),
                None => Ok(()),
            };
            require_sign_in(state) && check(state, [changed, name])
        }
        AppCommand::ChangePassword {
            current,
            new_password,
        } => {
            let differs = if current.expose() == new_password.expose() {
                Err("New password must differ from the current one".to_string())
            } else {
                Ok(())
            };
            require_sign_in(state)
                && check(state, [validate_password(new_password.expose()), differs])
        }
        AppCommand::UpdateSettings(_) => require_sign_in(state),

        AppCommand::LoadCvs
        | AppCommand::UploadCv(_)
        | AppCommand::DownloadCv { .. }
        | AppCommand::DeleteCv(_) => require_role(state, &[Role::Candidate, Role::Hr, Role::HrManager]),
        AppCommand::LoadNotifications
        | AppCommand::MarkNotificationRead(_)
        | AppCommand::MarkAllNotificationsRead => state.identity.is_some(),
        AppCommand::LoadDashboard => {
            if state.identity.is_none() {
                return false;
            }
            state.dashboard.loading = LoadingState::Loading;
            true
        }

        // Input
        AppCommand::SetInputMode(mode) => {
            if *mode == InputMode::Search && state.route != Route::Jobs {
                return false;
            }
            if *mode != InputMode::Command {
                state.command_line.clear();
            }
            state.input_mode = *mode;
            false
        }
        AppCommand::SetCommandLine(text) => {
            state.command_line = text.clone();
            false
        }
        AppCommand::SetSignInField(value) => {
            let form = &mut state.sign_in;
            match form.focus {
                SignInField::Email => form.email = value.expose().to_string(),
                SignInField::Password => form.password = value.clone(),
            }
            false
        }
        AppCommand::NextSignInField => {
            let form = &mut state.sign_in;
            form.focus = match form.focus {
                SignInField::Email => SignInField::Password,
                SignInField::Password => SignInField::Email,
            };
            false
        }
        AppCommand::SelectNext => {
            let last = state.list_len().saturating_sub(1);
            state.selected = (state.selected + 1).min(last);
            false
        }
        AppCommand::SelectPrevious => {
            state.selected = state.selected.saturating_sub(1);
            false
        }

        // System
        AppCommand::ToggleLogs => {
            state.logs_visible = !state.logs_visible;
            false
        }
        AppCommand::ToggleHelp => {
            state.help_visible = !state.help_visible;
            false
        }
        AppCommand::Quit => {
            state.should_quit = true;
            false
        }
    }
}

/// Toast the first failed check. Returns whether all passed.
fn check<const N: usize>(state: &mut AppState, results: [Result<(), String>; N]) -> bool {
    match results.into_iter().find_map(Result::err) {
        Some(reason) => {
            state.push_toast(ToastLevel::Error, reason);
            false
        }
        None => true,
    }
}

fn check_draft(state: &mut AppState, draft: &JobDraft) -> bool {
    check(state, [draft.validate().map_err(|e| e.to_string())])
}

fn require_sign_in(state: &mut AppState) -> bool {
    if state.identity.is_none() {
        state.redirect_to_sign_in(None);
        return false;
    }
    true
}

fn require_role(state: &mut AppState, roles: &[Role]) -> bool {
    match state.identity.as_ref() {
        None => {
            state.redirect_to_sign_in(None);
            false
        }
        Some(identity) if !identity.has_any_role(roles) => {
            state.route = Route::AccessDenied;
            false
        }
        Some(_) => true,
    }
}

/// Change the search filter, back to the first page. Bumps the generation so
/// results for older filters are ignored.
fn update_filter(state: &mut AppState, change: impl FnOnce(&mut JobFilter)) {
    change(&mut state.jobs.filter);
    state.jobs.filter.page = 0;
    state.jobs.generation += 1;
    state.jobs.loading = LoadingState::Loading;
}

fn search_now(
    state: &mut AppState,
    task_manager: &mut BackgroundTaskManager,
    data_loader: &DataLoader,
) {
    task_manager.cancel_pending_searches();
    state.jobs.generation += 1;
    state.jobs.loading = LoadingState::Loading;
    let generation = state.jobs.generation;
    let filter = state.jobs.filter.clone().normalized();
    let loader = data_loader.clone();
    task_manager.spawn_load_task("search_jobs", async move {
        loader.search_jobs(generation, filter).await;
    });
}

/// Fetch what the page just landed on needs.
fn load_route(
    state: &mut AppState,
    task_manager: &mut BackgroundTaskManager,
    data_loader: &DataLoader,
) {
    let loader = data_loader.clone();
    match state.route {
        Route::Jobs => {
            if state.jobs.results.is_none() {
                search_now(state, task_manager, data_loader);
            }
        }
        Route::JobDetail(id) => {
            state.job_detail = None;
            task_manager.spawn_load_task("job_detail", async move {
                loader.load_job(id).await;
            });
        }
        Route::CandidateDashboard
        | Route::HrDashboard
        | Route::HrManagerDashboard
        | Route::AdminDashboard => {
            if let Some(identity) = state.identity.clone() {
                state.dashboard.loading = LoadingState::Loading;
                task_manager.spawn_load_task("dashboard", async move {
                    loader.load_dashboard(identity).await;
                });
            }
        }
        Route::Profile => {
            state.profile.loading = LoadingState::Loading;
            task_manager.spawn_load_task("profile", async move {
                loader.load_profile().await;
            });
        }
        Route::SignIn | Route::VerifyOtp | Route::AccessDenied => {}
    }
}
