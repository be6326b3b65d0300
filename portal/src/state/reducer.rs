use super::{
    AppState, DashboardState, LoadingState, LocationState, NotificationState, ProfileState, Route,
    SignInForm, ToastLevel,
};
use crate::background::geolocation::LocationLookup;
use crate::events::{AppCommand, DataEvent, Failure, Secret};
use portal_api::endpoints::applications::Application;
use portal_api::{ErrorKind, Page};
use std::time::Instant;

const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// State transition function for data events.
///
/// Returns a follow-up command when the event should lead to more work (e.g.
/// navigating to the landing page after sign-in), which the caller runs
/// through its command handler.
pub fn reduce_data_event(state: &mut AppState, event: DataEvent) -> Option<AppCommand> {
    match event {
        // Session
        DataEvent::SessionRestored {
            identity,
            refreshing,
        } => {
            state.identity = identity;
            state.session_checked = !refreshing;
            None
        }

        DataEvent::SessionRefreshed { identity } => {
            let first = state.identity.is_none();
            state.identity = Some(identity);
            state.session_checked = true;
            // A restored session goes straight to the page the user wanted
            match state.return_to {
                Some(target) if first && state.route == Route::SignIn => {
                    state.return_to = None;
                    Some(AppCommand::Navigate(target))
                }
                _ => None,
            }
        }

        DataEvent::SessionExpired => {
            state.session_checked = true;
            if state.identity.is_some() {
                end_session(state);
                state.redirect_to_sign_in(Some(SESSION_EXPIRED));
            } else if state.route.is_protected() {
                state.redirect_to_sign_in(None);
            }
            None
        }

        DataEvent::SignedIn { identity } => {
            tracing::info!("Signed in as {}", identity.username);
            state.push_toast(
                ToastLevel::Info,
                format!("Welcome, {}", identity.username),
            );
            let target = state
                .return_to
                .take()
                .unwrap_or_else(|| Route::home_for(&identity));
            state.identity = Some(identity);
            state.session_checked = true;
            state.otp = None;
            state.sign_in = SignInForm::default();
            Some(AppCommand::Navigate(target))
        }

        DataEvent::OtpRequired { email, expires_in } => {
            let countdown = state.otp_policy.countdown(expires_in, Instant::now());
            state.push_toast(ToastLevel::Info, format!("We sent a code to {}", email));
            state.start_otp(email, countdown);
            None
        }

        DataEvent::OtpResent { expires_in } => {
            let countdown = state.otp_policy.countdown(expires_in, Instant::now());
            if let Some(flow) = state.otp.as_mut() {
                flow.resend = countdown;
                flow.input.clear();
                let message = format!("A new code is on its way to {}", flow.email);
                state.push_toast(ToastLevel::Info, message);
            }
            None
        }

        DataEvent::PasswordResetRequested => {
            state.push_toast(
                ToastLevel::Info,
                "If the address is registered, a reset link is on its way",
            );
            None
        }

        DataEvent::PasswordReset => {
            state.push_toast(ToastLevel::Info, "Password changed. Sign in with the new one");
            state.route = Route::SignIn;
            None
        }

        DataEvent::OAuthOpened {
            provider,
            authorization_url,
        } => {
            state.push_toast(
                ToastLevel::Info,
                format!(
                    "Continue with {} in your browser ({}), then run: oauth {} <code> <state>",
                    provider.as_str(),
                    authorization_url,
                    provider.as_str()
                ),
            );
            None
        }

        DataEvent::SignedOut => {
            end_session(state);
            state.return_to = None;
            state.route = Route::Jobs;
            state.push_toast(ToastLevel::Info, "Signed out");
            None
        }

        // Jobs
        DataEvent::JobsLoaded { generation, page } => {
            if generation != state.jobs.generation {
                tracing::debug!(
                    "Dropping job results for generation {} (current {})",
                    generation,
                    state.jobs.generation
                );
                return None;
            }
            state.jobs.results = Some(page);
            state.jobs.loading = LoadingState::Loaded;
            state.selected = 0;
            None
        }

        DataEvent::JobLoaded { job } => {
            if state.route == Route::JobDetail(job.id) {
                state.job_detail = Some(job);
            }
            None
        }

        DataEvent::HrJobsLoaded { page } => {
            state.dashboard.hr_jobs = Some(page);
            state.dashboard.loading = LoadingState::Loaded;
            None
        }

        DataEvent::JobSaved { job, created } => {
            let message = if created {
                format!("Posted '{}'", job.title)
            } else {
                format!("Saved '{}'", job.title)
            };
            state.push_toast(ToastLevel::Info, message);
            if let Some(page) = state.dashboard.hr_jobs.as_mut() {
                match page.content.iter_mut().find(|j| j.id == job.id) {
                    Some(existing) => *existing = job,
                    None => {
                        page.content.insert(0, job);
                        page.total_elements += 1;
                    }
                }
            }
            None
        }

        DataEvent::JobDeleted { id } => {
            if let Some(page) = state.dashboard.hr_jobs.as_mut() {
                let before = page.content.len();
                page.content.retain(|job| job.id != id);
                if page.content.len() < before {
                    page.total_elements = page.total_elements.saturating_sub(1);
                }
            }
            state.push_toast(ToastLevel::Info, format!("Deleted job #{}", id));
            None
        }

        DataEvent::LocationResolved(LocationLookup::Found(location)) => {
            let Some(label) = location.label().map(str::to_string) else {
                state.location = LocationState::Unavailable;
                return None;
            };
            state.location = LocationState::Found(label.clone());
            Some(AppCommand::SetLocation(label))
        }

        DataEvent::LocationResolved(LocationLookup::Unavailable) => {
            state.location = LocationState::Unavailable;
            state.push_toast(
                ToastLevel::Info,
                "Location unavailable, enter a city instead",
            );
            None
        }

        // Applications
        DataEvent::ApplicationSubmitted { application } => {
            state.push_toast(ToastLevel::Info, "Application sent");
            if let Some(page) = state.dashboard.applications.as_mut() {
                page.content.insert(0, application);
                page.total_elements += 1;
            }
            None
        }

        DataEvent::MyApplicationsLoaded { page } => {
            state.dashboard.applications = Some(page);
            state.dashboard.loading = LoadingState::Loaded;
            None
        }

        DataEvent::ApplicantsLoaded { page } => {
            state.dashboard.applicants = Some(page);
            state.dashboard.loading = LoadingState::Loaded;
            None
        }

        DataEvent::ApplicationUpdated { application } => {
            state.push_toast(
                ToastLevel::Info,
                format!("Application #{} is now {}", application.id, application.status),
            );
            replace_application(state.dashboard.applicants.as_mut(), &application);
            replace_application(state.dashboard.applications.as_mut(), &application);
            None
        }

        DataEvent::ApplicationHistoryLoaded { id, entries } => {
            state.dashboard.history = Some((id, entries));
            None
        }

        DataEvent::StatsLoaded { stats } => {
            state.dashboard.stats = Some(stats);
            state.dashboard.loading = LoadingState::Loaded;
            None
        }

        // Skills
        DataEvent::SkillsLoaded { skills } => {
            state.dashboard.skills = skills;
            None
        }

        DataEvent::SkillSaved { skill } => {
            state.push_toast(ToastLevel::Info, format!("Saved skill {}", skill.name));
            match state.dashboard.skills.iter_mut().find(|s| s.id == skill.id) {
                Some(existing) => *existing = skill,
                None => state.dashboard.skills.push(skill),
            }
            None
        }

        DataEvent::SkillDeleted { id } => {
            state.dashboard.skills.retain(|skill| skill.id != id);
            None
        }

        // Reports
        DataEvent::ReportsLoaded { page } => {
            state.dashboard.reports = Some(page);
            None
        }

        DataEvent::ReportCreated { report } => {
            state.push_toast(
                ToastLevel::Info,
                format!("Report #{} sent, thank you", report.id),
            );
            if let Some(page) = state.dashboard.reports.as_mut() {
                page.content.insert(0, report);
                page.total_elements += 1;
            }
            None
        }

        DataEvent::ReportUpdated { report } => {
            if let Some(existing) = state
                .dashboard
                .reports
                .iter_mut()
                .flat_map(|page| page.content.iter_mut())
                .find(|r| r.id == report.id)
            {
                *existing = report;
            }
            None
        }

        // Profile
        DataEvent::ProfileLoaded { profile, settings } => {
            state.profile = ProfileState {
                profile: Some(profile),
                settings: Some(settings),
                loading: LoadingState::Loaded,
            };
            None
        }

        DataEvent::ProfileUpdated { profile } => {
            state.push_toast(ToastLevel::Info, "Profile saved");
            state.profile.profile = Some(profile);
            None
        }

        DataEvent::PasswordChanged => {
            state.push_toast(ToastLevel::Info, "Password changed");
            None
        }

        DataEvent::SettingsUpdated { settings } => {
            state.push_toast(ToastLevel::Info, "Settings saved");
            state.profile.settings = Some(settings);
            None
        }

        // CVs
        DataEvent::CvsLoaded { cvs } => {
            state.dashboard.cvs = cvs;
            None
        }

        DataEvent::CvUploaded { cv } => {
            state.push_toast(ToastLevel::Info, format!("Uploaded {}", cv.file_name));
            state.dashboard.cvs.push(cv);
            None
        }

        DataEvent::CvDownloaded { path } => {
            state.push_toast(ToastLevel::Info, format!("Saved to {}", path.display()));
            None
        }

        DataEvent::CvDeleted { id } => {
            state.dashboard.cvs.retain(|cv| cv.id != id);
            None
        }

        // Notifications
        DataEvent::NotificationsLoaded { items, unread } => {
            state.notifications = NotificationState { items, unread };
            None
        }

        DataEvent::NotificationMarkedRead { id } => {
            if let Some(item) = state
                .notifications
                .items
                .iter_mut()
                .find(|n| n.id == id && !n.read)
            {
                item.read = true;
                state.notifications.unread = state.notifications.unread.saturating_sub(1);
            }
            None
        }

        DataEvent::NotificationsMarkedRead => {
            state
                .notifications
                .items
                .iter_mut()
                .for_each(|n| n.read = true);
            state.notifications.unread = 0;
            None
        }

        // Admin
        DataEvent::SystemStatsLoaded { stats } => {
            state.dashboard.system_stats = Some(stats);
            state.dashboard.loading = LoadingState::Loaded;
            None
        }

        DataEvent::AuditLogLoaded { page } => {
            state.dashboard.audit_log = Some(page);
            None
        }

        DataEvent::RequestFailed { context, failure } => {
            reduce_failure(state, &context, failure);
            None
        }

        DataEvent::AuthFailed { context, failure } => {
            tracing::debug!("{} rejected: {:?}", context, failure.kind);
            if let Some(flow) = state.otp.as_mut() {
                flow.input.clear();
            }
            state.sign_in.password = Secret::default();
            state.push_toast(ToastLevel::Error, failure.message);
            None
        }
    }
}

/// Route a failed request by its error kind.
fn reduce_failure(state: &mut AppState, context: &str, failure: Failure) {
    match failure.kind {
        ErrorKind::Unauthorized => {
            tracing::warn!("{} was rejected as unauthorized", context);
            if state.identity.is_some() {
                end_session(state);
            }
            state.redirect_to_sign_in(Some(SESSION_EXPIRED));
        }
        ErrorKind::Forbidden => {
            tracing::warn!("{} was forbidden: {}", context, failure.message);
            state.route = Route::AccessDenied;
        }
        ErrorKind::Validation | ErrorKind::Network | ErrorKind::Business => {
            let message = format!("Could not {}: {}", context, failure.message);
            match state.route {
                Route::Jobs if state.jobs.loading == LoadingState::Loading => {
                    state.jobs.loading = LoadingState::Error(failure.message);
                }
                Route::Profile if state.profile.loading == LoadingState::Loading => {
                    state.profile.loading = LoadingState::Error(failure.message);
                }
                route if route.is_protected() && state.dashboard.loading == LoadingState::Loading => {
                    state.dashboard.loading = LoadingState::Error(failure.message);
                }
                _ => {}
            }
            state.push_toast(ToastLevel::Error, message);
        }
    }
}

/// Drop everything that belonged to the signed-in user.
fn end_session(state: &mut AppState) {
    state.identity = None;
    state.otp = None;
    state.dashboard = DashboardState::default();
    state.profile = ProfileState::default();
    state.notifications = NotificationState::default();
}

fn replace_application(page: Option<&mut Page<Application>>, updated: &Application) {
    if let Some(existing) = page
        .into_iter()
        .flat_map(|page| page.content.iter_mut())
        .find(|a| a.id == updated.id)
    {
        *existing = updated.clone();
    }
}
