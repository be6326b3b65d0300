pub mod otp;
pub mod reducer;
pub mod validators;

use portal_api::endpoints::{
    admin::SystemStats,
    applications::{Application, ApplicationStats},
    cvs::Cv,
    jobs::{Job, JobFilter},
    notifications::Notification,
    profile::{Profile, UserSettings},
    reports::Report,
    skills::Skill,
    ApplicationId, AuditEntry,
};
use portal_api::Page;
use portal_auth::{Identity, Role};
use std::collections::VecDeque;
use throbber_widgets_tui::ThrobberState;

use crate::events::Secret;

use otp::{OtpInput, OtpPolicy, ResendCountdown};

const MAX_TOASTS: usize = 5;

/// Where the user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    VerifyOtp,
    Jobs,
    JobDetail(portal_api::endpoints::JobId),
    CandidateDashboard,
    HrDashboard,
    HrManagerDashboard,
    AdminDashboard,
    Profile,
    AccessDenied,
}

impl Route {
    /// Roles allowed on the route. `None` means public; an empty slice means
    /// any signed-in user.
    pub fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::SignIn | Route::VerifyOtp | Route::Jobs | Route::JobDetail(_) => None,
            Route::Profile | Route::AccessDenied => Some(&[]),
            Route::CandidateDashboard => Some(&[Role::Candidate]),
            Route::HrDashboard => Some(&[Role::Hr, Role::HrManager]),
            Route::HrManagerDashboard => Some(&[Role::HrManager]),
            Route::AdminDashboard => Some(&[Role::Admin]),
        }
    }

    pub fn is_protected(&self) -> bool {
        self.required_roles().is_some()
    }

    /// Landing page for a freshly signed-in identity.
    pub fn home_for(identity: &Identity) -> Route {
        if identity.has_role(Role::Admin) {
            Route::AdminDashboard
        } else if identity.has_role(Role::HrManager) {
            Route::HrManagerDashboard
        } else if identity.has_role(Role::Hr) {
            Route::HrDashboard
        } else if identity.has_role(Role::Candidate) {
            Route::CandidateDashboard
        } else {
            Route::Jobs
        }
    }

    pub fn title(&self) -> String {
        match self {
            Route::SignIn => "Sign in".to_string(),
            Route::VerifyOtp => "Verify code".to_string(),
            Route::Jobs => "Jobs".to_string(),
            Route::JobDetail(id) => format!("Job #{}", id),
            Route::CandidateDashboard => "My dashboard".to_string(),
            Route::HrDashboard => "HR dashboard".to_string(),
            Route::HrManagerDashboard => "HR manager dashboard".to_string(),
            Route::AdminDashboard => "Admin dashboard".to_string(),
            Route::Profile => "My profile".to_string(),
            Route::AccessDenied => "Access denied".to_string(),
        }
    }
}

/// Result of running the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Allow,
    SignInRequired,
    Denied,
}

pub fn guard(route: Route, identity: Option<&Identity>) -> Guard {
    match (route.required_roles(), identity) {
        (None, _) => Guard::Allow,
        (Some(_), None) => Guard::SignInRequired,
        (Some([]), Some(_)) => Guard::Allow,
        (Some(roles), Some(identity)) if identity.has_any_role(roles) => Guard::Allow,
        (Some(_), Some(_)) => Guard::Denied,
    }
}

/// Represents loading state separate from data state
#[derive(Default, Debug, Clone, PartialEq)]
pub enum LoadingState {
    #[default]
    NotStarted,
    Loading,
    Loaded,
    Error(String),
}

/// Where typed characters go.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// The `:` prompt at the bottom of the screen.
    Command,
    /// Live keyword search on the jobs list.
    Search,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: Secret,
    pub focus: SignInField,
}

impl SignInForm {
    pub fn focused_text(&self) -> &str {
        match self.focus {
            SignInField::Email => &self.email,
            SignInField::Password => self.password.expose(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct JobSearchState {
    pub filter: JobFilter,
    /// Bumped on every filter change; only results for the latest value are
    /// shown.
    pub generation: u64,
    pub results: Option<Page<Job>>,
    pub loading: LoadingState,
}

impl JobSearchState {
    pub fn new() -> Self {
        Self {
            filter: JobFilter::new(),
            ..Self::default()
        }
    }
}

/// The pending OTP verification: who it is for and the resend gate.
#[derive(Debug, Clone)]
pub struct OtpFlow {
    pub email: String,
    pub input: OtpInput,
    pub resend: ResendCountdown,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub applications: Option<Page<Application>>,
    pub applicants: Option<Page<Application>>,
    pub history: Option<(ApplicationId, Vec<AuditEntry>)>,
    pub cvs: Vec<Cv>,
    pub hr_jobs: Option<Page<Job>>,
    pub stats: Option<ApplicationStats>,
    pub system_stats: Option<SystemStats>,
    pub audit_log: Option<Page<AuditEntry>>,
    pub skills: Vec<Skill>,
    pub reports: Option<Page<Report>>,
    pub loading: LoadingState,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub settings: Option<UserSettings>,
    pub loading: LoadingState,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    pub items: Vec<Notification>,
    pub unread: u64,
}

/// Location resolved for "jobs near me".
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LocationState {
    #[default]
    Unknown,
    Locating,
    Found(String),
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub route: Route,
    /// Protected route to resume after signing in.
    pub return_to: Option<Route>,
    pub identity: Option<Identity>,
    /// Hydration finished (the background refresh resolved).
    pub session_checked: bool,
    pub otp: Option<OtpFlow>,
    pub jobs: JobSearchState,
    pub job_detail: Option<Job>,
    pub dashboard: DashboardState,
    pub profile: ProfileState,
    pub notifications: NotificationState,
    pub location: LocationState,
    pub toasts: VecDeque<Toast>,
    pub otp_policy: OtpPolicy,
    pub input_mode: InputMode,
    pub command_line: String,
    pub sign_in: SignInForm,
    /// Highlighted row of the current page's main list.
    pub selected: usize,
    pub help_visible: bool,
    pub logs_visible: bool,
    pub spinner: ThrobberState,
    pub should_quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            route: Route::Jobs,
            return_to: None,
            identity: None,
            session_checked: false,
            otp: None,
            jobs: JobSearchState::new(),
            job_detail: None,
            dashboard: DashboardState::default(),
            profile: ProfileState::default(),
            notifications: NotificationState::default(),
            location: LocationState::Unknown,
            toasts: VecDeque::new(),
            otp_policy: OtpPolicy::default(),
            input_mode: InputMode::Normal,
            command_line: String::new(),
            sign_in: SignInForm::default(),
            selected: 0,
            help_visible: false,
            logs_visible: false,
            spinner: ThrobberState::default(),
            should_quit: false,
        }
    }

    /// Move to `route` through the guard. Returns where the user actually
    /// landed.
    pub fn navigate_to(&mut self, route: Route) -> Route {
        let landed = match guard(route, self.identity.as_ref()) {
            Guard::Allow => route,
            Guard::SignInRequired => {
                self.return_to = Some(route);
                Route::SignIn
            }
            Guard::Denied => Route::AccessDenied,
        };
        if landed != route {
            tracing::debug!("Guard redirected {:?} to {:?}", route, landed);
        }
        if landed != self.route {
            self.selected = 0;
        }
        self.route = landed;
        landed
    }

    pub fn navigate_home(&mut self) -> Route {
        let home = self
            .identity
            .as_ref()
            .map(Route::home_for)
            .unwrap_or(Route::Jobs);
        self.navigate_to(home)
    }

    /// Send the user to sign in after the session was lost. Does nothing when
    /// they are already there, so a burst of failures redirects once.
    pub fn redirect_to_sign_in(&mut self, notice: Option<&str>) {
        if self.route == Route::SignIn {
            return;
        }
        if self.route.is_protected() {
            self.return_to = Some(self.route);
        }
        self.route = Route::SignIn;
        if let Some(notice) = notice {
            self.push_toast(ToastLevel::Info, notice);
        }
    }

    pub fn push_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            level,
            message: message.into(),
        });
    }

    pub fn start_otp(&mut self, email: String, resend: ResendCountdown) {
        self.otp = Some(OtpFlow {
            email,
            input: OtpInput::new(),
            resend,
        });
        self.route = Route::VerifyOtp;
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.identity.as_ref().is_some_and(|i| i.has_role(role))
    }

    /// Rows in the list the selection moves through on this page.
    pub fn list_len(&self) -> usize {
        match self.route {
            Route::Jobs => self.jobs.results.as_ref().map_or(0, |p| p.content.len()),
            Route::CandidateDashboard => self
                .dashboard
                .applications
                .as_ref()
                .map_or(0, |p| p.content.len()),
            Route::HrDashboard | Route::HrManagerDashboard => self
                .dashboard
                .hr_jobs
                .as_ref()
                .map_or(0, |p| p.content.len()),
            Route::AdminDashboard => self
                .dashboard
                .reports
                .as_ref()
                .map_or(0, |p| p.content.len()),
            _ => 0,
        }
    }

    /// The highlighted job on the jobs list or the HR job list.
    pub fn selected_job(&self) -> Option<&portal_api::endpoints::jobs::Job> {
        let page = match self.route {
            Route::Jobs => self.jobs.results.as_ref(),
            Route::HrDashboard | Route::HrManagerDashboard => self.dashboard.hr_jobs.as_ref(),
            _ => None,
        };
        page.and_then(|page| page.content.get(self.selected))
    }

    pub fn is_loading(&self) -> bool {
        [&self.jobs.loading, &self.dashboard.loading, &self.profile.loading]
            .iter()
            .any(|loading| **loading == LoadingState::Loading)
    }
}
