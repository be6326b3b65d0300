use portal_api::endpoints::{
    admin::SystemStats,
    applications::{Application, ApplicationStats, ApplicationStatus},
    cvs::Cv,
    jobs::{Job, JobDraft, JobType},
    notifications::Notification,
    profile::{Profile, UserSettings},
    reports::{Report, ReportStatus},
    skills::Skill,
    ApplicationId, AuditEntry, CvId, JobId, NotificationId, ReportId, SkillId,
};
use portal_api::{ApiError, ErrorKind, Page};
use portal_auth::{AuthClientError, AuthError, Identity, OAuthProvider, Role};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

use crate::background::geolocation::LocationLookup;
use crate::state::{InputMode, Route};

/// Password or reset token typed by the user. Prints as `[REDACTED]` so
/// commands can be logged.
#[derive(Debug)]
pub struct Secret(SecretString);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self::new("")
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

/// Commands to execute (user actions → state changes and background tasks)
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // Navigation
    Navigate(Route),
    NavigateHome,

    // Authentication
    SignIn {
        email: String,
        password: Secret,
    },
    Register {
        email: String,
        password: Secret,
        role: Role,
        full_name: String,
    },
    OtpType(char),
    OtpBackspace,
    OtpPaste(String),
    SubmitOtp,
    ResendOtp,
    StartOAuth(OAuthProvider),
    CompleteOAuth {
        provider: OAuthProvider,
        code: String,
        state: String,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: Secret,
        new_password: Secret,
    },
    SignOut,

    // Job search
    SetKeyword(String),
    SetLocation(String),
    SetJobType(Option<JobType>),
    SetPage(u32),
    ClearFilters,
    UseMyLocation,
    OpenJob(JobId),

    // Applications
    Apply {
        job_id: JobId,
        cv_id: Option<CvId>,
    },
    LoadApplicants(JobId),
    UpdateApplicationStatus {
        id: ApplicationId,
        status: ApplicationStatus,
    },
    AssignApplication {
        id: ApplicationId,
        hr_username: String,
    },
    LoadApplicationHistory(ApplicationId),

    // Posted jobs
    CreateJob(JobDraft),
    UpdateJob {
        id: JobId,
        draft: JobDraft,
    },
    DeleteJob(JobId),
    UploadJobBanner {
        id: JobId,
        path: PathBuf,
    },

    // Skills
    LoadSkills,
    CreateSkill {
        name: String,
        category: Option<String>,
    },
    UpdateSkill {
        id: SkillId,
        name: String,
        category: Option<String>,
    },
    DeleteSkill(SkillId),

    // Reports
    LoadReports,
    CreateReport {
        title: String,
        description: String,
        attachments: Vec<PathBuf>,
    },
    UpdateReportStatus {
        id: ReportId,
        status: ReportStatus,
    },

    // Profile
    LoadProfile,
    UpdateProfile {
        full_name: Option<String>,
        phone: Option<String>,
    },
    ChangePassword {
        current: Secret,
        new_password: Secret,
    },
    UpdateSettings(UserSettings),

    // CVs
    LoadCvs,
    UploadCv(PathBuf),
    DownloadCv {
        id: CvId,
        dest: PathBuf,
    },
    DeleteCv(CvId),

    // Notifications
    LoadNotifications,
    MarkNotificationRead(NotificationId),
    MarkAllNotificationsRead,

    // Dashboards
    LoadDashboard,

    // Input
    SetInputMode(InputMode),
    SetCommandLine(String),
    /// Replace the focused sign-in field.
    SetSignInField(Secret),
    NextSignInField,
    SelectNext,
    SelectPrevious,

    // System
    ToggleLogs,
    ToggleHelp,
    Quit,
}

/// Failure reported by a background task, reduced to what the UI reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ApiError> for Failure {
    fn from(error: &ApiError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Self::from(&error)
    }
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<AuthClientError> for Failure {
    fn from(error: AuthClientError) -> Self {
        Self::from(ApiError::from(error))
    }
}

impl From<AuthError> for Failure {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::AuthClient(e) => Self::from(e),
            other => Self {
                kind: ErrorKind::Business,
                message: other.to_string(),
            },
        }
    }
}

/// Events from background tasks (responses to commands)
#[derive(Debug, Clone)]
pub enum DataEvent {
    // Session
    SessionRestored {
        identity: Option<Identity>,
        /// A refresh was started and will report back through the auth events.
        refreshing: bool,
    },
    SessionRefreshed {
        identity: Identity,
    },
    SessionExpired,
    SignedIn {
        identity: Identity,
    },
    OtpRequired {
        email: String,
        expires_in: Option<u64>,
    },
    OtpResent {
        expires_in: Option<u64>,
    },
    PasswordResetRequested,
    PasswordReset,
    OAuthOpened {
        provider: OAuthProvider,
        authorization_url: String,
    },
    SignedOut,

    // Jobs
    JobsLoaded {
        generation: u64,
        page: Page<Job>,
    },
    JobLoaded {
        job: Job,
    },
    HrJobsLoaded {
        page: Page<Job>,
    },
    /// A posted job was created, edited or got a new banner.
    JobSaved {
        job: Job,
        created: bool,
    },
    JobDeleted {
        id: JobId,
    },
    LocationResolved(LocationLookup),

    // Applications
    ApplicationSubmitted {
        application: Application,
    },
    MyApplicationsLoaded {
        page: Page<Application>,
    },
    ApplicantsLoaded {
        page: Page<Application>,
    },
    ApplicationUpdated {
        application: Application,
    },
    ApplicationHistoryLoaded {
        id: ApplicationId,
        entries: Vec<AuditEntry>,
    },
    StatsLoaded {
        stats: ApplicationStats,
    },

    // Skills
    SkillsLoaded {
        skills: Vec<Skill>,
    },
    SkillSaved {
        skill: Skill,
    },
    SkillDeleted {
        id: SkillId,
    },

    // Reports
    ReportsLoaded {
        page: Page<Report>,
    },
    ReportCreated {
        report: Report,
    },
    ReportUpdated {
        report: Report,
    },

    // Profile
    ProfileLoaded {
        profile: Profile,
        settings: UserSettings,
    },
    ProfileUpdated {
        profile: Profile,
    },
    PasswordChanged,
    SettingsUpdated {
        settings: UserSettings,
    },

    // CVs
    CvsLoaded {
        cvs: Vec<Cv>,
    },
    CvUploaded {
        cv: Cv,
    },
    CvDownloaded {
        path: PathBuf,
    },
    CvDeleted {
        id: CvId,
    },

    // Notifications
    NotificationsLoaded {
        items: Vec<Notification>,
        unread: u64,
    },
    NotificationMarkedRead {
        id: NotificationId,
    },
    NotificationsMarkedRead,

    // Admin
    SystemStatsLoaded {
        stats: SystemStats,
    },
    AuditLogLoaded {
        page: Page<AuditEntry>,
    },

    // Errors
    RequestFailed {
        context: String,
        failure: Failure,
    },
    /// Sign-in, registration, OTP or password-reset call rejected. A 401 here
    /// is a bad credential, not a lost session.
    AuthFailed {
        context: String,
        failure: Failure,
    },
}
