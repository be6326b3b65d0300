use portal_api::endpoints::{
    applications::ApplicationStatus,
    jobs::{JobDraft, JobFilter},
    profile::UserSettings,
    reports::ReportStatus,
    skills::SkillInput,
    ApplicationId, CvId, JobId, NotificationId, PageQuery, ReportId, SkillId,
};
use portal_api::{uploads, ApiError, ErrorKind, FilePart, Request, ServiceClients, ValidationError};
use portal_auth::{AuthContext, Identity, LoginOutcome, OAuthProvider, Registration, Role};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::geolocation::GeoLocator;
use crate::events::{DataEvent, Failure, Secret};

/// Runs backend calls and reports every outcome as a [`DataEvent`].
#[derive(Clone)]
pub struct DataLoader {
    pub ctx: AuthContext,
    pub clients: Arc<ServiceClients>,
    pub geo: Arc<GeoLocator>,
    pub data_tx: mpsc::UnboundedSender<DataEvent>,
}

impl DataLoader {
    pub fn new(
        ctx: AuthContext,
        clients: Arc<ServiceClients>,
        geo: Arc<GeoLocator>,
        data_tx: mpsc::UnboundedSender<DataEvent>,
    ) -> Self {
        Self {
            ctx,
            clients,
            geo,
            data_tx,
        }
    }

    fn send(&self, event: DataEvent) {
        // Receiver is gone only during shutdown
        let _ = self.data_tx.send(event);
    }

    fn report<T, E>(&self, context: &str, result: Result<T, E>, on_ok: impl FnOnce(T) -> DataEvent)
    where
        Failure: From<E>,
    {
        match result {
            Ok(value) => self.send(on_ok(value)),
            Err(e) => self.fail(context, Failure::from(e)),
        }
    }

    fn report_auth<T, E>(
        &self,
        context: &str,
        result: Result<T, E>,
        on_ok: impl FnOnce(T) -> DataEvent,
    ) where
        Failure: From<E>,
    {
        match result {
            Ok(value) => self.send(on_ok(value)),
            Err(e) => self.fail_auth(context, Failure::from(e)),
        }
    }

    fn fail(&self, context: &str, failure: Failure) {
        tracing::error!("Failed to {}: {}", context, failure.message);
        self.send(DataEvent::RequestFailed {
            context: context.to_string(),
            failure,
        });
    }

    fn fail_auth(&self, context: &str, failure: Failure) {
        tracing::warn!("Could not {}: {}", context, failure.message);
        self.send(DataEvent::AuthFailed {
            context: context.to_string(),
            failure,
        });
    }

    // Session

    /// Start-up hydration. The refresh outcome arrives separately through the
    /// coordinator's auth events.
    pub fn restore_session(&self) {
        let hydration = self.ctx.hydrator().hydrate();
        self.send(DataEvent::SessionRestored {
            identity: hydration.identity,
            refreshing: hydration.refresh.is_some(),
        });
    }

    pub async fn sign_in(&self, email: String, password: Secret) {
        tracing::info!("Signing in {}", email);
        match self.ctx.auth_client.login(&email, password.expose()).await {
            Ok(LoginOutcome::Authenticated(grant)) => {
                self.report_auth("sign in", self.ctx.sign_in(grant), |identity| {
                    DataEvent::SignedIn { identity }
                });
            }
            Ok(LoginOutcome::OtpRequired(challenge)) => {
                tracing::info!("Sign-in for {} needs a one-time code", challenge.email);
                self.send(DataEvent::OtpRequired {
                    email: challenge.email,
                    expires_in: challenge.expires_in,
                });
            }
            Err(e) => self.fail_auth("sign in", Failure::from(e)),
        }
    }

    pub async fn register(&self, registration: Registration) {
        tracing::info!("Registering {} as {}", registration.email, registration.role);
        let result = self.ctx.auth_client.register(&registration).await;
        self.report_auth("register", result, |challenge| DataEvent::OtpRequired {
            email: challenge.email,
            expires_in: challenge.expires_in,
        });
    }

    pub async fn verify_otp(&self, email: String, code: String) {
        let result = match self.ctx.auth_client.verify_otp(&email, &code).await {
            Ok(grant) => self.ctx.sign_in(grant),
            Err(e) => Err(e.into()),
        };
        self.report_auth("verify code", result, |identity| DataEvent::SignedIn {
            identity,
        });
    }

    pub async fn resend_otp(&self, email: String) {
        let result = self.ctx.auth_client.resend_otp(&email).await;
        self.report_auth("resend code", result, |challenge| DataEvent::OtpResent {
            expires_in: challenge.expires_in,
        });
    }

    pub async fn start_oauth(&self, provider: OAuthProvider) {
        match self.ctx.auth_client.oauth_authorization_url(provider).await {
            Ok(authorization) => {
                if let Err(e) = open::that(&authorization.authorization_url) {
                    tracing::warn!("Could not open browser: {}", e);
                }
                self.send(DataEvent::OAuthOpened {
                    provider,
                    authorization_url: authorization.authorization_url,
                });
            }
            Err(e) => self.fail_auth("start sign-in", Failure::from(e)),
        }
    }

    pub async fn complete_oauth(&self, provider: OAuthProvider, code: String, state: String) {
        let result = match self
            .ctx
            .auth_client
            .oauth_callback(provider, &code, &state)
            .await
        {
            Ok(grant) => self.ctx.sign_in(grant),
            Err(e) => Err(e.into()),
        };
        self.report_auth("complete sign-in", result, |identity| DataEvent::SignedIn {
            identity,
        });
    }

    pub async fn forgot_password(&self, email: String) {
        let result = self.ctx.auth_client.forgot_password(&email).await;
        self.report_auth("request password reset", result, |_| {
            DataEvent::PasswordResetRequested
        });
    }

    pub async fn reset_password(&self, token: Secret, new_password: Secret) {
        let result = self
            .ctx
            .auth_client
            .reset_password(token.expose(), new_password.expose())
            .await;
        self.report_auth("reset password", result, |_| DataEvent::PasswordReset);
    }

    pub async fn sign_out(&self) {
        self.ctx.sign_out().await;
        self.send(DataEvent::SignedOut);
    }

    // Jobs

    pub async fn search_jobs(&self, generation: u64, filter: JobFilter) {
        tracing::debug!("Searching jobs (generation {}): {:?}", generation, filter);
        let result = self.clients.jobs.send(Request::jobs().search(filter)).await;
        self.report("search jobs", result, |page| DataEvent::JobsLoaded {
            generation,
            page,
        });
    }

    pub async fn load_job(&self, id: JobId) {
        let result = self.clients.jobs.send(Request::jobs().get(id)).await;
        self.report("load job", result, |job| DataEvent::JobLoaded { job });
    }

    pub async fn load_hr_jobs(&self) {
        let result = self.clients.jobs.send(Request::jobs().mine()).await;
        self.report("load posted jobs", result, |page| DataEvent::HrJobsLoaded {
            page,
        });
    }

    pub async fn create_job(&self, draft: JobDraft) {
        tracing::info!("Posting job '{}'", draft.title);
        let result = match Request::jobs().create(draft) {
            Ok(req) => self.clients.jobs.send(req).await,
            Err(e) => Err(e.into()),
        };
        self.report("post job", result, |job| DataEvent::JobSaved {
            job,
            created: true,
        });
    }

    pub async fn update_job(&self, id: JobId, draft: JobDraft) {
        let result = match Request::jobs().update(id, draft) {
            Ok(req) => self.clients.jobs.send(req).await,
            Err(e) => Err(e.into()),
        };
        self.report("update job", result, |job| DataEvent::JobSaved {
            job,
            created: false,
        });
    }

    pub async fn delete_job(&self, id: JobId) {
        let result = self.clients.jobs.send(Request::jobs().delete(id)).await;
        self.report("delete job", result, |_| DataEvent::JobDeleted { id });
    }

    pub async fn upload_job_banner(&self, id: JobId, path: PathBuf) {
        let part = match read_upload(&path, None).await {
            Ok(part) => part,
            Err(failure) => return self.fail("upload banner", failure),
        };

        tracing::info!("Uploading banner {} for job {}", part.file_name, id);
        let result = match Request::jobs().upload_banner(id, part) {
            Ok(req) => self.clients.jobs.send(req).await,
            Err(e) => Err(e.into()),
        };
        self.report("upload banner", result, |job| DataEvent::JobSaved {
            job,
            created: false,
        });
    }

    pub async fn locate(&self) {
        let lookup = self.geo.locate().await;
        self.send(DataEvent::LocationResolved(lookup));
    }

    // Applications

    pub async fn apply(&self, job_id: JobId, cv_id: Option<CvId>) {
        let mut req = Request::applications().apply(job_id);
        if let Some(cv_id) = cv_id {
            req = req.cv_id(cv_id);
        }
        let result = self.clients.applications.send(req).await;
        self.report("apply", result, |application| {
            DataEvent::ApplicationSubmitted { application }
        });
    }

    pub async fn load_my_applications(&self) {
        let req = Request::applications().mine(PageQuery::default());
        let result = self.clients.applications.send(req).await;
        self.report("load applications", result, |page| {
            DataEvent::MyApplicationsLoaded { page }
        });
    }

    pub async fn load_applicants(&self, job_id: JobId) {
        let req = Request::applications().for_job(job_id);
        let result = self.clients.applications.send(req).await;
        self.report("load applicants", result, |page| DataEvent::ApplicantsLoaded {
            page,
        });
    }

    pub async fn update_application_status(&self, id: ApplicationId, status: ApplicationStatus) {
        let req = Request::applications().update_status(id, status);
        let result = self.clients.applications.send(req).await;
        self.report("update application", result, |application| {
            DataEvent::ApplicationUpdated { application }
        });
    }

    pub async fn assign_application(&self, id: ApplicationId, hr_username: String) {
        let req = Request::applications().assign(id, hr_username);
        let result = self.clients.applications.send(req).await;
        self.report("assign application", result, |application| {
            DataEvent::ApplicationUpdated { application }
        });
    }

    pub async fn load_application_history(&self, id: ApplicationId) {
        let req = Request::applications().audit_log(id);
        let result = self.clients.applications.send(req).await;
        self.report("load application history", result, |entries| {
            DataEvent::ApplicationHistoryLoaded { id, entries }
        });
    }

    pub async fn load_stats(&self) {
        let req = Request::applications().stats();
        let result = self.clients.applications.send(req).await;
        self.report("load statistics", result, |stats| DataEvent::StatsLoaded {
            stats,
        });
    }

    // Skills

    pub async fn load_skills(&self) {
        let result = self.clients.jobs.send(Request::skills().list()).await;
        self.report("load skills", result, |skills| DataEvent::SkillsLoaded {
            skills,
        });
    }

    pub async fn save_skill(&self, id: Option<SkillId>, name: String, category: Option<String>) {
        let input = match SkillInput::new(name, category) {
            Ok(input) => input,
            Err(e) => return self.fail("save skill", Failure::from(ApiError::from(e))),
        };
        let result = match id {
            Some(id) => self.clients.jobs.send(Request::skills().update(id, input)).await,
            None => self.clients.jobs.send(Request::skills().create(input)).await,
        };
        self.report("save skill", result, |skill| DataEvent::SkillSaved { skill });
    }

    pub async fn delete_skill(&self, id: SkillId) {
        let result = self.clients.jobs.send(Request::skills().delete(id)).await;
        self.report("delete skill", result, |_| DataEvent::SkillDeleted { id });
    }

    // Reports

    pub async fn load_reports(&self) {
        let req = Request::reports().list(PageQuery::default());
        let result = self.clients.applications.send(req).await;
        self.report("load reports", result, |page| DataEvent::ReportsLoaded {
            page,
        });
    }

    /// File a report. Every attachment must be an image.
    pub async fn create_report(&self, title: String, description: String, attachments: Vec<PathBuf>) {
        let mut req = match Request::reports().create(title, description) {
            Ok(req) => req,
            Err(e) => return self.fail("send report", Failure::from(ApiError::from(e))),
        };
        for path in &attachments {
            let attached = match read_upload(path, None).await {
                Ok(part) => req.attach(part).map_err(|e| Failure::from(ApiError::from(e))),
                Err(failure) => Err(failure),
            };
            req = match attached {
                Ok(req) => req,
                Err(failure) => return self.fail("send report", failure),
            };
        }

        tracing::info!("Sending report with {} attachments", attachments.len());
        let result = self.clients.applications.send(req).await;
        self.report("send report", result, |report| DataEvent::ReportCreated {
            report,
        });
    }

    pub async fn update_report_status(&self, id: ReportId, status: ReportStatus) {
        let req = Request::reports().update_status(id, status);
        let result = self.clients.applications.send(req).await;
        self.report("update report", result, |report| DataEvent::ReportUpdated {
            report,
        });
    }

    // Profile

    pub async fn load_profile(&self) {
        let auth = &self.clients.auth;
        let (profile, settings) = tokio::join!(
            auth.send(Request::profile().get()),
            auth.send(Request::profile().settings()),
        );
        let result = profile.and_then(|profile| settings.map(|settings| (profile, settings)));
        self.report("load profile", result, |(profile, settings)| {
            DataEvent::ProfileLoaded { profile, settings }
        });
    }

    pub async fn update_profile(&self, full_name: Option<String>, phone: Option<String>) {
        let mut req = Request::profile().update();
        if let Some(full_name) = full_name {
            req = req.full_name(full_name);
        }
        if let Some(phone) = phone {
            req = req.phone(phone);
        }
        let result = self.clients.auth.send(req).await;
        self.report("update profile", result, |profile| DataEvent::ProfileUpdated {
            profile,
        });
    }

    pub async fn change_password(&self, current: Secret, new_password: Secret) {
        let result = match Request::profile().change_password(current.expose(), new_password.expose()) {
            Ok(req) => self.clients.auth.send(req).await,
            Err(e) => Err(e.into()),
        };
        self.report("change password", result, |_| DataEvent::PasswordChanged);
    }

    pub async fn update_settings(&self, settings: UserSettings) {
        let req = Request::profile().update_settings(settings);
        let result = self.clients.auth.send(req).await;
        self.report("update settings", result, |settings| {
            DataEvent::SettingsUpdated { settings }
        });
    }

    // CVs

    pub async fn load_cvs(&self) {
        let result = self.clients.applications.send(Request::cvs().list()).await;
        self.report("load CVs", result, |cvs| DataEvent::CvsLoaded { cvs });
    }

    pub async fn upload_cv(&self, path: PathBuf) {
        let part = match read_upload(&path, Some(uploads::CV_MAX_BYTES)).await {
            Ok(part) => part,
            Err(failure) => return self.fail("upload CV", failure),
        };

        tracing::info!("Uploading CV {} ({} bytes)", part.file_name, part.size());
        let result = match Request::cvs().upload(part) {
            Ok(req) => self.clients.applications.send(req).await,
            Err(e) => Err(e.into()),
        };
        self.report("upload CV", result, |cv| DataEvent::CvUploaded { cv });
    }

    pub async fn download_cv(&self, id: CvId, dest: PathBuf) {
        let bytes = match self
            .clients
            .applications
            .download(Request::cvs().download(id))
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => return self.fail("download CV", Failure::from(e)),
        };

        if let Err(e) = tokio::fs::write(&dest, &bytes).await {
            let message = format!("cannot write {}: {}", dest.display(), e);
            return self.fail("download CV", Failure::new(ErrorKind::Business, message));
        }
        tracing::info!("Saved CV {} to {}", id, dest.display());
        self.send(DataEvent::CvDownloaded { path: dest });
    }

    pub async fn delete_cv(&self, id: CvId) {
        let result = self.clients.applications.send(Request::cvs().delete(id)).await;
        self.report("delete CV", result, |_| DataEvent::CvDeleted { id });
    }

    // Notifications

    pub async fn load_notifications(&self) {
        let notifications = &self.clients.notifications;
        let (list, unread) = tokio::join!(
            notifications.send(Request::notifications().list()),
            notifications.send(Request::notifications().unread_count()),
        );
        let result = list.and_then(|page| unread.map(|count| (page, count)));
        self.report("load notifications", result, |(page, count)| {
            DataEvent::NotificationsLoaded {
                items: page.content,
                unread: count.0,
            }
        });
    }

    pub async fn mark_notification_read(&self, id: NotificationId) {
        let req = Request::notifications().mark_read(id);
        let result = self.clients.notifications.send(req).await;
        self.report("mark notification read", result, |_| {
            DataEvent::NotificationMarkedRead { id }
        });
    }

    pub async fn mark_all_notifications_read(&self) {
        let req = Request::notifications().mark_all_read();
        let result = self.clients.notifications.send(req).await;
        self.report("mark notifications read", result, |_| {
            DataEvent::NotificationsMarkedRead
        });
    }

    // Admin

    pub async fn load_system_stats(&self) {
        let result = self.clients.auth.send(Request::admin().stats()).await;
        self.report("load system statistics", result, |stats| {
            DataEvent::SystemStatsLoaded { stats }
        });
    }

    pub async fn load_audit_log(&self) {
        let result = self.clients.auth.send(Request::admin().audit_logs()).await;
        self.report("load audit log", result, |page| DataEvent::AuditLogLoaded {
            page,
        });
    }

    /// Everything the signed-in user's dashboard shows, fetched concurrently.
    pub async fn load_dashboard(&self, identity: Identity) {
        tracing::info!("Loading dashboard for {}", identity.username);

        let candidate = async {
            if identity.has_role(Role::Candidate) {
                tokio::join!(self.load_my_applications(), self.load_cvs());
            }
        };
        let hr = async {
            if identity.has_any_role(&[Role::Hr, Role::HrManager]) {
                tokio::join!(self.load_hr_jobs(), self.load_stats(), self.load_skills());
            }
        };
        let admin = async {
            if identity.has_role(Role::Admin) {
                tokio::join!(
                    self.load_system_stats(),
                    self.load_audit_log(),
                    self.load_skills(),
                    self.load_reports(),
                );
            }
        };

        tokio::join!(candidate, hr, admin, self.load_notifications());
    }
}

/// Read a file for a multipart upload.
///
/// The size is checked against `limit` from metadata, before the contents are
/// read into memory.
async fn read_upload(path: &Path, limit: Option<usize>) -> Result<FilePart, Failure> {
    let unreadable = |e: std::io::Error| {
        Failure::new(
            ErrorKind::Validation,
            format!("cannot read {}: {}", path.display(), e),
        )
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let size = tokio::fs::metadata(path).await.map_err(unreadable)?.len();
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    if let Some(limit) = limit.filter(|limit| size > *limit) {
        return Err(Failure::from(ApiError::from(ValidationError::FileTooLarge {
            file_name,
            size,
            limit,
        })));
    }

    let bytes = tokio::fs::read(path).await.map_err(unreadable)?;
    let mime = uploads::mime_for(&file_name);
    Ok(FilePart::new("file", file_name, mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiSettings;
    use portal_auth::Settings;

    /// Loader pointed at a closed local port, with session files in `dir`.
    fn loader(dir: &tempfile::TempDir) -> (DataLoader, mpsc::UnboundedReceiver<DataEvent>) {
        let settings = Settings {
            api_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            storage_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let ctx = AuthContext::bootstrap(settings).unwrap();
        let clients = Arc::new(ServiceClients::new(&ctx).unwrap());
        let geo = Arc::new(GeoLocator::new(&UiSettings::default()).unwrap());
        let (tx, rx) = mpsc::unbounded_channel();
        (DataLoader::new(ctx, clients, geo, tx), rx)
    }

    #[tokio::test]
    async fn test_unreadable_cv_is_a_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut rx) = loader(&dir);

        loader.upload_cv(dir.path().join("missing.pdf")).await;

        match rx.recv().await.unwrap() {
            DataEvent::RequestFailed { context, failure } => {
                assert_eq!(context, "upload CV");
                assert_eq!(failure.kind, ErrorKind::Validation);
                assert!(failure.message.contains("missing.pdf"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_oversized_cv_is_rejected_from_its_size() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut rx) = loader(&dir);

        let path = dir.path().join("huge.pdf");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(uploads::CV_MAX_BYTES as u64 + 1).unwrap();

        loader.upload_cv(path).await;

        match rx.recv().await.unwrap() {
            DataEvent::RequestFailed { context, failure } => {
                assert_eq!(context, "upload CV");
                assert_eq!(failure.kind, ErrorKind::Validation);
                assert!(failure.message.contains("over the 10485760 byte limit"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_report_rejects_non_image_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut rx) = loader(&dir);

        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        loader
            .create_report("Broken page".into(), "Apply button fails".into(), vec![path])
            .await;

        match rx.recv().await.unwrap() {
            DataEvent::RequestFailed { context, failure } => {
                assert_eq!(context, "send report");
                assert_eq!(failure.kind, ErrorKind::Validation);
                assert!(failure.message.contains("notes.pdf"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_banner_must_be_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut rx) = loader(&dir);

        let path = dir.path().join("banner.txt");
        std::fs::write(&path, b"not an image").unwrap();

        loader.upload_job_banner(JobId(3), path).await;

        match rx.recv().await.unwrap() {
            DataEvent::RequestFailed { context, failure } => {
                assert_eq!(context, "upload banner");
                assert_eq!(failure.kind, ErrorKind::Validation);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_skill_name_never_reaches_backend() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut rx) = loader(&dir);

        loader.save_skill(None, "   ".into(), None).await;

        match rx.recv().await.unwrap() {
            DataEvent::RequestFailed { context, failure } => {
                assert_eq!(context, "save skill");
                assert_eq!(failure.kind, ErrorKind::Validation);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_sign_in_as_auth_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut rx) = loader(&dir);

        loader
            .sign_in("ana@example.com".into(), Secret::new("hunter22"))
            .await;

        match rx.recv().await.unwrap() {
            DataEvent::AuthFailed { context, failure } => {
                assert_eq!(context, "sign in");
                assert_eq!(failure.kind, ErrorKind::Network);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(loader.ctx.tokens.get().is_none());
    }

    #[tokio::test]
    async fn test_locate_without_service_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, mut rx) = loader(&dir);

        loader.locate().await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            DataEvent::LocationResolved(crate::background::geolocation::LocationLookup::Unavailable)
        ));
    }
}
