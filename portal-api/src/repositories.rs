//! Request builders grouped by resource. Each repository notes which backend
//! service serves it; send the built request through the matching
//! [`ServiceClients`](crate::ServiceClients) field.

use crate::endpoints::{
    ApplicationId, CvId, JobId, NotificationId, PageQuery, ReportId, SkillId,
    admin::{GetSystemStats, ListAuditLogs},
    applications::{
        ApplicationAuditLog, ApplicationStatus, Apply, AssignApplication, GetApplication,
        GetApplicationStats, ListJobApplications, ListMyApplications, UpdateApplicationStatus,
    },
    cvs::{DeleteCv, DownloadCv, ListCvs, UploadCv},
    jobs::{
        CreateJob, DeleteJob, GetPublicJob, JobDraft, JobFilter, ListHrJobs, ListPublicJobs,
        UpdateJob, UploadJobBanner,
    },
    notifications::{GetUnreadCount, ListNotifications, MarkAllRead, MarkRead},
    profile::{ChangePassword, GetProfile, GetSettings, UpdateProfile, UpdateSettings, UserSettings},
    reports::{CreateReport, ListReports, ReportStatus, UpdateReportStatus},
    skills::{CreateSkill, DeleteSkill, ListSkills, SkillInput, UpdateSkill},
};
use crate::error::ValidationError;
use crate::transport::FilePart;

/// Jobs service.
pub struct JobRepository;

impl JobRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn search(&self, filter: JobFilter) -> ListPublicJobs {
        ListPublicJobs::new(filter)
    }

    pub fn get(&self, id: JobId) -> GetPublicJob {
        GetPublicJob::new(id)
    }

    pub fn mine(&self) -> ListHrJobs {
        ListHrJobs::new()
    }

    pub fn create(&self, draft: JobDraft) -> Result<CreateJob, ValidationError> {
        CreateJob::new(draft)
    }

    pub fn update(&self, id: JobId, draft: JobDraft) -> Result<UpdateJob, ValidationError> {
        UpdateJob::new(id, draft)
    }

    pub fn delete(&self, id: JobId) -> DeleteJob {
        DeleteJob::new(id)
    }

    pub fn upload_banner(&self, id: JobId, banner: FilePart) -> Result<UploadJobBanner, ValidationError> {
        UploadJobBanner::new(id, banner)
    }
}

/// Jobs service.
pub struct SkillRepository;

impl SkillRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListSkills {
        ListSkills
    }

    pub fn create(&self, input: SkillInput) -> CreateSkill {
        CreateSkill::new(input)
    }

    pub fn update(&self, id: SkillId, input: SkillInput) -> UpdateSkill {
        UpdateSkill::new(id, input)
    }

    pub fn delete(&self, id: SkillId) -> DeleteSkill {
        DeleteSkill::new(id)
    }
}

/// Applications service.
pub struct ApplicationRepository;

impl ApplicationRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn apply(&self, job_id: JobId) -> Apply {
        Apply::new(job_id)
    }

    pub fn mine(&self, query: PageQuery) -> ListMyApplications {
        ListMyApplications::new(query)
    }

    pub fn for_job(&self, job_id: JobId) -> ListJobApplications {
        ListJobApplications::new(job_id)
    }

    pub fn get(&self, id: ApplicationId) -> GetApplication {
        GetApplication::new(id)
    }

    pub fn update_status(&self, id: ApplicationId, status: ApplicationStatus) -> UpdateApplicationStatus {
        UpdateApplicationStatus::new(id, status)
    }

    pub fn assign(&self, id: ApplicationId, hr_username: impl Into<String>) -> AssignApplication {
        AssignApplication::new(id, hr_username)
    }

    pub fn audit_log(&self, id: ApplicationId) -> ApplicationAuditLog {
        ApplicationAuditLog::new(id)
    }

    pub fn stats(&self) -> GetApplicationStats {
        GetApplicationStats
    }
}

/// Applications service.
pub struct CvRepository;

impl CvRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn upload(&self, file: FilePart) -> Result<UploadCv, ValidationError> {
        UploadCv::new(file)
    }

    pub fn list(&self) -> ListCvs {
        ListCvs
    }

    pub fn download(&self, id: CvId) -> DownloadCv {
        DownloadCv::new(id)
    }

    pub fn delete(&self, id: CvId) -> DeleteCv {
        DeleteCv::new(id)
    }
}

/// Applications service.
pub struct ReportRepository;

impl ReportRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self, query: PageQuery) -> ListReports {
        ListReports::new(query)
    }

    pub fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<CreateReport, ValidationError> {
        CreateReport::new(title, description)
    }

    pub fn update_status(&self, id: ReportId, status: ReportStatus) -> UpdateReportStatus {
        UpdateReportStatus::new(id, status)
    }
}

/// Auth service (user accounts live there).
pub struct ProfileRepository;

impl ProfileRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn get(&self) -> GetProfile {
        GetProfile
    }

    pub fn update(&self) -> UpdateProfile {
        UpdateProfile::new()
    }

    pub fn change_password(
        &self,
        current: impl Into<String>,
        new: impl Into<String>,
    ) -> Result<ChangePassword, ValidationError> {
        ChangePassword::new(current, new)
    }

    pub fn settings(&self) -> GetSettings {
        GetSettings
    }

    pub fn update_settings(&self, settings: UserSettings) -> UpdateSettings {
        UpdateSettings::new(settings)
    }
}

/// Notifications service.
pub struct NotificationRepository;

impl NotificationRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListNotifications {
        ListNotifications::new()
    }

    pub fn unread_count(&self) -> GetUnreadCount {
        GetUnreadCount
    }

    pub fn mark_read(&self, id: NotificationId) -> MarkRead {
        MarkRead::new(id)
    }

    pub fn mark_all_read(&self) -> MarkAllRead {
        MarkAllRead
    }
}

/// Auth service.
pub struct AdminRepository;

impl AdminRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn stats(&self) -> GetSystemStats {
        GetSystemStats
    }

    pub fn audit_logs(&self) -> ListAuditLogs {
        ListAuditLogs::new()
    }
}
