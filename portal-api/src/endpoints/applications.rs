use super::reports::StatusChange;
use super::{ApplicationId, AuditEntry, CvId, JobId, PageQuery};
use crate::error::ValidationError;
use crate::macros::setter;
use crate::request::{ApiRequest, Page, RequestData};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub candidate_name: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cv_id: Option<CvId>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub assigned_hr: Option<String>,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Interview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// No further transitions are expected.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Withdrawn)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Reviewing => "Reviewing",
            Self::Interview => "Interview",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Withdrawn => "Withdrawn",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewing" => Ok(Self::Reviewing),
            "interview" => Ok(Self::Interview),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(ValidationError::field(
                "status",
                format!("unknown application status '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationStats {
    pub total: u64,
    pub pending: u64,
    pub reviewing: u64,
    pub interview: u64,
    pub accepted: u64,
    pub rejected: u64,
}

// Requests

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Apply {
    job_id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    cv_id: Option<CvId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_letter: Option<String>,
}

impl Apply {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            cv_id: None,
            cover_letter: None,
        }
    }

    setter!(opt cv_id: CvId);
    setter!(opt cover_letter: String);
}

impl ApiRequest for Apply {
    type Data = Self;
    type Response = Application;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/applications".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

/// The signed-in candidate's applications.
#[derive(Debug, Clone, Default)]
pub struct ListMyApplications {
    query: PageQuery,
}

impl ListMyApplications {
    pub fn new(query: PageQuery) -> Self {
        Self { query }
    }
}

impl ApiRequest for ListMyApplications {
    type Data = PageQuery;
    type Response = Page<Application>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/applications/me".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

#[derive(Debug, Clone)]
pub struct ListJobApplications {
    job_id: JobId,
    query: PageQuery,
}

impl ListJobApplications {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            query: PageQuery::default(),
        }
    }

    setter!(query: PageQuery);
}

impl ApiRequest for ListJobApplications {
    type Data = PageQuery;
    type Response = Page<Application>;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/applications/job/{}", self.job_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

#[derive(Debug, Clone)]
pub struct GetApplication {
    id: ApplicationId,
}

impl GetApplication {
    pub fn new(id: ApplicationId) -> Self {
        Self { id }
    }
}

impl ApiRequest for GetApplication {
    type Data = ();
    type Response = Application;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/applications/{}", self.id).into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusChange {
    #[serde(flatten)]
    change: StatusChange<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateApplicationStatus {
    id: ApplicationId,
    body: ApplicationStatusChange,
}

impl UpdateApplicationStatus {
    pub fn new(id: ApplicationId, status: ApplicationStatus) -> Self {
        Self {
            id,
            body: ApplicationStatusChange {
                change: StatusChange { status },
                note: None,
            },
        }
    }

    setter!(opt body.note: String);
}

impl ApiRequest for UpdateApplicationStatus {
    type Data = ApplicationStatusChange;
    type Response = Application;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/applications/{}/status", self.id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.body)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    hr_username: String,
}

/// Hand an application to a specific HR user (HR manager only).
#[derive(Debug, Clone)]
pub struct AssignApplication {
    id: ApplicationId,
    assignee: Assignee,
}

impl AssignApplication {
    pub fn new(id: ApplicationId, hr_username: impl Into<String>) -> Self {
        Self {
            id,
            assignee: Assignee {
                hr_username: hr_username.into(),
            },
        }
    }
}

impl ApiRequest for AssignApplication {
    type Data = Assignee;
    type Response = Application;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/applications/{}/assign", self.id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.assignee)
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationAuditLog {
    id: ApplicationId,
}

impl ApplicationAuditLog {
    pub fn new(id: ApplicationId) -> Self {
        Self { id }
    }
}

impl ApiRequest for ApplicationAuditLog {
    type Data = ();
    type Response = Vec<AuditEntry>;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/applications/{}/audit", self.id).into()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetApplicationStats;

impl ApiRequest for GetApplicationStats {
    type Data = ();
    type Response = ApplicationStats;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/applications/stats".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn apply_body_omits_unset_fields() {
        let body = serde_json::to_value(Apply::new(JobId(9)).cover_letter("Hi")).unwrap();
        assert_eq!(body, json!({"jobId": 9, "coverLetter": "Hi"}));
    }

    #[test]
    fn status_change_with_note() {
        let request = UpdateApplicationStatus::new(ApplicationId(1), ApplicationStatus::Interview)
            .note("Tuesday 10:00");
        assert_eq!(request.endpoint(), "/api/applications/1/status");
        assert_eq!(
            serde_json::to_value(&request.body).unwrap(),
            json!({"status": "INTERVIEW", "note": "Tuesday 10:00"})
        );
    }

    #[test]
    fn stats_default_missing_counters() {
        let stats: ApplicationStats =
            serde_json::from_value(json!({"total": 5, "pending": 2})).unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.accepted, 0);
    }

    #[test]
    fn final_statuses() {
        assert!(ApplicationStatus::Rejected.is_final());
        assert!(!"reviewing".parse::<ApplicationStatus>().unwrap().is_final());
    }
}
