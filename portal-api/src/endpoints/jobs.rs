use super::{JobId, PageQuery, SkillId};
use crate::error::ValidationError;
use crate::macros::setter;
use crate::request::{ApiRequest, EmptyResponse, Page, RequestData};
use crate::transport::{FilePart, MultipartForm};
use crate::uploads::validate_image;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn salary_range(&self) -> Option<String> {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some(format!("{:.0} - {:.0}", min, max)),
            (Some(min), None) => Some(format!("from {:.0}", min)),
            (None, Some(max)) => Some(format!("up to {:.0}", max)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Remote,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullTime => write!(f, "Full time"),
            Self::PartTime => write!(f, "Part time"),
            Self::Contract => write!(f, "Contract"),
            Self::Internship => write!(f, "Internship"),
            Self::Remote => write!(f, "Remote"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "full_time" => Ok(Self::FullTime),
            "part_time" => Ok(Self::PartTime),
            "contract" => Ok(Self::Contract),
            "internship" => Ok(Self::Internship),
            "remote" => Ok(Self::Remote),
            _ => Err(ValidationError::field("jobType", format!("unknown job type '{}'", s))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Open,
    Closed,
}

// Requests

/// Filters for the public job search. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    pub page: u32,
    pub size: u32,
}

impl JobFilter {
    pub fn new() -> Self {
        Self {
            size: 20,
            ..Self::default()
        }
    }

    setter!(opt keyword: String);
    setter!(opt location: String);
    setter!(opt job_type: JobType);
    setter!(page: u32);
    setter!(size: u32);

    /// Blank text filters count as unset.
    pub fn normalized(mut self) -> Self {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.keyword) {
            self.keyword = None;
        }
        if blank(&self.location) {
            self.location = None;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct ListPublicJobs {
    filter: JobFilter,
}

impl ListPublicJobs {
    pub fn new(filter: JobFilter) -> Self {
        Self {
            filter: filter.normalized(),
        }
    }
}

impl ApiRequest for ListPublicJobs {
    type Data = JobFilter;
    type Response = Page<Job>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/jobs/public".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.filter)
    }
}

#[derive(Debug, Clone)]
pub struct GetPublicJob {
    id: JobId,
}

impl GetPublicJob {
    pub fn new(id: JobId) -> Self {
        Self { id }
    }
}

impl ApiRequest for GetPublicJob {
    type Data = ();
    type Response = Job;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/jobs/public/{}", self.id).into()
    }
}

/// Jobs owned by the signed-in HR user's company.
#[derive(Debug, Clone, Default)]
pub struct ListHrJobs {
    query: PageQuery,
}

impl ListHrJobs {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(query: PageQuery);
}

impl ApiRequest for ListHrJobs {
    type Data = PageQuery;
    type Response = Page<Job>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/jobs".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skill_ids: Vec<SkillId>,
}

impl JobDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: None,
            job_type: None,
            salary_min: None,
            salary_max: None,
            skill_ids: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::field("title", "must not be empty"));
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(ValidationError::field("salaryMin", "must not exceed salaryMax"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CreateJob {
    job: JobDraft,
}

impl CreateJob {
    pub fn new(job: JobDraft) -> Result<Self, ValidationError> {
        job.validate()?;
        Ok(Self { job })
    }
}

impl ApiRequest for CreateJob {
    type Data = JobDraft;
    type Response = Job;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/jobs".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.job)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateJob {
    id: JobId,
    job: JobDraft,
}

impl UpdateJob {
    pub fn new(id: JobId, job: JobDraft) -> Result<Self, ValidationError> {
        job.validate()?;
        Ok(Self { id, job })
    }

    setter!(opt job.location: String);
    setter!(opt job.job_type: JobType);
    setter!(opt job.salary_min: f64);
    setter!(opt job.salary_max: f64);
    setter!(job.skill_ids: Vec<SkillId>);
}

impl ApiRequest for UpdateJob {
    type Data = JobDraft;
    type Response = Job;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/jobs/{}", self.id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.job)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteJob {
    id: JobId,
}

impl DeleteJob {
    pub fn new(id: JobId) -> Self {
        Self { id }
    }
}

impl ApiRequest for DeleteJob {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/jobs/{}", self.id).into()
    }
}

#[derive(Debug, Clone)]
pub struct UploadJobBanner {
    id: JobId,
    banner: FilePart,
}

impl UploadJobBanner {
    /// Rejects anything that is not an accepted image before a request is
    /// built.
    pub fn new(id: JobId, banner: FilePart) -> Result<Self, ValidationError> {
        validate_image(&banner)?;
        Ok(Self { id, banner })
    }
}

impl ApiRequest for UploadJobBanner {
    type Data = ();
    type Response = Job;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/jobs/{}/banner", self.id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        let mut banner = self.banner.clone();
        banner.field = "file".to_string();
        RequestData::Multipart(MultipartForm::new().file(banner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::query_pairs;
    use serde_json::json;

    #[test]
    fn filter_query_leaves_out_unset_fields() {
        let request = ListPublicJobs::new(
            JobFilter::new()
                .keyword("rust")
                .location("   ")
                .job_type(JobType::FullTime),
        );
        let RequestData::Query(filter) = request.data() else {
            panic!("expected query data");
        };

        let pairs = query_pairs(filter).unwrap();
        assert!(pairs.contains(&("keyword".into(), "rust".into())));
        assert!(pairs.contains(&("jobType".into(), "FULL_TIME".into())));
        assert!(pairs.contains(&("size".into(), "20".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "location"));
    }

    #[test]
    fn job_parses_backend_shape() {
        let job: Job = serde_json::from_value(json!({
            "id": 3,
            "title": "Backend Engineer",
            "companyName": "Acme",
            "jobType": "PART_TIME",
            "salaryMin": 1000.0,
            "skills": ["Rust", "SQL"]
        }))
        .unwrap();

        assert_eq!(job.id, JobId(3));
        assert_eq!(job.job_type, Some(JobType::PartTime));
        assert_eq!(job.salary_range().as_deref(), Some("from 1000"));
    }

    #[test]
    fn job_type_from_user_input() {
        assert_eq!("full-time".parse::<JobType>().unwrap(), JobType::FullTime);
        assert_eq!("Part Time".parse::<JobType>().unwrap(), JobType::PartTime);
        assert!("gig".parse::<JobType>().is_err());
    }

    #[test]
    fn drafts_are_validated() {
        assert!(CreateJob::new(JobDraft::new("  ", "desc")).is_err());

        let mut draft = JobDraft::new("Dev", "desc");
        draft.salary_min = Some(5.0);
        draft.salary_max = Some(1.0);
        assert!(CreateJob::new(draft).is_err());

        let update = UpdateJob::new(JobId(1), JobDraft::new("Dev", "desc"))
            .unwrap()
            .location("Remote")
            .skill_ids(vec![SkillId(2)]);
        assert_eq!(update.endpoint(), "/api/jobs/1");
        assert_eq!(
            serde_json::to_value(&update.job).unwrap(),
            json!({"title": "Dev", "description": "desc", "location": "Remote", "skillIds": [2]})
        );
    }

    #[test]
    fn banner_must_be_an_image() {
        let pdf = FilePart::new("banner", "brochure.pdf", "application/pdf", vec![1u8; 4]);
        assert!(UploadJobBanner::new(JobId(1), pdf).is_err());

        let png = FilePart::new("banner", "banner.png", "image/png", vec![1u8; 4]);
        let request = UploadJobBanner::new(JobId(1), png).unwrap();
        let RequestData::Multipart(form) = request.data() else {
            panic!("expected multipart");
        };
        assert_eq!(form.files[0].field, "file");
    }
}
