use super::{PageQuery, ReportId};
use crate::error::ValidationError;
use crate::request::{ApiRequest, Page, RequestData};
use crate::transport::{FilePart, MultipartForm};
use crate::uploads::validate_image;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ReportStatus,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Open,
    InProgress,
    Resolved,
    Rejected,
}

impl std::str::FromStr for ReportStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::field("status", format!("unknown report status '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListReports {
    query: PageQuery,
}

impl ListReports {
    pub fn new(query: PageQuery) -> Self {
        Self { query }
    }
}

impl ApiRequest for ListReports {
    type Data = PageQuery;
    type Response = Page<Report>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/reports".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

/// New report with optional screenshots. Sent as multipart.
#[derive(Debug, Clone)]
pub struct CreateReport {
    title: String,
    description: String,
    attachments: Vec<FilePart>,
}

impl CreateReport {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::field("title", "must not be empty"));
        }
        Ok(Self {
            title,
            description: description.into(),
            attachments: Vec::new(),
        })
    }

    pub fn attach(mut self, file: FilePart) -> Result<Self, ValidationError> {
        validate_image(&file)?;
        self.attachments.push(file);
        Ok(self)
    }
}

impl ApiRequest for CreateReport {
    type Data = ();
    type Response = Report;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/reports".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        let form = self.attachments.iter().cloned().fold(
            MultipartForm::new()
                .text("title", self.title.clone())
                .text("description", self.description.clone()),
            |form, mut file| {
                file.field = "attachments".to_string();
                form.file(file)
            },
        );
        RequestData::Multipart(form)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChange<S> {
    pub status: S,
}

#[derive(Debug, Clone)]
pub struct UpdateReportStatus {
    id: ReportId,
    change: StatusChange<ReportStatus>,
}

impl UpdateReportStatus {
    pub fn new(id: ReportId, status: ReportStatus) -> Self {
        Self {
            id,
            change: StatusChange { status },
        }
    }
}

impl ApiRequest for UpdateReportStatus {
    type Data = StatusChange<ReportStatus>;
    type Response = Report;
    const METHOD: Method = Method::PATCH;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/reports/{}/status", self.id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachments_must_be_images() {
        let report = CreateReport::new("Broken link", "The apply button 404s").unwrap();
        let pdf = FilePart::new("file", "log.pdf", "application/pdf", vec![1u8; 8]);
        assert!(report.clone().attach(pdf).is_err());

        let png = FilePart::new("file", "shot.png", "image/png", vec![1u8; 8]);
        let report = report.attach(png).unwrap();
        let RequestData::Multipart(form) = report.data() else {
            panic!("expected multipart");
        };
        assert_eq!(form.text.len(), 2);
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].field, "attachments");
    }

    #[test]
    fn status_parsing() {
        assert_eq!("in progress".parse::<ReportStatus>().unwrap(), ReportStatus::InProgress);
        assert!("done".parse::<ReportStatus>().is_err());
        assert_eq!(
            serde_json::to_value(StatusChange { status: ReportStatus::Resolved }).unwrap(),
            serde_json::json!({"status": "RESOLVED"})
        );
    }
}
