use super::CvId;
use crate::error::ValidationError;
use crate::request::{ApiRequest, EmptyResponse, RequestData};
use crate::transport::{FilePart, MultipartForm};
use crate::uploads::validate_cv;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv {
    pub id: CvId,
    pub file_name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UploadCv {
    file: FilePart,
}

impl UploadCv {
    /// Checks type and size before anything is sent.
    pub fn new(file: FilePart) -> Result<Self, ValidationError> {
        validate_cv(&file)?;
        Ok(Self { file })
    }
}

impl ApiRequest for UploadCv {
    type Data = ();
    type Response = Cv;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/cvs".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        let mut file = self.file.clone();
        file.field = "file".to_string();
        RequestData::Multipart(MultipartForm::new().file(file))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListCvs;

impl ApiRequest for ListCvs {
    type Data = ();
    type Response = Vec<Cv>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/cvs".into()
    }
}

/// Raw file contents; send with `Client::download`.
#[derive(Debug, Clone)]
pub struct DownloadCv {
    id: CvId,
}

impl DownloadCv {
    pub fn new(id: CvId) -> Self {
        Self { id }
    }
}

impl ApiRequest for DownloadCv {
    type Data = ();
    type Response = EmptyResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/cvs/{}/download", self.id).into()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteCv {
    id: CvId,
}

impl DeleteCv {
    pub fn new(id: CvId) -> Self {
        Self { id }
    }
}

impl ApiRequest for DeleteCv {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/cvs/{}", self.id).into()
    }
}
