use super::{AuditEntry, PageQuery};
use crate::macros::setter;
use crate::request::{ApiRequest, Page, RequestData};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemStats {
    pub total_users: u64,
    pub total_candidates: u64,
    pub total_companies: u64,
    pub total_jobs: u64,
    pub open_jobs: u64,
    pub total_applications: u64,
}

#[derive(Debug, Clone, Default)]
pub struct GetSystemStats;

impl ApiRequest for GetSystemStats {
    type Data = ();
    type Response = SystemStats;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/admin/stats".into()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditLogQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAuditLogs {
    query: AuditLogQuery,
}

impl ListAuditLogs {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(query.page: PageQuery);
    setter!(opt query.actor: String);
    setter!(opt query.action: String);
}

impl ApiRequest for ListAuditLogs {
    type Data = AuditLogQuery;
    type Response = Page<AuditEntry>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/admin/audit-logs".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}
