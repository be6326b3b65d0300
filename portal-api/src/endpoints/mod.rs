pub mod admin;
pub mod applications;
pub mod cvs;
pub mod jobs;
pub mod notifications;
pub mod profile;
pub mod reports;
pub mod skills;

use crate::macros::numeric_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

numeric_id!(JobId);
numeric_id!(ApplicationId);
numeric_id!(SkillId);
numeric_id!(ReportId);
numeric_id!(NotificationId);

/// Stored CV files are keyed by UUID rather than a sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CvId(pub Uuid);

impl Display for CvId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CvId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for CvId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Paging parameters shared by the listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }
}

/// One line of an audit trail (application history or system-wide log).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub action: String,
    #[serde(default, alias = "performedBy")]
    pub actor: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(alias = "createdAt")]
    pub timestamp: DateTime<Utc>,
}
