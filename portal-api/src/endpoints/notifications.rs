use super::NotificationId;
use crate::macros::setter;
use crate::request::{ApiRequest, EmptyResponse, Page, RequestData};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unread_only: bool,
}

#[derive(Debug, Clone)]
pub struct ListNotifications {
    query: NotificationQuery,
}

impl Default for ListNotifications {
    fn default() -> Self {
        Self::new()
    }
}

impl ListNotifications {
    pub fn new() -> Self {
        Self {
            query: NotificationQuery {
                page: 0,
                size: 20,
                unread_only: false,
            },
        }
    }

    setter!(query.page: u32);
    setter!(query.size: u32);
    setter!(query.unread_only: bool);
}

impl ApiRequest for ListNotifications {
    type Data = NotificationQuery;
    type Response = Page<Notification>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/notifications".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.query)
    }
}

/// Unread badge count. The backend answers either a bare number or
/// `{ "count": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnreadCount(pub u64);

impl<'de> Deserialize<'de> for UnreadCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bare(u64),
            Wrapped { count: u64 },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bare(n) | Raw::Wrapped { count: n } => UnreadCount(n),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetUnreadCount;

impl ApiRequest for GetUnreadCount {
    type Data = ();
    type Response = UnreadCount;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/notifications/unread-count".into()
    }
}

#[derive(Debug, Clone)]
pub struct MarkRead {
    id: NotificationId,
}

impl MarkRead {
    pub fn new(id: NotificationId) -> Self {
        Self { id }
    }
}

impl ApiRequest for MarkRead {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/notifications/{}/read", self.id).into()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkAllRead;

impl ApiRequest for MarkAllRead {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/notifications/read-all".into()
    }
}
