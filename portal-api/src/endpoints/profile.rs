use crate::error::ValidationError;
use crate::macros::setter;
use crate::request::{ApiRequest, EmptyResponse, RequestData};
use portal_auth::CompanyId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default)]
    pub job_alerts: bool,
    #[serde(default)]
    pub language: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct GetProfile;

impl ApiRequest for GetProfile {
    type Data = ();
    type Response = Profile;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/me".into()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    update: ProfileUpdate,
}

impl UpdateProfile {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt update.full_name: String);
    setter!(opt update.phone: String);
}

impl ApiRequest for UpdateProfile {
    type Data = ProfileUpdate;
    type Response = Profile;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/me".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.update)
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    current_password: String,
    new_password: String,
}

impl std::fmt::Debug for ChangePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChangePassword { .. }")
    }
}

impl ChangePassword {
    pub fn new(
        current_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let current_password = current_password.into();
        let new_password = new_password.into();

        if current_password.is_empty() {
            return Err(ValidationError::field("currentPassword", "is required"));
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::field(
                "newPassword",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if new_password == current_password {
            return Err(ValidationError::field(
                "newPassword",
                "must differ from the current password",
            ));
        }

        Ok(Self {
            current_password,
            new_password,
        })
    }
}

impl ApiRequest for ChangePassword {
    type Data = Self;
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/me/password".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetSettings;

impl ApiRequest for GetSettings {
    type Data = ();
    type Response = UserSettings;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/me/settings".into()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateSettings {
    settings: UserSettings,
}

impl UpdateSettings {
    pub fn new(settings: UserSettings) -> Self {
        Self { settings }
    }
}

impl ApiRequest for UpdateSettings {
    type Data = UserSettings;
    type Response = UserSettings;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/users/me/settings".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.settings)
    }
}
