use chrono::{serde::ts_milliseconds_option, DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Roles the backend hands out. Sessions keep the raw strings so unknown roles
/// survive a round trip; this enum is for checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Candidate,
    Hr,
    HrManager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "CANDIDATE",
            Self::Hr => "HR",
            Self::HrManager => "HR_MANAGER",
            Self::Admin => "ADMIN",
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "CANDIDATE" => Ok(Self::Candidate),
            "HR" => Ok(Self::Hr),
            "HR_MANAGER" => Ok(Self::HrManager),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Company identifier. The backend sends it as a number or a string depending
/// on the endpoint, so both are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CompanyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Ok(Self(s)),
            Raw::Number(n) => Ok(Self(n.to_string())),
        }
    }
}

/// The UI-visible part of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub roles: BTreeSet<String>,
    pub company_id: Option<CompanyId>,
}

impl Identity {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role.as_str())
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

/// Token grant as returned by login, OTP verification, OAuth callback and
/// refresh (inside the envelope's `data`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    /// Validity window in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

/// The live session: one access token plus the identity it was issued for.
///
/// Only ever replaced as a whole; see [`crate::TokenStore`].
#[derive(Debug)]
pub struct Session {
    access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
    pub identity: Identity,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
        identity: Identity,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            expires_at,
            identity,
        }
    }

    /// Build a session from a grant. Returns `None` when the grant is missing
    /// the token or the username.
    pub fn from_grant(grant: TokenGrant, now: DateTime<Utc>) -> Option<Self> {
        if grant.access_token.trim().is_empty() || grant.username.trim().is_empty() {
            return None;
        }

        let expires_at = grant
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| now + Duration::seconds(secs));

        Some(Self::new(
            grant.access_token,
            expires_at,
            Identity {
                username: grant.username,
                roles: grant.roles.into_iter().collect(),
                company_id: grant.company_id,
            },
        ))
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Unknown expiry never counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        self.expires_at
            .map(|expires_at| expires_at <= now + leeway)
            .unwrap_or(false)
    }

    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            username: self.identity.username.clone(),
            roles: self.identity.roles.clone(),
            company_id: self.identity.company_id.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// What survives a restart: everything but the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub username: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            roles: self.roles.clone(),
            company_id: self.company_id.clone(),
        }
    }
}
