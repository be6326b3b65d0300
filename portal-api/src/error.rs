use portal_auth::AuthClientError;
use thiserror::Error;

/// Coarse error categories the UI reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    Validation,
    Network,
    Business,
}

/// Every failure a request can end in, normalised at the response boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, expired or rejected credentials (after any refresh attempt).
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transport failure; no structured response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("({status}) {message}")]
    Business { status: u16, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) | Self::Decode(_) => ErrorKind::Network,
            Self::Business { .. } => ErrorKind::Business,
        }
    }
}

impl From<AuthClientError> for ApiError {
    fn from(err: AuthClientError) -> Self {
        match err {
            AuthClientError::Http(e) => ApiError::Network(e.to_string()),
            AuthClientError::Unauthorized(_) => ApiError::Unauthorized,
            AuthClientError::Forbidden(msg) => ApiError::Forbidden(msg),
            AuthClientError::Server { status, message } => ApiError::Business { status, message },
            AuthClientError::Malformed(msg) => ApiError::Network(format!("malformed response: {}", msg)),
        }
    }
}

/// Client-side constraint violations, raised before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("{file_name} is not an accepted file type (expected {allowed})")]
    UnsupportedFileType { file_name: String, allowed: String },

    #[error("{file_name} is {size} bytes, over the {limit} byte limit")]
    FileTooLarge {
        file_name: String,
        size: usize,
        limit: usize,
    },

    #[error("{file_name} is empty")]
    EmptyFile { file_name: String },
}

impl ValidationError {
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
