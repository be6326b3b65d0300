// Types shared by the auth client and the API client
pub mod common;

mod client;
mod error;

pub use client::auth_client::{
    AuthClientError, LoginOutcome, OAuthAuthorization, OAuthProvider, OtpChallenge, Registration,
};
pub use client::{
    AuthClient, AuthContext, AuthEvent, DeviceIdStore, Hydration, Hydrator, PersistentCookieJar,
    RefreshCoordinator, RefreshFuture, RefreshTicket, Service, ServiceUrls, SessionRecordStore, Settings, TokenRefresher,
    TokenStore,
};
pub use common::{CompanyId, Identity, Role, Session, SessionRecord, TokenGrant};
pub use error::AuthError;

/// Raw layered configuration, for callers that keep their own sections in the
/// same file.
pub fn load_config() -> Result<config::Config, config::ConfigError> {
    client::load_config()
}
