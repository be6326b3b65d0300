pub mod auth_client;
mod config;
mod cookie_jar;
mod device_id;
mod hydrator;
mod refresh;
mod token_storage;
mod token_store;

pub use auth_client::AuthClient;
pub use self::config::{Service, ServiceUrls, Settings};
pub use cookie_jar::PersistentCookieJar;
pub use device_id::DeviceIdStore;
pub use hydrator::{Hydration, Hydrator};
pub use refresh::{AuthEvent, RefreshCoordinator, RefreshFuture, RefreshTicket, TokenRefresher};
pub use token_storage::SessionRecordStore;
pub use token_store::TokenStore;

pub(crate) use self::config::load_config;

use chrono::Utc;
use std::sync::Arc;

use crate::common::{Identity, Session, TokenGrant};
use crate::error::AuthError;

/// Everything that shares the one live session: the auth client, the token
/// store and the refresh coordinator.
#[derive(Clone)]
pub struct AuthContext {
    pub settings: Settings,
    pub auth_client: Arc<AuthClient>,
    pub tokens: Arc<TokenStore>,
    pub coordinator: Arc<RefreshCoordinator>,
}

impl AuthContext {
    /// Wire up storage, device id and clients from settings.
    pub fn bootstrap(settings: Settings) -> Result<Self, AuthError> {
        settings.validate().map_err(AuthError::Configuration)?;

        let storage_dir = settings.storage_dir()?;
        let device_id = DeviceIdStore::new(&storage_dir)?.load_or_create()?;
        let records = SessionRecordStore::new(&storage_dir)?;
        let cookies = Arc::new(PersistentCookieJar::open(&storage_dir));

        let auth_client = Arc::new(AuthClient::new(
            settings.service_url(Service::Auth),
            device_id,
            settings.request_timeout(),
            cookies.clone(),
        )?);
        let tokens = Arc::new(TokenStore::new(records).with_cookie_jar(cookies));
        let coordinator = RefreshCoordinator::new(auth_client.clone(), tokens.clone());

        tracing::debug!("Auth context ready (storage: {})", storage_dir.display());

        Ok(Self {
            settings,
            auth_client,
            tokens,
            coordinator,
        })
    }

    pub fn hydrator(&self) -> Hydrator {
        Hydrator::new(self.coordinator.clone())
    }

    /// Install the session from a grant obtained by login, OTP verification or
    /// the OAuth callback.
    pub fn sign_in(&self, grant: TokenGrant) -> Result<Identity, AuthError> {
        let session = Session::from_grant(grant, Utc::now()).ok_or_else(|| {
            AuthError::AuthClient(auth_client::AuthClientError::Malformed(
                "grant is missing token or username".to_string(),
            ))
        })?;

        let session = self.tokens.set(session);
        tracing::info!("Signed in as {}", session.identity.username);
        Ok(session.identity.clone())
    }

    /// Tell the backend (best effort), then drop the session locally and
    /// remember the explicit logout.
    pub async fn sign_out(&self) {
        let token = self.tokens.get();
        if let Err(e) = self
            .auth_client
            .logout(token.as_ref().map(|session| session.access_token()))
            .await
        {
            tracing::warn!("Logout call failed, clearing local session anyway: {}", e);
        }

        self.tokens.sign_out();
        tracing::info!("Signed out");
    }
}
