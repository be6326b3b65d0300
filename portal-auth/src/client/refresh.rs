//! Single-flight access token refresh.
//!
//! However many callers ask for a fresh token while a refresh is running, the
//! refresh endpoint is hit once and every caller receives the same outcome.
//! The coordinator is an explicit two-state machine:
//!
//! ```text
//! Idle --first caller--> Refreshing { waiters } --outcome--> Idle
//! ```
//!
//! The network call runs on its own task, so a caller that gives up waiting
//! cannot leave the machine stuck in `Refreshing`.
//!
//! A refresh only writes to the token store if the session is still the one it
//! started from. A sign-out or sign-in that lands mid-flight wins; the late
//! grant is dropped and waiters get `None`.

use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, oneshot};

use super::auth_client::{AuthClient, AuthClientError};
use super::token_store::TokenStore;
use crate::common::{Identity, Session, TokenGrant};

pub type RefreshFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TokenGrant, AuthClientError>> + Send + 'a>>;

/// Something that can trade the long-lived credential for a new token grant.
pub trait TokenRefresher: Send + Sync {
    fn refresh(&self) -> RefreshFuture<'_>;
}

impl TokenRefresher for AuthClient {
    fn refresh(&self) -> RefreshFuture<'_> {
        Box::pin(self.refresh_token())
    }
}

/// Published once per resolved refresh, however many callers waited on it.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    Refreshed(Identity),
    SessionExpired,
}

type Waiter = oneshot::Sender<Option<Arc<Session>>>;

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

pub struct RefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    tokens: Arc<TokenStore>,
    state: Mutex<RefreshState>,
    events: broadcast::Sender<AuthEvent>,
}

/// Handle on a refresh that was started (or joined) without waiting for it.
pub struct RefreshTicket {
    rx: oneshot::Receiver<Option<Arc<Session>>>,
}

impl RefreshTicket {
    /// Resolves to the refreshed session, or `None` if the refresh failed.
    pub async fn wait(self) -> Option<Arc<Session>> {
        self.rx.await.ok().flatten()
    }
}

impl RefreshCoordinator {
    pub fn new(refresher: Arc<dyn TokenRefresher>, tokens: Arc<TokenStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            refresher,
            tokens,
            state: Mutex::new(RefreshState::Idle),
            events,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            RefreshState::Refreshing { .. }
        )
    }

    /// Obtain a fresh session, joining an in-flight refresh if there is one.
    pub async fn ensure_fresh_token(self: &Arc<Self>) -> Option<Arc<Session>> {
        self.refresh_in_background().wait().await
    }

    /// Start a refresh, or attach to the running one, without waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn refresh_in_background(self: &Arc<Self>) -> RefreshTicket {
        let (tx, rx) = oneshot::channel();

        let start = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &mut *state {
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing { waiters: vec![tx] };
                    true
                }
                RefreshState::Refreshing { waiters } => {
                    waiters.push(tx);
                    false
                }
            }
        };

        if start {
            let this = Arc::clone(self);
            let epoch = self.tokens.epoch();
            tokio::spawn(async move { this.run(epoch).await });
        } else {
            tracing::debug!("Joined in-flight token refresh");
        }

        RefreshTicket { rx }
    }

    async fn run(&self, epoch: u64) {
        tracing::info!("Refreshing access token");

        let refreshed = match self.refresher.refresh().await {
            Ok(grant) => {
                let session = Session::from_grant(grant, Utc::now());
                if session.is_none() {
                    tracing::warn!("Refresh response was missing token or identity");
                }
                session
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                None
            }
        };

        let outcome = match refreshed {
            Some(session) => {
                let installed = self.tokens.set_if_current(epoch, session);
                if installed.is_none() {
                    tracing::info!("Session changed during refresh, dropping the new token");
                }
                installed
            }
            None => {
                self.tokens.clear_if_current(epoch);
                None
            }
        };

        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        // The event describes the store as it now stands, so a sign-in that
        // overtook a failed refresh is not reported as an expiry.
        let event = match (&outcome, self.tokens.identity()) {
            (Some(session), _) => {
                tracing::info!(
                    "Access token refreshed for {} ({} waiting)",
                    session.identity.username,
                    waiters.len()
                );
                AuthEvent::Refreshed(session.identity.clone())
            }
            (None, Some(identity)) => AuthEvent::Refreshed(identity),
            (None, None) => AuthEvent::SessionExpired,
        };
        // No subscribers is fine
        let _ = self.events.send(event);

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}
