use std::sync::Arc;

use super::refresh::{RefreshCoordinator, RefreshTicket};
use crate::common::Identity;

/// Result of start-up hydration.
pub struct Hydration {
    /// Identity restored from disk, available before any network call.
    pub identity: Option<Identity>,
    /// The background refresh started for a live token, if one was started.
    pub refresh: Option<RefreshTicket>,
}

/// Restores the session on start-up.
///
/// The synchronous half reads the persisted record so route guards have an
/// identity to work with straight away; the asynchronous half asks the
/// coordinator for a real token and is never awaited here.
pub struct Hydrator {
    coordinator: Arc<RefreshCoordinator>,
}

impl Hydrator {
    pub fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn hydrate(&self) -> Hydration {
        let records = self.coordinator.tokens().records();

        if records.is_logged_out() {
            tracing::info!("Logged out on last run, skipping session restore");
            return Hydration {
                identity: None,
                refresh: None,
            };
        }

        let identity = match records.load_record() {
            Ok(record) => record.map(|record| record.identity()),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session record: {}", e);
                None
            }
        };

        if let Some(identity) = &identity {
            tracing::info!("Restored session for {}", identity.username);
        }

        Hydration {
            identity,
            refresh: Some(self.coordinator.refresh_in_background()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::auth_client::AuthClientError;
    use crate::client::refresh::{RefreshFuture, TokenRefresher};
    use crate::client::token_storage::SessionRecordStore;
    use crate::client::token_store::TokenStore;
    use crate::common::{SessionRecord, TokenGrant};
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRefresher {
        calls: AtomicUsize,
        succeed: bool,
    }

    impl TokenRefresher for CountingRefresher {
        fn refresh(&self) -> RefreshFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let succeed = self.succeed;
            Box::pin(async move {
                if succeed {
                    Ok(TokenGrant {
                        access_token: "LIVE".to_string(),
                        expires_in: Some(60),
                        username: "ana".to_string(),
                        roles: vec!["HR".to_string()],
                        company_id: None,
                    })
                } else {
                    Err(AuthClientError::Unauthorized("no cookie".into()))
                }
            })
        }
    }

    fn setup(succeed: bool) -> (tempfile::TempDir, Arc<CountingRefresher>, Arc<RefreshCoordinator>) {
        let dir = tempfile::tempdir().unwrap();
        let tokens = Arc::new(TokenStore::new(SessionRecordStore::new(dir.path()).unwrap()));
        let refresher = Arc::new(CountingRefresher {
            calls: AtomicUsize::new(0),
            succeed,
        });
        let coordinator = RefreshCoordinator::new(refresher.clone(), tokens);
        (dir, refresher, coordinator)
    }

    fn record() -> SessionRecord {
        SessionRecord {
            username: "ana".to_string(),
            roles: BTreeSet::from(["HR".to_string()]),
            company_id: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn identity_is_available_before_refresh_resolves() {
        let (_dir, refresher, coordinator) = setup(true);
        coordinator.tokens().records().save_record(&record()).unwrap();

        let hydration = Hydrator::new(coordinator.clone()).hydrate();

        // Synchronous half is done; the token is not there yet
        assert_eq!(hydration.identity.unwrap().username, "ana");
        assert!(coordinator.tokens().get().is_none());

        let session = hydration.refresh.unwrap().wait().await.unwrap();
        assert_eq!(session.access_token(), "LIVE");
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn logged_out_sentinel_suppresses_refresh() {
        let (_dir, refresher, coordinator) = setup(true);
        coordinator.tokens().records().save_record(&record()).unwrap();
        coordinator.tokens().sign_out();

        let hydration = Hydrator::new(coordinator.clone()).hydrate();
        tokio::task::yield_now().await;

        assert!(hydration.identity.is_none());
        assert!(hydration.refresh.is_none());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_user_signed_out() {
        let (_dir, _refresher, coordinator) = setup(false);
        coordinator.tokens().records().save_record(&record()).unwrap();

        let hydration = Hydrator::new(coordinator.clone()).hydrate();
        assert!(hydration.identity.is_some());

        assert!(hydration.refresh.unwrap().wait().await.is_none());
        assert!(coordinator.tokens().get().is_none());
        assert!(coordinator.tokens().records().load_record().unwrap().is_none());
    }
}
