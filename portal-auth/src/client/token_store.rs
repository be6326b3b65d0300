use chrono::{Duration, Utc};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::cookie_jar::PersistentCookieJar;
use super::token_storage::SessionRecordStore;
use crate::common::{Identity, Session};

/// Process-wide holder of the live session.
///
/// Reads are lock-and-clone of an `Arc`, so `get` is cheap enough to run on
/// every outgoing request. Writers always replace the whole session; there is
/// no way to patch a single field.
///
/// Every write bumps an epoch. A refresh records the epoch it started from and
/// only lands if nothing replaced or cleared the session in the meantime.
pub struct TokenStore {
    current: RwLock<Slot>,
    records: SessionRecordStore,
    cookies: Option<Arc<PersistentCookieJar>>,
}

#[derive(Default)]
struct Slot {
    session: Option<Arc<Session>>,
    epoch: u64,
}

impl TokenStore {
    pub fn new(records: SessionRecordStore) -> Self {
        Self {
            current: RwLock::new(Slot::default()),
            records,
            cookies: None,
        }
    }

    /// Also erase the persisted refresh cookie on sign-out.
    pub fn with_cookie_jar(mut self, jar: Arc<PersistentCookieJar>) -> Self {
        self.cookies = Some(jar);
        self
    }

    pub fn get(&self) -> Option<Arc<Session>> {
        self.read().session.clone()
    }

    pub fn epoch(&self) -> u64 {
        self.read().epoch
    }

    /// Replace the session and persist its minimal record.
    ///
    /// Persisting also lifts the logged-out flag. Storage failures are logged;
    /// the in-memory session is authoritative either way.
    pub fn set(&self, session: Session) -> Arc<Session> {
        let mut slot = self.write();
        self.install(&mut slot, session)
    }

    /// Like `set`, but only if the session is still at `epoch`.
    pub fn set_if_current(&self, epoch: u64, session: Session) -> Option<Arc<Session>> {
        let mut slot = self.write();
        if slot.epoch != epoch {
            tracing::debug!("Session moved from epoch {} to {}, not replacing", epoch, slot.epoch);
            return None;
        }
        Some(self.install(&mut slot, session))
    }

    /// Drop the session and erase its record. Used when a refresh fails.
    pub fn clear(&self) {
        let mut slot = self.write();
        self.erase(&mut slot);
    }

    /// Like `clear`, but only if the session is still at `epoch`.
    pub fn clear_if_current(&self, epoch: u64) -> bool {
        let mut slot = self.write();
        if slot.epoch != epoch {
            return false;
        }
        self.erase(&mut slot);
        true
    }

    /// Explicit logout: clear and remember it, so the next start does not try
    /// to refresh silently.
    pub fn sign_out(&self) {
        let mut slot = self.write();
        self.erase(&mut slot);

        if let Err(e) = self.records.mark_logged_out() {
            tracing::warn!("Failed to write logout flag: {}", e);
        }
        if let Some(jar) = &self.cookies {
            if let Err(e) = jar.clear() {
                tracing::warn!("Failed to erase cookie jar: {}", e);
            }
        }
    }

    fn install(&self, slot: &mut Slot, session: Session) -> Arc<Session> {
        let record = session.record();
        let session = Arc::new(session);

        slot.session = Some(session.clone());
        slot.epoch += 1;

        if let Err(e) = self.records.save_record(&record) {
            tracing::warn!("Failed to persist session record: {}", e);
        }
        if let Err(e) = self.records.clear_logged_out() {
            tracing::warn!("Failed to clear logout flag: {}", e);
        }

        tracing::debug!("Session set for {}", record.username);
        session
    }

    fn erase(&self, slot: &mut Slot) {
        let previous = slot.session.take();
        slot.epoch += 1;

        if let Err(e) = self.records.delete_record() {
            tracing::warn!("Failed to delete session record: {}", e);
        }

        if previous.is_some() {
            tracing::debug!("Session cleared");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.get().map(|session| session.identity.clone())
    }

    /// True when there is no session or it expires within `leeway`.
    pub fn is_expired(&self, leeway: Duration) -> bool {
        match self.get() {
            Some(session) => session.is_expired(Utc::now(), leeway),
            None => true,
        }
    }

    pub fn records(&self) -> &SessionRecordStore {
        &self.records
    }
}
