use cookie_store::{CookieStore, RawCookie};
use reqwest::header::HeaderValue;
use reqwest::Url;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use super::token_storage::restrict_permissions;
use crate::error::AuthError;

const COOKIE_FILE: &str = "cookies.json";

/// Cookie jar for the auth client that survives restarts.
///
/// The refresh credential arrives as an HTTP-only cookie, usually without an
/// expiry. The jar keeps it, session cookies included, in `cookies.json` next
/// to the session record so a new process can still refresh.
pub struct PersistentCookieJar {
    path: PathBuf,
    store: RwLock<CookieStore>,
}

impl PersistentCookieJar {
    /// Load the jar from `dir`, starting empty if it is missing or unreadable.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(COOKIE_FILE);

        let store = match load(&path) {
            Ok(Some(store)) => store,
            Ok(None) => CookieStore::default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cookie jar: {}", e);
                CookieStore::default()
            }
        };

        Self {
            path,
            store: RwLock::new(store),
        }
    }

    /// Forget every cookie, in memory and on disk.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| AuthError::Storage(format!("Failed to delete cookie jar: {}", e)))?;
        }
        Ok(())
    }

    pub fn has_cookies_for(&self, url: &Url) -> bool {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .next()
            .is_some()
    }

    /// Store one raw `Set-Cookie` value as if `url` had sent it.
    pub fn store_raw(&self, set_cookie: &str, url: &Url) {
        self.store_all(std::iter::once(set_cookie), url);
    }

    fn store_all<'a>(&self, values: impl Iterator<Item = &'a str>, url: &Url) {
        let cookies: Vec<RawCookie<'static>> = values
            .filter_map(|value| RawCookie::parse(value.to_owned()).ok())
            .collect();
        if cookies.is_empty() {
            return;
        }

        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.store_response_cookies(cookies.into_iter(), url);

        if let Err(e) = self.save(&store) {
            tracing::warn!("Failed to persist cookie jar: {}", e);
        }
    }

    fn save(&self, store: &CookieStore) -> Result<(), AuthError> {
        let mut buffer = Vec::new();
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(store, &mut buffer)
            .map_err(|e| AuthError::Storage(format!("Failed to encode cookie jar: {}", e)))?;

        fs::write(&self.path, buffer)
            .map_err(|e| AuthError::Storage(format!("Failed to save cookie jar: {}", e)))?;

        restrict_permissions(&self.path)
    }
}

fn load(path: &Path) -> Result<Option<CookieStore>, AuthError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = fs::File::open(path)
        .map_err(|e| AuthError::Storage(format!("Failed to open cookie jar: {}", e)))?;

    // Expired cookies are dropped on the way in
    cookie_store::serde::json::load(BufReader::new(file))
        .map(Some)
        .map_err(|e| AuthError::Storage(format!("Failed to read cookie jar: {}", e)))
}

impl reqwest::cookie::CookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store_all(cookie_headers.filter_map(|value| value.to_str().ok()), url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore as _;

    fn url(path: &str) -> Url {
        Url::parse(&format!("http://127.0.0.1:8080{}", path)).unwrap()
    }

    #[test]
    fn session_cookie_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let jar = PersistentCookieJar::open(dir.path());
        jar.store_raw("refresh=abc; HttpOnly; Path=/", &url("/api/auth/login"));
        drop(jar);

        let reopened = PersistentCookieJar::open(dir.path());
        let header = reopened.cookies(&url("/api/auth/refresh")).unwrap();
        assert_eq!(header.to_str().unwrap(), "refresh=abc");
    }

    #[test]
    fn expired_cookie_is_not_restored() {
        let dir = tempfile::tempdir().unwrap();

        let jar = PersistentCookieJar::open(dir.path());
        jar.store_raw("refresh=abc; Path=/; Max-Age=1", &url("/"));
        drop(jar);
        std::thread::sleep(std::time::Duration::from_millis(1100));

        let reopened = PersistentCookieJar::open(dir.path());
        assert!(reopened.cookies(&url("/")).is_none());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(COOKIE_FILE), "not json").unwrap();

        let jar = PersistentCookieJar::open(dir.path());
        assert!(!jar.has_cookies_for(&url("/")));
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let jar = PersistentCookieJar::open(dir.path());
        jar.store_raw("refresh=abc; Path=/", &url("/"));
        assert!(dir.path().join(COOKIE_FILE).exists());

        jar.clear().unwrap();
        assert!(!dir.path().join(COOKIE_FILE).exists());
        assert!(jar.cookies(&url("/")).is_none());
        // Clearing twice is fine
        jar.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn jar_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let jar = PersistentCookieJar::open(dir.path());
        jar.store_raw("refresh=abc; Path=/", &url("/"));

        let mode = fs::metadata(dir.path().join(COOKIE_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
