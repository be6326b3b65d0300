//! Static classification of request paths.
//!
//! Decides, without any I/O, whether a path may carry a bearer token and
//! whether a 401 on it may be answered with a token refresh.

use portal_auth::common::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointClass {
    /// Never gets an `Authorization` header, even with a live session.
    pub is_public: bool,
    /// A 401 here may trigger one refresh-and-retry.
    pub refresh_eligible: bool,
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Exact(&'static str),
    /// The path itself or anything below it.
    Prefix(&'static str),
}

impl Pattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(p) => path == *p,
            Pattern::Prefix(p) => {
                path == *p || (path.starts_with(p) && path[p.len()..].starts_with('/'))
            }
        }
    }
}

const PUBLIC: &[Pattern] = &[
    Pattern::Exact(paths::LOGIN),
    Pattern::Exact(paths::REGISTER),
    Pattern::Exact(paths::VERIFY_OTP),
    Pattern::Exact(paths::RESEND_OTP),
    Pattern::Exact(paths::FORGOT_PASSWORD),
    Pattern::Exact(paths::RESET_PASSWORD),
    Pattern::Prefix(paths::OAUTH2),
    Pattern::Prefix(paths::PUBLIC_JOBS),
];

// Refreshing to serve these would loop or make no sense
const AUTH_FLOW: &[Pattern] = &[Pattern::Exact(paths::REFRESH), Pattern::Exact(paths::LOGOUT)];

/// Strip scheme/host, query string and fragment, and one trailing slash
/// (except for the root path).
pub fn normalize(path: &str) -> &str {
    let path = match path.find("://") {
        Some(idx) => {
            let rest = &path[idx + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("/")
        }
        None => path,
    };

    let path = path.split(['?', '#']).next().unwrap_or(path);

    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

pub fn classify(path: &str) -> EndpointClass {
    let path = normalize(path);
    let is_public = PUBLIC.iter().any(|p| p.matches(path));
    let no_refresh = is_public || AUTH_FLOW.iter().any(|p| p.matches(path));

    EndpointClass {
        is_public,
        refresh_eligible: !no_refresh,
    }
}
