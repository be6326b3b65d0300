//! Backend paths owned by the auth service, plus the public job listing.
//!
//! These are shared between the auth client and the endpoint classifier so the
//! two never disagree about which routes belong to the authentication flow.

pub const LOGIN: &str = "/api/auth/login";
pub const REGISTER: &str = "/api/auth/register";
pub const VERIFY_OTP: &str = "/api/auth/verify-otp";
pub const RESEND_OTP: &str = "/api/auth/resend-otp";
pub const FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/api/auth/reset-password";
pub const OAUTH2: &str = "/api/auth/oauth2";
pub const REFRESH: &str = "/api/auth/refresh";
pub const LOGOUT: &str = "/api/auth/logout";

pub const PUBLIC_JOBS: &str = "/api/jobs/public";
