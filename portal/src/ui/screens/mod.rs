pub mod access_denied_screen;
pub mod dashboard_screen;
pub mod job_detail_screen;
pub mod jobs_screen;
pub mod otp_screen;
pub mod profile_screen;
pub mod sign_in_screen;
