pub mod components;
pub mod layouts;
pub mod screens;
pub mod theme;

use crate::log_buffer::LogBuffer;
use crate::state::{AppState, Route};
use ratatui::Frame;
use screens::*;
use std::time::Instant;

/// Pure render dispatcher - routes to appropriate screen renderer
/// This function is read-only and never mutates state
pub fn render_app(f: &mut Frame, state: &AppState, log_buffer: &LogBuffer) {
    match state.route {
        Route::SignIn => sign_in_screen::render(f, state),
        Route::VerifyOtp => otp_screen::render(f, state, Instant::now()),
        Route::Jobs => jobs_screen::render(f, state),
        Route::JobDetail(_) => job_detail_screen::render(f, state),
        Route::CandidateDashboard
        | Route::HrDashboard
        | Route::HrManagerDashboard
        | Route::AdminDashboard => dashboard_screen::render(f, state),
        Route::Profile => profile_screen::render(f, state),
        Route::AccessDenied => access_denied_screen::render(f, state),
    }

    components::toasts::render_toasts(f, &state.toasts);

    if state.logs_visible {
        components::logs_popup::render_logs_popup(f, log_buffer);
    }

    // Render help popup on top if visible
    if state.help_visible {
        components::help_popup::render_help_popup(f, state);
    }
}
