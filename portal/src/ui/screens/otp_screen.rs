use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::time::Instant;

use crate::state::otp::OTP_LENGTH;
use crate::state::{AppState, LoadingState, OtpFlow};
use crate::ui::{
    components::{empty_state, help_bar, screen_title},
    layouts, theme,
};

const HELP_TEXT: &str = "0-9: type | Backspace: erase | Enter: verify | r: resend | Esc: back";

pub fn render(f: &mut Frame, state: &AppState, now: Instant) {
    let (title_area, content_area, help_area) = layouts::screen_layout(f.area());

    screen_title::render_screen_title(f, title_area, state, &LoadingState::NotStarted);
    match &state.otp {
        Some(flow) => render_code(f, content_area, flow, now),
        None => empty_state::render_empty_state(
            f,
            content_area,
            "Verify code",
            "No code pending",
            Some("Sign in first, then enter the code we send you"),
        ),
    }
    help_bar::render_footer(f, help_area, state, HELP_TEXT);
}

fn render_code(f: &mut Frame, area: Rect, flow: &OtpFlow, now: Instant) {
    let cells_width = theme::OTP_CELL_WIDTH * OTP_LENGTH as u16;
    let box_area = layouts::centered_box(cells_width.max(44), 8, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(theme::INPUT_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(box_area);

    let sent_to = Paragraph::new(format!("Code sent to {}", flow.email))
        .style(theme::help_text_style())
        .alignment(Alignment::Center);
    f.render_widget(sent_to, chunks[0]);

    render_cells(f, layouts::centered_box(cells_width, theme::INPUT_HEIGHT, chunks[1]), flow);

    let filled = flow.input.cells().iter().flatten().count();
    let progress = Paragraph::new(format!("{}/{} digits", filled, OTP_LENGTH))
        .style(theme::help_text_style())
        .alignment(Alignment::Center);
    f.render_widget(progress, chunks[2]);

    let remaining = flow.resend.remaining(now);
    let resend = if remaining.is_zero() {
        Paragraph::new("Didn't get it? Press r for a new code").style(theme::loading_style())
    } else {
        Paragraph::new(format!(
            "Resend available in {}s",
            remaining.as_secs().max(1)
        ))
        .style(theme::help_text_style())
    };
    f.render_widget(resend.alignment(Alignment::Center), chunks[3]);
}

/// One bordered box per digit; the focused box is highlighted.
fn render_cells(f: &mut Frame, area: Rect, flow: &OtpFlow) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(theme::OTP_CELL_WIDTH); OTP_LENGTH])
        .split(area);

    for (i, (digit, cell_area)) in flow.input.cells().iter().zip(cells.iter()).enumerate() {
        let focused = i == flow.input.focus();
        let (style, border) = if focused {
            (theme::form_field_focused_style(), theme::accent_border_style())
        } else {
            (theme::form_field_style(), Style::default())
        };
        let text = digit.map(String::from).unwrap_or_else(|| "_".to_string());
        let cell = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(cell, *cell_area);
    }
}
