use std::time::{Duration, Instant};

pub const OTP_LENGTH: usize = 6;

/// Six single-digit cells with a focus cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    cells: [Option<char>; OTP_LENGTH],
    focus: usize,
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn set_focus(&mut self, index: usize) {
        self.focus = index.min(OTP_LENGTH - 1);
    }

    pub fn cells(&self) -> &[Option<char>; OTP_LENGTH] {
        &self.cells
    }

    /// Fill the focused cell and move right. Non-digits are ignored.
    pub fn type_char(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        self.cells[self.focus] = Some(c);
        if self.focus < OTP_LENGTH - 1 {
            self.focus += 1;
        }
    }

    /// Clear the focused cell, or step back and clear the previous one if the
    /// focused cell is already empty.
    pub fn backspace(&mut self) {
        if self.cells[self.focus].is_some() {
            self.cells[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
            self.cells[self.focus] = None;
        }
    }

    /// Spread the digits of `text` over the cells from the first one and focus
    /// the last cell filled. Text without digits changes nothing.
    pub fn paste(&mut self, text: &str) {
        let digits: Vec<char> = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(OTP_LENGTH)
            .collect();
        if digits.is_empty() {
            return;
        }

        self.cells = [None; OTP_LENGTH];
        for (cell, digit) in self.cells.iter_mut().zip(&digits) {
            *cell = Some(*digit);
        }
        self.focus = digits.len() - 1;
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// The full code once every cell is filled.
    pub fn code(&self) -> Option<String> {
        self.cells.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// `1 2 _ _ _ _` with the focused cell bracketed.
    pub fn display(&self) -> String {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let c = cell.unwrap_or('_');
                if i == self.focus {
                    format!("[{}]", c)
                } else {
                    c.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Local gate for "resend code": unlocks once a fraction of the code's
/// validity window has passed since it was sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResendCountdown {
    sent_at: Instant,
    wait: Duration,
}

impl ResendCountdown {
    pub fn start(sent_at: Instant, validity: Duration, fraction: f64) -> Self {
        Self {
            sent_at,
            wait: validity.mul_f64(fraction.clamp(0.0, 1.0)),
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.wait
            .saturating_sub(now.saturating_duration_since(self.sent_at))
    }

    pub fn can_resend(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }
}

/// Resend timing for one-time codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtpPolicy {
    /// Used when the backend does not say how long the code lives.
    pub validity: Duration,
    pub resend_fraction: f64,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            validity: Duration::from_secs(300),
            resend_fraction: 0.5,
        }
    }
}

impl OtpPolicy {
    pub fn countdown(&self, expires_in: Option<u64>, sent_at: Instant) -> ResendCountdown {
        let validity = expires_in
            .map(Duration::from_secs)
            .unwrap_or(self.validity);
        ResendCountdown::start(sent_at, validity, self.resend_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(digits: &str) -> OtpInput {
        let mut otp = OtpInput::new();
        digits.chars().for_each(|c| otp.type_char(c));
        otp
    }

    #[test]
    fn typing_fills_and_advances() {
        let otp = typed("12");
        assert_eq!(otp.cells()[..3], [Some('1'), Some('2'), None]);
        assert_eq!(otp.focus(), 2);
    }

    #[test]
    fn typing_non_digits_is_ignored() {
        let otp = typed("1a-");
        assert_eq!(otp.focus(), 1);
        assert_eq!(otp.cells()[1], None);
    }

    #[test]
    fn focus_stays_on_last_cell() {
        let mut otp = typed("123456");
        assert_eq!(otp.focus(), 5);
        otp.type_char('9');
        assert_eq!(otp.code().as_deref(), Some("123459"));
    }

    #[test]
    fn backspace_clears_then_moves_back() {
        let mut otp = typed("123");
        assert_eq!(otp.focus(), 3);

        otp.backspace();
        assert_eq!(otp.focus(), 2);
        assert_eq!(otp.cells()[2], None);

        otp.set_focus(1);
        otp.backspace();
        assert_eq!(otp.focus(), 1);
        assert_eq!(otp.cells()[1], None);

        let mut empty = OtpInput::new();
        empty.backspace();
        assert_eq!(empty.focus(), 0);
    }

    #[test]
    fn paste_distributes_digits_and_focuses_last_filled() {
        let mut otp = OtpInput::new();
        otp.paste("12-34");
        assert_eq!(
            otp.cells(),
            &[Some('1'), Some('2'), Some('3'), Some('4'), None, None]
        );
        assert_eq!(otp.focus(), 3);

        otp.paste("987654321");
        assert_eq!(otp.code().as_deref(), Some("987654"));
        assert_eq!(otp.focus(), 5);
    }

    #[test]
    fn paste_without_digits_changes_nothing() {
        let mut otp = typed("12");
        let before = otp.clone();
        otp.paste("abc");
        assert_eq!(otp, before);
    }

    #[test]
    fn incomplete_code_is_none() {
        assert_eq!(typed("12345").code(), None);
        assert!(!typed("12345").is_complete());
    }

    #[test]
    fn display_marks_focus() {
        assert_eq!(typed("1").display(), "1 [_] _ _ _ _");
    }

    #[test]
    fn resend_unlocks_after_fraction_of_validity() {
        let sent = Instant::now();
        let countdown = ResendCountdown::start(sent, Duration::from_secs(300), 0.5);

        assert!(!countdown.can_resend(sent));
        assert_eq!(
            countdown.remaining(sent + Duration::from_secs(100)),
            Duration::from_secs(50)
        );
        assert!(!countdown.can_resend(sent + Duration::from_secs(149)));
        assert!(countdown.can_resend(sent + Duration::from_secs(150)));
    }

    #[test]
    fn policy_prefers_backend_validity() {
        let sent = Instant::now();
        let policy = OtpPolicy::default();

        let from_backend = policy.countdown(Some(60), sent);
        assert!(from_backend.can_resend(sent + Duration::from_secs(30)));

        let fallback = policy.countdown(None, sent);
        assert_eq!(fallback.remaining(sent), Duration::from_secs(150));
    }
}
