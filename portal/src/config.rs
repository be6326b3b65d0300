use anyhow::{bail, Context, Result};
use config::Config;
use portal_auth::Settings;
use serde::Deserialize;
use std::time::Duration;

/// Front-end tunables, read from the `[ui]` table of the same config file the
/// auth layer uses.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UiSettings {
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_otp_validity_secs")]
    pub otp_validity_secs: u64,
    /// Share of the OTP validity that must pass before "resend" unlocks.
    #[serde(default = "default_otp_resend_fraction")]
    pub otp_resend_fraction: f64,
    #[serde(default)]
    pub geolocation_url: Option<String>,
    #[serde(default = "default_geolocation_timeout_ms")]
    pub geolocation_timeout_ms: u64,
}

fn default_search_debounce_ms() -> u64 {
    400
}

fn default_otp_validity_secs() -> u64 {
    300
}

fn default_otp_resend_fraction() -> f64 {
    0.5
}

fn default_geolocation_timeout_ms() -> u64 {
    5000
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
            otp_validity_secs: default_otp_validity_secs(),
            otp_resend_fraction: default_otp_resend_fraction(),
            geolocation_url: None,
            geolocation_timeout_ms: default_geolocation_timeout_ms(),
        }
    }
}

impl UiSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.otp_resend_fraction > 0.0 && self.otp_resend_fraction <= 1.0) {
            bail!(
                "ui.otp_resend_fraction must be in (0, 1], got {}",
                self.otp_resend_fraction
            );
        }
        if let Some(url) = &self.geolocation_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("ui.geolocation_url must be an http(s) URL, got '{}'", url);
            }
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn otp_validity(&self) -> Duration {
        Duration::from_secs(self.otp_validity_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }
}

/// Everything the binary needs from configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: Settings,
    pub ui: UiSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let raw = portal_auth::load_config().context("Failed to read configuration")?;
        Self::from_config(raw)
    }

    pub fn from_config(raw: Config) -> Result<Self> {
        let ui = match raw.get::<UiSettings>("ui") {
            Ok(ui) => ui,
            Err(config::ConfigError::NotFound(_)) => UiSettings::default(),
            Err(e) => return Err(e).context("Invalid [ui] configuration"),
        };
        ui.validate()?;

        let auth = Settings::from_config(raw).context("Invalid configuration")?;

        Ok(Self { auth, ui })
    }
}
