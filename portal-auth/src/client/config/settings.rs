use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AuthError;

/// Backend services the client talks to. Each can live behind its own base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    Jobs,
    Applications,
    Notifications,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceUrls {
    pub auth: Option<String>,
    pub jobs: Option<String>,
    pub applications: Option<String>,
    pub notifications: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub services: ServiceUrls,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            services: ServiceUrls::default(),
            request_timeout_secs: default_request_timeout_secs(),
            storage_dir: None,
        }
    }
}

/// Raw layered configuration: `config.toml` (or `$JOB_PORTAL_CONFIG`) overlaid
/// with `JOB_PORTAL__*` environment variables.
pub fn load_config() -> Result<Config, ConfigError> {
    let config_path =
        std::env::var("JOB_PORTAL_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    Config::builder()
        .add_source(File::with_name(&config_path).required(false))
        .add_source(config::Environment::with_prefix("JOB_PORTAL").separator("__"))
        .build()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(load_config()?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_url("api_url", &self.api_url)?;

        let overrides = [
            ("services.auth", &self.services.auth),
            ("services.jobs", &self.services.jobs),
            ("services.applications", &self.services.applications),
            ("services.notifications", &self.services.notifications),
        ];
        for (name, url) in overrides {
            if let Some(url) = url {
                validate_url(name, url)?;
            }
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Base URL for a service, falling back to `api_url`. Never ends in `/`.
    pub fn service_url(&self, service: Service) -> String {
        let url = match service {
            Service::Auth => self.services.auth.as_ref(),
            Service::Jobs => self.services.jobs.as_ref(),
            Service::Applications => self.services.applications.as_ref(),
            Service::Notifications => self.services.notifications.as_ref(),
        }
        .unwrap_or(&self.api_url);

        url.trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory for the session record, device id and logged-out sentinel.
    pub fn storage_dir(&self) -> Result<PathBuf, AuthError> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::cache_dir()
                .map(|dir| dir.join("job-portal"))
                .ok_or_else(|| {
                    AuthError::Configuration("Could not find cache directory".to_string())
                }),
        }
    }
}

fn validate_url(name: &str, url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err(format!("{} is required", name));
    }
    if !url.starts_with("http") {
        return Err(format!("{} must be a valid HTTP(S) URL", name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        Settings::from_config(config).unwrap()
    }

    #[test]
    fn defaults_apply_to_empty_file() {
        let settings = from_toml("");
        assert_eq!(settings.api_url, "http://localhost:8080");
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn service_overrides_fall_back_to_api_url() {
        let settings = from_toml(
            r#"
            api_url = "https://api.example.com/"

            [services]
            jobs = "https://jobs.example.com"

            [ui]
            search_debounce_ms = 250
            "#,
        );

        assert_eq!(settings.service_url(Service::Jobs), "https://jobs.example.com");
        assert_eq!(settings.service_url(Service::Auth), "https://api.example.com");
        assert_eq!(
            settings.service_url(Service::Notifications),
            "https://api.example.com"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        let settings = from_toml(
            r#"
            [services]
            auth = "ftp://auth"
            "#,
        );
        let err = settings.validate().unwrap_err();
        assert!(err.contains("services.auth"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let settings = from_toml("request_timeout_secs = 0");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn explicit_storage_dir_wins() {
        let settings = from_toml(r#"storage_dir = "/tmp/portal-test""#);
        assert_eq!(
            settings.storage_dir().unwrap(),
            PathBuf::from("/tmp/portal-test")
        );
    }
}
