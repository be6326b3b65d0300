use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::config::UiSettings;

/// Approximate position as reported by an IP geolocation service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "regionName")]
    pub region: Option<String>,
    #[serde(default, alias = "country_name")]
    pub country: Option<String>,
}

impl Location {
    /// Most specific place name available, usable as a search filter.
    pub fn label(&self) -> Option<&str> {
        [&self.city, &self.region, &self.country]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationLookup {
    Found(Location),
    Unavailable,
}

/// Run a lookup under a hard deadline. Errors, timeouts and nameless results
/// all resolve to `Unavailable`.
pub async fn with_timeout<F>(lookup: F, timeout: Duration) -> LocationLookup
where
    F: Future<Output = Result<Location>>,
{
    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(location)) if location.label().is_some() => LocationLookup::Found(location),
        Ok(Ok(_)) => {
            tracing::warn!("Geolocation returned no usable place name");
            LocationLookup::Unavailable
        }
        Ok(Err(e)) => {
            tracing::warn!("Geolocation failed: {:#}", e);
            LocationLookup::Unavailable
        }
        Err(_) => {
            tracing::warn!("Geolocation timed out after {:?}", timeout);
            LocationLookup::Unavailable
        }
    }
}

pub struct GeoLocator {
    http: reqwest::Client,
    url: Option<String>,
    timeout: Duration,
}

impl GeoLocator {
    pub fn new(settings: &UiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.geolocation_timeout())
            .build()
            .context("Failed to build geolocation client")?;

        Ok(Self {
            http,
            url: settings.geolocation_url.clone(),
            timeout: settings.geolocation_timeout(),
        })
    }

    pub async fn locate(&self) -> LocationLookup {
        with_timeout(self.fetch(), self.timeout).await
    }

    async fn fetch(&self) -> Result<Location> {
        let Some(url) = &self.url else {
            bail!("no geolocation service configured");
        };

        let response = self.http.get(url).send().await?.error_for_status()?;
        let location = response.json::<Location>().await?;
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lisbon() -> Location {
        Location {
            city: Some("Lisbon".into()),
            region: None,
            country: Some("Portugal".into()),
        }
    }

    #[test]
    fn test_label_prefers_city() {
        assert_eq!(lisbon().label(), Some("Lisbon"));

        let country_only = Location {
            city: Some("  ".into()),
            region: None,
            country: Some("Portugal".into()),
        };
        assert_eq!(country_only.label(), Some("Portugal"));
    }

    #[test]
    fn test_location_accepts_provider_field_names() {
        let location: Location = serde_json::from_str(
            r#"{"city": "Porto", "regionName": "Norte", "country_name": "Portugal"}"#,
        )
        .unwrap();
        assert_eq!(location.region.as_deref(), Some("Norte"));
        assert_eq!(location.country.as_deref(), Some("Portugal"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_within_deadline() {
        let lookup = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(lisbon())
        };
        assert_eq!(
            with_timeout(lookup, Duration::from_secs(1)).await,
            LocationLookup::Found(lisbon())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_is_unavailable() {
        let lookup = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(lisbon())
        };
        assert_eq!(
            with_timeout(lookup, Duration::from_secs(5)).await,
            LocationLookup::Unavailable
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_is_unavailable() {
        let lookup = async { Err(anyhow::anyhow!("permission denied")) };
        assert_eq!(
            with_timeout(lookup, Duration::from_secs(5)).await,
            LocationLookup::Unavailable
        );
    }

    #[tokio::test]
    async fn test_unconfigured_locator_is_unavailable() {
        let locator = GeoLocator::new(&UiSettings::default()).unwrap();
        assert_eq!(locator.locate().await, LocationLookup::Unavailable);
    }
}
