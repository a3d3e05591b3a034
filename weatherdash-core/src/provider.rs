use crate::{
    Config,
    model::{ForecastEntry, Query, Units, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Why a provider call failed. The dashboard collapses every variant into a
/// single "fetch failed" outcome; the distinction only shows up in logs.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Provider request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// A remote weather source. Conversion between unit systems is the
/// provider's job; callers only pass the selector through.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &Query, units: Units) -> Result<WeatherSnapshot, FetchError>;

    /// The provider's full 3-hourly forecast list, unsampled.
    async fn forecast(
        &self,
        query: &Query,
        units: Units,
    ) -> Result<Vec<ForecastEntry>, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::with_base_url(api_key, config.endpoints.weather.clone());
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `weatherdash configure`"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn json_errors_become_malformed() {
        let err: FetchError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
