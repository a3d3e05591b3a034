use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::model::{ConditionClass, ForecastEntry, Query, Units, WeatherSnapshot};

use super::{FetchError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn query_params(&self, query: &Query, units: Units) -> Vec<(&'static str, String)> {
        let mut params = match query {
            Query::City(name) => vec![("q", name.clone())],
            Query::Coords(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", units.as_str().to_string()));
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &Query,
        units: Units,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, %query, %units, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query, units))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(query.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: u64,
    name: String,
    dt: i64,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn primary_weather(weather: &[OwWeather]) -> Result<&OwWeather, FetchError> {
    weather
        .first()
        .ok_or_else(|| FetchError::Malformed("response contained no weather descriptor".into()))
}

impl TryFrom<OwCurrentResponse> for WeatherSnapshot {
    type Error = FetchError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        let weather = primary_weather(&parsed.weather)?;

        Ok(WeatherSnapshot {
            location_id: parsed.id,
            condition: ConditionClass::from_main(&weather.main),
            description: weather.description.clone(),
            location_name: parsed.name,
            country_code: parsed.sys.country.unwrap_or_default(),
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like.unwrap_or(parsed.main.temp),
            humidity: parsed.main.humidity.unwrap_or_default(),
            wind_speed: parsed.wind.speed,
            observed_at: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastEntry {
    type Error = FetchError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        let weather = primary_weather(&entry.weather)?;
        let timestamp = unix_to_utc(entry.dt)
            .ok_or_else(|| FetchError::Malformed(format!("invalid timestamp {}", entry.dt)))?;

        Ok(ForecastEntry {
            timestamp,
            condition: ConditionClass::from_main(&weather.main),
            description: weather.description.clone(),
            temperature: entry.main.temp,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &Query, units: Units) -> Result<WeatherSnapshot, FetchError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query, units).await?;
        WeatherSnapshot::try_from(parsed)
    }

    async fn forecast(
        &self,
        query: &Query,
        units: Units,
    ) -> Result<Vec<ForecastEntry>, FetchError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query, units).await?;
        parsed.list.into_iter().map(ForecastEntry::try_from).collect()
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    #[test]
    fn city_and_coordinate_queries_use_different_params() {
        let provider = OpenWeatherProvider::new("KEY".into());

        let city = provider.query_params(&Query::City("Dushanbe".into()), Units::Metric);
        assert_eq!(
            city,
            vec![
                ("q", "Dushanbe".to_string()),
                ("appid", "KEY".to_string()),
                ("units", "metric".to_string()),
            ]
        );

        let coords = provider
            .query_params(&Query::Coords(Coordinates::new(38.5, 68.75)), Units::Imperial);
        assert_eq!(coords[0], ("lat", "38.5".to_string()));
        assert_eq!(coords[1], ("lon", "68.75".to_string()));
        assert_eq!(coords[3], ("units", "imperial".to_string()));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = OpenWeatherProvider::with_base_url("KEY".into(), "http://x/".into());
        assert_eq!(provider.base_url, "http://x");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "ж".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn empty_weather_list_is_malformed() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "X", "dt": 0,
            "sys": {}, "main": {"temp": 1.0}, "weather": [], "wind": {"speed": 0.0}
        }))
        .unwrap();

        let err = WeatherSnapshot::try_from(parsed).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
