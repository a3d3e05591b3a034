use crate::{
    model::{Coordinates, Query, Units, WeatherReport},
    provider::{FetchError, WeatherProvider},
};

/// The provider returns 3-hour slots; every 8th one approximates a day.
pub const FORECAST_SAMPLE_STRIDE: usize = 8;

/// Keep the entries at indices 0, 8, 16, ... in their original order.
pub fn sample_forecast<T>(entries: Vec<T>) -> Vec<T> {
    entries.into_iter().step_by(FORECAST_SAMPLE_STRIDE).collect()
}

#[derive(Debug)]
pub struct WeatherFetcher {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherFetcher {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Request current conditions and the forecast together. Both calls are
    /// allowed to settle; the fetch fails if either of them failed.
    pub async fn fetch(&self, query: &Query, units: Units) -> Result<WeatherReport, FetchError> {
        let (current, forecast) = tokio::join!(
            self.provider.current(query, units),
            self.provider.forecast(query, units),
        );

        let snapshot = current?;
        let forecast = sample_forecast(forecast?);

        tracing::info!(
            location = %snapshot.location_name,
            id = snapshot.location_id,
            forecast_days = forecast.len(),
            "fetched weather"
        );

        Ok(WeatherReport { snapshot, forecast })
    }

    pub async fn fetch_by_city(&self, name: &str, units: Units) -> Result<WeatherReport, FetchError> {
        self.fetch(&Query::City(name.to_string()), units).await
    }

    pub async fn fetch_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<WeatherReport, FetchError> {
        self.fetch(&Query::Coords(Coordinates::new(lat, lon)), units).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider shared by the fetcher and dashboard tests.

    use super::*;
    use crate::model::{ConditionClass, ForecastEntry, WeatherSnapshot};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Fail {
        Never,
        Current,
        Forecast,
        Both,
    }

    #[derive(Debug, Clone)]
    pub struct ScriptedProvider {
        pub fail: Fail,
        pub location_id: u64,
        pub location_name: String,
        pub slots: usize,
        /// Calls never complete; used to observe a fetch in flight.
        pub hold: bool,
        pub calls: Arc<Mutex<Vec<(String, Query, Units)>>>,
    }

    impl ScriptedProvider {
        pub fn new(location_id: u64, location_name: &str) -> Self {
            Self {
                fail: Fail::Never,
                location_id,
                location_name: location_name.to_string(),
                slots: 40,
                hold: false,
                calls: Arc::default(),
            }
        }

        pub fn held(location_id: u64, location_name: &str) -> Self {
            Self { hold: true, ..Self::new(location_id, location_name) }
        }

        pub fn failing(fail: Fail) -> Self {
            Self { fail, ..Self::new(1, "Nowhere") }
        }

        pub fn calls(&self) -> Vec<(String, Query, Units)> {
            self.calls.lock().unwrap().clone()
        }

        async fn record(&self, endpoint: &str, query: &Query, units: Units) {
            self.calls.lock().unwrap().push((endpoint.to_string(), query.clone(), units));
            if self.hold {
                std::future::pending::<()>().await;
            }
        }

        fn not_found(query: &Query) -> FetchError {
            FetchError::NotFound(query.to_string())
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn current(&self, query: &Query, units: Units) -> Result<WeatherSnapshot, FetchError> {
            self.record("current", query, units).await;
            if matches!(self.fail, Fail::Current | Fail::Both) {
                return Err(Self::not_found(query));
            }

            let temperature = match units {
                Units::Metric => 20.0,
                Units::Imperial => 68.0,
            };

            Ok(WeatherSnapshot {
                location_id: self.location_id,
                location_name: self.location_name.clone(),
                country_code: "TJ".to_string(),
                condition: ConditionClass::Clear,
                description: "clear sky".to_string(),
                temperature,
                feels_like: temperature,
                humidity: 40,
                wind_speed: 3.0,
                observed_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            })
        }

        async fn forecast(
            &self,
            query: &Query,
            units: Units,
        ) -> Result<Vec<ForecastEntry>, FetchError> {
            self.record("forecast", query, units).await;
            if matches!(self.fail, Fail::Forecast | Fail::Both) {
                return Err(Self::not_found(query));
            }

            Ok((0..self.slots)
                .map(|i| ForecastEntry {
                    timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + i as i64 * 10_800, 0)
                        .unwrap(),
                    condition: ConditionClass::Clouds,
                    description: format!("slot {i}"),
                    temperature: i as f64,
                })
                .collect())
        }
    }
}
