use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit system passed through to the provider; conversion happens remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(self) -> Self {
        Theme::from_dark_flag(!self.is_dark())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light Mode",
            Theme::Dark => "Dark Mode",
        }
    }
}

/// A saved city shortcut. `id` is the provider-assigned location id and is
/// the only identity used for membership checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: u64,
    pub name: String,
}

impl Favorite {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Coarse condition class as reported in the provider's `weather[].main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionClass {
    Clear,
    Clouds,
    Rain,
    Snow,
    #[default]
    Other,
}

impl ConditionClass {
    pub fn from_main(main: &str) -> Self {
        match main {
            "Clear" => ConditionClass::Clear,
            "Clouds" => ConditionClass::Clouds,
            "Rain" => ConditionClass::Rain,
            "Snow" => ConditionClass::Snow,
            _ => ConditionClass::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// What a single fetch cycle asks the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coords(Coordinates),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::City(name) => write!(f, "city '{name}'"),
            Query::Coords(c) => write!(f, "coordinates ({:.4}, {:.4})", c.lat, c.lon),
        }
    }
}

/// Current conditions for one location at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location_id: u64,
    pub location_name: String,
    pub country_code: String,
    pub condition: ConditionClass,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn as_favorite(&self) -> Favorite {
        Favorite::new(self.location_id, self.location_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub condition: ConditionClass,
    pub description: String,
    pub temperature: f64,
}

/// Result of a successful fetch: both halves always arrive together.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    pub forecast: Vec<ForecastEntry>,
}
