//! Pure rendering of dashboard state to text.

use chrono::Local;
use std::fmt::Write;

use crate::{
    model::{ConditionClass, ForecastEntry, WeatherSnapshot},
    preferences::Preferences,
};

pub const NO_DATA: &str = "No data available";
pub const LOADING: &str = "Loading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Sunny,
    Cloudy,
    Rain,
    Snow,
}

impl Icon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sunny => "☀",
            Icon::Cloudy => "☁",
            Icon::Rain => "☂",
            Icon::Snow => "❄",
        }
    }
}

/// Unmapped classes get the sunny icon.
pub fn icon_for(condition: ConditionClass) -> Icon {
    match condition {
        ConditionClass::Clouds => Icon::Cloudy,
        ConditionClass::Rain => Icon::Rain,
        ConditionClass::Snow => Icon::Snow,
        ConditionClass::Clear | ConditionClass::Other => Icon::Sunny,
    }
}

/// Everything the renderer may look at.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub preferences: &'a Preferences,
    pub city: &'a str,
    pub snapshot: Option<&'a WeatherSnapshot>,
    pub forecast: &'a [ForecastEntry],
    pub loading: bool,
}

impl View<'_> {
    /// Star state for the displayed location; `None` when nothing is shown.
    pub fn is_favorite(&self) -> Option<bool> {
        self.snapshot.map(|s| self.preferences.is_favorite(s.location_id))
    }
}

pub fn star(filled: bool) -> &'static str {
    if filled { "★" } else { "☆" }
}

pub fn render(view: &View<'_>) -> String {
    let prefs = view.preferences;
    let unit = prefs.unit;
    let mut out = String::new();

    let _ = writeln!(out, "{}  [{}]", prefs.theme.label(), unit.temperature_label());
    let _ = writeln!(out, "City: {}", view.city);
    out.push('\n');

    match (view.loading, view.snapshot) {
        (true, _) => {
            let _ = writeln!(out, "{LOADING}");
        }
        (false, None) => {
            let _ = writeln!(out, "{NO_DATA}");
        }
        (false, Some(snap)) => {
            let filled = prefs.is_favorite(snap.location_id);
            let _ = writeln!(
                out,
                "{}, {} {}",
                snap.location_name,
                snap.country_code,
                star(filled)
            );
            let _ = writeln!(out, "{}  {}", icon_for(snap.condition).glyph(), snap.description);
            let _ = writeln!(
                out,
                "Temperature: {}{}  (feels like {}{})",
                snap.temperature,
                unit.temperature_label(),
                snap.feels_like,
                unit.temperature_label()
            );
            let _ = writeln!(out, "Humidity: {}%", snap.humidity);
            let _ = writeln!(out, "Wind: {} {}", snap.wind_speed, unit.speed_label());

            if !view.forecast.is_empty() {
                out.push('\n');
                let _ = writeln!(out, "5-day forecast");
                for entry in view.forecast {
                    let _ = writeln!(
                        out,
                        "  {}  {}  {:<20} {}{}",
                        entry.timestamp.with_timezone(&Local).format("%Y-%m-%d"),
                        icon_for(entry.condition).glyph(),
                        entry.description,
                        entry.temperature,
                        unit.temperature_label()
                    );
                }
            }
        }
    }

    if !prefs.favorites.is_empty() {
        out.push('\n');
        let names: Vec<String> = prefs.favorites.iter().map(|f| format!("[{}]", f.name)).collect();
        let _ = writeln!(out, "Favorites: {}", names.join(" "));
    }

    out
}
