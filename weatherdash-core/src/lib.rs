//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Persisted user preferences (theme, units, favorites)
//! - The OpenWeather provider and the two-call fetch cycle
//! - Startup location resolution
//! - The dashboard controller and its text renderer
//!
//! It is used by `weatherdash-cli`, but the controller has no terminal
//! dependencies and can sit behind any other front end.

pub mod config;
pub mod dashboard;
pub mod fetcher;
pub mod location;
pub mod model;
pub mod preferences;
pub mod provider;
pub mod storage;
pub mod view;

pub use config::Config;
pub use dashboard::{AppState, Dashboard, FetchPhase, Notice, NoticeLevel};
pub use fetcher::WeatherFetcher;
pub use location::{FixedGeolocator, Geolocator, IpGeolocator, NoGeolocator};
pub use model::{
    ConditionClass, Coordinates, Favorite, ForecastEntry, Query, Theme, Units, WeatherReport,
    WeatherSnapshot,
};
pub use preferences::{Preferences, PreferencesStore};
pub use provider::{FetchError, WeatherProvider, provider_from_config};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use view::{View, render};
