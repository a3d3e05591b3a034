//! Dashboard state and the command handlers that keep it in sync with the
//! persisted preferences and the remote provider.
//!
//! Every user intent is an explicit method. Handlers that need fresh data
//! call the fetcher directly; nothing is re-fetched implicitly.
//!
//! Handlers take `&mut self`, so fetch cycles never overlap. A front end
//! that wants to keep accepting input while a fetch is in flight must drive
//! the dashboard from one task and accept that the last completed fetch
//! wins.

use crate::{
    fetcher::WeatherFetcher,
    location::{Geolocator, resolve_initial_location},
    model::{ForecastEntry, Query, Theme, Units, WeatherReport, WeatherSnapshot},
    preferences::{Preferences, PreferencesStore},
    provider::{FetchError, WeatherProvider},
    storage::KeyValueStore,
    view::View,
};

pub const CITY_FETCH_FAILED: &str = "City not found or network error.";
pub const COORDS_FETCH_FAILED: &str = "Could not load weather for your location.";
pub const EMPTY_CITY: &str = "Enter a city name first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A transient, non-blocking message. Each notice is handed out once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Contents of the search field; also the target of unit-change refetches.
    pub city: String,
    pub snapshot: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastEntry>,
    pub phase: FetchPhase,
    notices: Vec<Notice>,
}

impl AppState {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into(), ..Self::default() }
    }

    pub fn loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    fn begin_fetch(&mut self) {
        self.phase = FetchPhase::Loading;
    }

    fn apply(&mut self, query: &Query, result: Result<WeatherReport, FetchError>) {
        match result {
            Ok(report) => {
                if matches!(query, Query::Coords(_)) {
                    self.city = report.snapshot.location_name.clone();
                }
                self.snapshot = Some(report.snapshot);
                self.forecast = report.forecast;
                self.phase = FetchPhase::Loaded;
            }
            Err(err) => {
                tracing::warn!("Fetch for {query} failed: {err}");
                self.snapshot = None;
                self.forecast.clear();
                self.phase = FetchPhase::Failed;
                self.notices.push(Notice::error(match query {
                    Query::City(_) => CITY_FETCH_FAILED,
                    Query::Coords(_) => COORDS_FETCH_FAILED,
                }));
            }
        }
    }
}

#[derive(Debug)]
pub struct Dashboard<S> {
    fetcher: WeatherFetcher,
    prefs: PreferencesStore<S>,
    state: AppState,
}

impl<S: KeyValueStore> Dashboard<S> {
    pub fn new(provider: Box<dyn WeatherProvider>, storage: S, default_city: &str) -> Self {
        Self {
            fetcher: WeatherFetcher::new(provider),
            prefs: PreferencesStore::load(storage),
            state: AppState::new(default_city),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn preferences(&self) -> &Preferences {
        self.prefs.get()
    }

    pub fn storage(&self) -> &S {
        self.prefs.storage()
    }

    pub fn view(&self) -> View<'_> {
        View {
            preferences: self.prefs.get(),
            city: &self.state.city,
            snapshot: self.state.snapshot.as_ref(),
            forecast: &self.state.forecast,
            loading: self.state.loading(),
        }
    }

    /// Drain pending notices; each one is returned exactly once.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.state.notices)
    }

    /// Startup: locate the user, or fall back to the current city silently.
    pub async fn start(&mut self, geo: &dyn Geolocator) {
        let query = resolve_initial_location(geo, &self.state.city).await;
        self.fetch(query).await;
    }

    /// Edit the search field without fetching. Blank input leaves the
    /// field as it was, so unit changes always have a city to refetch.
    pub fn set_city(&mut self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() {
            return false;
        }
        self.state.city = city.to_string();
        true
    }

    /// Blank input only raises a warning; the displayed data stays.
    pub async fn search(&mut self, city: &str) {
        if !self.set_city(city) {
            self.state.notices.push(Notice::warning(EMPTY_CITY));
            return;
        }
        self.refresh().await;
    }

    /// Fetch the city currently in the search field. An empty field only
    /// raises a warning.
    pub async fn refresh(&mut self) {
        if self.state.city.is_empty() {
            self.state.notices.push(Notice::warning(EMPTY_CITY));
            return;
        }
        let query = Query::City(self.state.city.clone());
        self.fetch(query).await;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.prefs.toggle_theme()
    }

    /// Persist the unit and, if it changed, re-fetch once in the new unit.
    pub async fn set_unit(&mut self, unit: Units) {
        if self.prefs.get().unit == unit {
            return;
        }
        self.prefs.set_unit(unit);
        tracing::info!(%unit, "unit changed; refetching");
        self.refresh().await;
    }

    pub async fn toggle_unit(&mut self) -> Units {
        let next = self.prefs.get().unit.toggled();
        self.set_unit(next).await;
        next
    }

    /// Star or unstar the displayed location. Returns `None` when nothing is
    /// displayed, otherwise whether the location is now a favorite.
    pub fn toggle_favorite(&mut self) -> Option<bool> {
        let entry = self.state.snapshot.as_ref()?.as_favorite();
        let added = self.prefs.toggle_favorite(entry);
        Some(added)
    }

    /// Jump to a saved city. Unknown ids are ignored.
    pub async fn open_favorite(&mut self, id: u64) -> bool {
        let Some(name) = self.prefs.favorite(id).map(|f| f.name.clone()) else {
            tracing::debug!(id, "no favorite with this id");
            return false;
        };
        self.search(&name).await;
        true
    }

    async fn fetch(&mut self, query: Query) {
        self.state.begin_fetch();
        let units = self.prefs.get().unit;
        let result = self.fetcher.fetch(&query, units).await;
        self.state.apply(&query, result);
    }
}
