use crate::{
    model::{Favorite, Theme, Units},
    storage::{KEY_DARK_MODE, KEY_FAVORITES, KEY_UNIT, KeyValueStore},
};

/// The user's persisted settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preferences {
    pub theme: Theme,
    pub unit: Units,
    pub favorites: Vec<Favorite>,
}

impl Preferences {
    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.iter().any(|f| f.id == id)
    }
}

/// Remove the favorite with the same id if present, otherwise append it.
/// Returns `true` when the entry was added.
pub fn toggle_favorite(favorites: &mut Vec<Favorite>, entry: Favorite) -> bool {
    if let Some(pos) = favorites.iter().position(|f| f.id == entry.id) {
        favorites.remove(pos);
        false
    } else {
        favorites.push(entry);
        true
    }
}

/// Owns the in-memory preferences and mirrors every change into `S`.
#[derive(Debug)]
pub struct PreferencesStore<S> {
    prefs: Preferences,
    storage: S,
}

impl<S: KeyValueStore> PreferencesStore<S> {
    /// Hydrate from storage. Missing or invalid values fall back to defaults.
    pub fn load(storage: S) -> Self {
        let theme = Theme::from_dark_flag(storage.get(KEY_DARK_MODE).as_deref() == Some("true"));

        let unit = match storage.get(KEY_UNIT) {
            Some(raw) => Units::try_from(raw.as_str()).unwrap_or_else(|err| {
                tracing::debug!("Ignoring stored unit: {err}");
                Units::default()
            }),
            None => Units::default(),
        };

        let favorites = match storage.get(KEY_FAVORITES) {
            Some(raw) => parse_favorites(&raw),
            None => Vec::new(),
        };

        tracing::debug!(
            dark = theme.is_dark(),
            unit = %unit,
            favorites = favorites.len(),
            "loaded preferences"
        );

        Self {
            prefs: Preferences { theme, unit, favorites },
            storage,
        }
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.prefs.theme = theme;
        self.storage.set(KEY_DARK_MODE, if theme.is_dark() { "true" } else { "false" });
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let next = self.prefs.theme.toggled();
        self.set_theme(next);
        next
    }

    pub fn set_unit(&mut self, unit: Units) {
        self.prefs.unit = unit;
        self.storage.set(KEY_UNIT, unit.as_str());
    }

    /// See [`toggle_favorite`]. The whole list is persisted afterwards.
    pub fn toggle_favorite(&mut self, entry: Favorite) -> bool {
        let added = toggle_favorite(&mut self.prefs.favorites, entry);
        self.persist_favorites();
        added
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.prefs.is_favorite(id)
    }

    pub fn favorite(&self, id: u64) -> Option<&Favorite> {
        self.prefs.favorites.iter().find(|f| f.id == id)
    }

    fn persist_favorites(&mut self) {
        match serde_json::to_string(&self.prefs.favorites) {
            Ok(json) => self.storage.set(KEY_FAVORITES, &json),
            Err(err) => tracing::warn!("Failed to serialize favorites: {err}"),
        }
    }
}

/// Corrupt data is treated as an empty list. Duplicate ids keep the first entry.
fn parse_favorites(raw: &str) -> Vec<Favorite> {
    let parsed: Vec<Favorite> = match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(err) => {
            tracing::debug!("Ignoring stored favorites: {err}");
            return Vec::new();
        }
    };

    let mut favorites: Vec<Favorite> = Vec::with_capacity(parsed.len());
    for fav in parsed {
        if !favorites.iter().any(|f| f.id == fav.id) {
            favorites.push(fav);
        }
    }
    favorites
}
