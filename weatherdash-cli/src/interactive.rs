use anyhow::Result;
use inquire::{
    InquireError, Select, Text,
    ui::{Color, RenderConfig, Styled},
};
use std::fmt;
use weatherdash_core::{
    Dashboard, Geolocator, KeyValueStore, NoticeLevel, Theme, Units, render,
    view::{LOADING, star},
};

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Search,
    Refresh,
    ToggleFavorite { filled: bool },
    OpenFavorite { id: u64, name: String },
    ToggleUnit(Units),
    ToggleTheme(Theme),
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("Search city"),
            Action::Refresh => f.write_str("Refresh"),
            Action::ToggleFavorite { filled } => {
                write!(f, "{} Toggle favorite", star(*filled))
            }
            Action::OpenFavorite { name, .. } => write!(f, "Go to {name}"),
            Action::ToggleUnit(next) => write!(f, "Switch to {}", next.temperature_label()),
            Action::ToggleTheme(next) => write!(f, "Switch to {}", next.label()),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

impl Action {
    fn fetches(&self) -> bool {
        matches!(
            self,
            Action::Refresh | Action::OpenFavorite { .. } | Action::ToggleUnit(_)
        )
    }
}

/// Menu entries for the current state; the favorite star is only offered
/// while a location is displayed.
fn actions<S: KeyValueStore>(dash: &Dashboard<S>) -> Vec<Action> {
    let prefs = dash.preferences();
    let mut actions = vec![Action::Search, Action::Refresh];

    if let Some(filled) = dash.view().is_favorite() {
        actions.push(Action::ToggleFavorite { filled });
    }
    actions.extend(
        prefs
            .favorites
            .iter()
            .map(|f| Action::OpenFavorite { id: f.id, name: f.name.clone() }),
    );
    actions.push(Action::ToggleUnit(prefs.unit.toggled()));
    actions.push(Action::ToggleTheme(prefs.theme.toggled()));
    actions.push(Action::Quit);
    actions
}

fn render_config(theme: Theme) -> RenderConfig<'static> {
    match theme {
        Theme::Light => RenderConfig::default(),
        Theme::Dark => RenderConfig::default()
            .with_prompt_prefix(Styled::new("»").with_fg(Color::LightCyan))
            .with_highlighted_option_prefix(Styled::new("➤").with_fg(Color::LightYellow)),
    }
}

fn apply_theme(theme: Theme) {
    inquire::set_global_render_config(render_config(theme));
}

pub fn print_notices<S: KeyValueStore>(dash: &mut Dashboard<S>) {
    for notice in dash.take_notices() {
        match notice.level {
            NoticeLevel::Warning => eprintln!("! {}", notice.message),
            NoticeLevel::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

fn draw<S: KeyValueStore>(dash: &mut Dashboard<S>) {
    println!();
    print_notices(dash);
    print!("{}", render(&dash.view()));
    println!();
}

/// Ctrl-C / Esc at the menu quits; at a sub-prompt it just goes back.
fn cancelled(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

pub async fn run<S: KeyValueStore>(mut dash: Dashboard<S>, geo: &dyn Geolocator) -> Result<()> {
    apply_theme(dash.preferences().theme);

    println!("{LOADING}");
    dash.start(geo).await;

    loop {
        draw(&mut dash);

        let action = match Select::new("What next?", actions(&dash)).prompt() {
            Ok(action) => action,
            Err(err) if cancelled(&err) => break,
            Err(err) => return Err(err.into()),
        };

        if action.fetches() {
            println!("{LOADING}");
        }

        match action {
            Action::Search => {
                let city = match Text::new("City:").with_initial_value(&dash.state().city).prompt()
                {
                    Ok(city) => city,
                    Err(err) if cancelled(&err) => continue,
                    Err(err) => return Err(err.into()),
                };
                println!("{LOADING}");
                dash.search(&city).await;
            }
            Action::Refresh => dash.refresh().await,
            Action::ToggleFavorite { .. } => {
                dash.toggle_favorite();
            }
            Action::OpenFavorite { id, .. } => {
                dash.open_favorite(id).await;
            }
            Action::ToggleUnit(next) => dash.set_unit(next).await,
            Action::ToggleTheme(_) => apply_theme(dash.toggle_theme()),
            Action::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherdash_core::{
        MemoryStore, provider::openweather::OpenWeatherProvider, storage::KEY_FAVORITES,
    };

    fn dashboard(favorites: &str) -> Dashboard<MemoryStore> {
        let storage = MemoryStore::with_entries([(KEY_FAVORITES, favorites)]);
        let provider = OpenWeatherProvider::new("KEY".into());
        Dashboard::new(Box::new(provider), storage, "Dushanbe")
    }

    #[test]
    fn star_is_hidden_without_snapshot() {
        let dash = dashboard("[]");
        let menu = actions(&dash);

        assert!(!menu.iter().any(|a| matches!(a, Action::ToggleFavorite { .. })));
        assert_eq!(menu.first(), Some(&Action::Search));
        assert_eq!(menu.last(), Some(&Action::Quit));
    }

    #[test]
    fn favorites_become_shortcuts_and_toggles_show_targets() {
        let dash = dashboard(r#"[{"id":1,"name":"Paris"},{"id":2,"name":"Oslo"}]"#);
        let menu = actions(&dash);
        let labels: Vec<String> = menu.iter().map(ToString::to_string).collect();

        assert!(labels.contains(&"Go to Paris".to_string()));
        assert!(labels.contains(&"Go to Oslo".to_string()));
        assert!(labels.contains(&"Switch to °F".to_string()));
        assert!(labels.contains(&"Switch to Dark Mode".to_string()));
        assert_eq!(menu.iter().filter(|a| a.fetches()).count(), 4);
    }
}
