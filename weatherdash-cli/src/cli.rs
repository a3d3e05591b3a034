use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weatherdash_core::{
    Config, Coordinates, Dashboard, FileStore, FixedGeolocator, Geolocator, IpGeolocator,
    KeyValueStore, MemoryStore, NoGeolocator, provider_from_config,
};

use crate::interactive;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Defaults to `dash`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Skip the startup geolocation lookup.
    #[arg(long, global = true)]
    pub no_geolocation: bool,

    /// Keep preferences in memory only.
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Run the interactive dashboard.
    Dash,

    /// Render the weather once and exit.
    Show {
        /// City name; if absent, the startup location is used.
        city: Option<String>,

        /// Latitude, used together with --lon.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude, used together with --lat.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Dash) {
            Command::Configure => configure(),
            Command::Dash => {
                let config = Config::load()?;
                let geo = geolocator(&self.session, &config, None)?;
                if self.session.ephemeral {
                    interactive::run(dashboard(&config, MemoryStore::new())?, geo.as_ref()).await
                } else {
                    interactive::run(dashboard(&config, FileStore::open_default()?)?, geo.as_ref())
                        .await
                }
            }
            Command::Show { city, lat, lon } => {
                let config = Config::load()?;
                let coords = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let geo = geolocator(&self.session, &config, coords)?;
                if self.session.ephemeral {
                    show(dashboard(&config, MemoryStore::new())?, geo.as_ref(), city).await
                } else {
                    show(dashboard(&config, FileStore::open_default()?)?, geo.as_ref(), city).await
                }
            }
        }
    }
}

fn dashboard<S: KeyValueStore>(config: &Config, storage: S) -> Result<Dashboard<S>> {
    let provider = provider_from_config(config)?;
    Ok(Dashboard::new(provider, storage, &config.default_city))
}

/// Explicit coordinates win; otherwise IP lookup unless disabled.
fn geolocator(
    session: &SessionArgs,
    config: &Config,
    coords: Option<Coordinates>,
) -> Result<Box<dyn Geolocator>> {
    if let Some(coords) = coords {
        return Ok(Box::new(FixedGeolocator(coords)));
    }
    if session.no_geolocation || !config.geolocation {
        return Ok(Box::new(NoGeolocator));
    }
    let geo = IpGeolocator::new(config.endpoints.geolocation.clone())
        .context("Failed to set up geolocation client")?;
    Ok(Box::new(geo))
}

async fn show<S: KeyValueStore>(
    mut dash: Dashboard<S>,
    geo: &dyn Geolocator,
    city: Option<String>,
) -> Result<()> {
    match city {
        Some(city) => dash.search(&city).await,
        None => dash.start(geo).await,
    }

    interactive::print_notices(&mut dash);
    print!("{}", weatherdash_core::render(&dash.view()));
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()?;
    config.set_api_key(api_key.trim().to_string());

    let city = Text::new("Default city:")
        .with_initial_value(&config.default_city)
        .with_help_message("Used when your location cannot be determined")
        .prompt()?;
    config.set_default_city(&city);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["weatherdash", "--no-geolocation"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.session.no_geolocation);
    }

    #[test]
    fn show_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["weatherdash", "show", "--lat", "38.5"]).is_err());

        let cli = Cli::try_parse_from([
            "weatherdash", "show", "--lat", "38.5", "--lon", "-68.7", "--ephemeral",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Show { city, lat, lon }) => {
                assert_eq!(city, None);
                assert_eq!(lat, Some(38.5));
                assert_eq!(lon, Some(-68.7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.session.ephemeral);
    }

    #[test]
    fn explicit_coordinates_override_geolocation_settings() {
        let session = SessionArgs { no_geolocation: true, ephemeral: true };
        let geo = geolocator(&session, &Config::default(), Some(Coordinates::new(1.0, 2.0)));
        assert!(format!("{:?}", geo.unwrap()).contains("FixedGeolocator"));

        let geo = geolocator(&session, &Config::default(), None);
        assert!(format!("{:?}", geo.unwrap()).contains("NoGeolocator"));
    }
}
