use aero_core::{
    Config, GeoFix, Geolocator, IpGeolocator, JsonFileStorage, LocationStorage, LocationStore,
    MemoryStorage, NoGeolocation, UnitSystem, WeatherClient, WeatherController,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aero-weather", version, about = "Current weather and forecast in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print JSON instead of formatted text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Keep saved locations in memory only.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key and display preferences.
    Configure,

    #[command(flatten)]
    Weather(WeatherCommand),
}

/// Commands that need the weather controller.
#[derive(Debug, Subcommand)]
pub enum WeatherCommand {
    /// Show weather. Without arguments: last used location, else your position.
    Show {
        /// Place name to look up.
        query: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true, conflicts_with = "query")]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List places matching a name.
    Search { query: String },

    /// Search interactively, choose a place, save it and show its weather.
    Pick { query: Option<String> },

    /// Detect your position and show its weather.
    Here,

    /// Re-fetch the most recently used location.
    Refresh,

    /// Manage saved locations.
    Locations {
        #[command(subcommand)]
        action: LocationsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum LocationsCommand {
    /// Print saved locations, most recent first.
    List,
    /// Forget a saved location by id.
    Remove { id: String },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let command = self.command.unwrap_or(Command::Weather(WeatherCommand::Show {
            query: None,
            lat: None,
            lon: None,
        }));

        match command {
            Command::Configure => configure(),
            Command::Weather(cmd) => run_weather(cmd, self.json, self.ephemeral).await,
        }
    }
}

async fn run_weather(command: WeatherCommand, json: bool, ephemeral: bool) -> Result<()> {
    let config = Config::load()?.with_env_overrides();
    let mut controller = build_controller(&config, ephemeral)?;
    let units = config.units;

    match command {
        WeatherCommand::Show { query: Some(query), .. } => {
            match controller.search(&query).await.into_iter().next() {
                Some(hit) => {
                    controller.select(hit).await;
                }
                None => {
                    eprintln!("No places match '{query}'.");
                    controller.startup().await;
                }
            }
            render::print_state(controller.state(), units, json)
        }
        WeatherCommand::Show { lat: Some(lat), lon: Some(lon), .. } => {
            controller.show_position(GeoFix { lat, lon, city: None, country: None }).await;
            render::print_state(controller.state(), units, json)
        }
        WeatherCommand::Show { .. } => {
            controller.startup().await;
            render::print_state(controller.state(), units, json)
        }
        WeatherCommand::Search { query } => {
            let hits = controller.search(&query).await;
            render::print_search_results(&hits, json)
        }
        WeatherCommand::Pick { query } => {
            let query = match query {
                Some(q) => q,
                None => Text::new("Search for a place:")
                    .prompt()
                    .context("Failed to read search query")?,
            };

            let hits = controller.search(&query).await;
            if hits.is_empty() {
                bail!("No places match '{query}'.");
            }

            let labels: Vec<String> = hits.iter().map(|h| h.display_name()).collect();
            let choice = Select::new("Choose a place:", labels)
                .raw_prompt()
                .context("Failed to read selection")?;

            let hit = hits[choice.index].clone();
            controller.select(hit).await;
            render::print_state(controller.state(), units, json)
        }
        WeatherCommand::Here => {
            controller.use_my_location().await;
            render::print_state(controller.state(), units, json)
        }
        WeatherCommand::Refresh => {
            controller.refresh().await;
            render::print_state(controller.state(), units, json)
        }
        WeatherCommand::Locations { action: LocationsCommand::List } => {
            render::print_locations(controller.saved_locations(), json)
        }
        WeatherCommand::Locations { action: LocationsCommand::Remove { id } } => {
            if controller.remove_location(&id) {
                println!("Removed {id}");
            } else {
                println!("No saved location with id {id}");
            }
            Ok(())
        }
    }
}

fn build_controller(config: &Config, ephemeral: bool) -> Result<WeatherController> {
    let provider = WeatherClient::from_config(config).context("Failed to create weather client")?;

    let geolocator: Box<dyn Geolocator> = if config.geolocation {
        Box::new(
            IpGeolocator::new(config.ip_geo_url.as_str(), config.geolocation_timeout())
                .context("Failed to create geolocation client")?,
        )
    } else {
        Box::new(NoGeolocation)
    };

    let storage: Box<dyn LocationStorage> = if ephemeral {
        Box::new(MemoryStorage::default())
    } else {
        Box::new(JsonFileStorage::new(Config::locations_file_path()?))
    };

    Ok(WeatherController::new(
        Box::new(provider),
        geolocator,
        LocationStore::load(storage),
        config,
    ))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = Text::new("OpenWeatherMap API key (leave empty for demo data):")
        .with_initial_value(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(key);

    let units = Select::new("Temperature units:", vec![UnitSystem::Metric, UnitSystem::Imperial])
        .with_starting_cursor(usize::from(config.units == UnitSystem::Imperial))
        .prompt()
        .context("Failed to read units")?;
    config.units = units;

    config.geolocation = Confirm::new("Detect your location from your IP address?")
        .with_default(config.geolocation)
        .prompt()
        .context("Failed to read geolocation preference")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn configure_and_weather_commands_parse_separately() {
        let cli = Cli::try_parse_from(["aero-weather", "configure"]).expect("parse");
        assert!(matches!(cli.command, Some(Command::Configure)));

        let cli = Cli::try_parse_from(["aero-weather", "--json", "refresh"]).expect("parse");
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Command::Weather(WeatherCommand::Refresh))));

        let cli = Cli::try_parse_from(["aero-weather", "show", "--lat", "-33.9", "--lon", "151.2"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Some(Command::Weather(WeatherCommand::Show { lat: Some(_), lon: Some(_), .. }))
        ));
    }
}
