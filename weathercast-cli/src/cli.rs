use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::Password;
use std::sync::Arc;
use weathercast_core::{
    Config, Coordinate, FileLastPlaceStore, LocationNotice, LocationProvider, Outcome,
    PlaceQuery, WeatherCoordinator, provider_from_config,
};

use crate::{
    device::{CliLocation, parse_coordinate},
    render::render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathercast", version, about = "Weather for a place or your location")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show weather for a place; without one, the last searched place or your location.
    Show {
        /// City, state, or country code.
        place: Option<String>,
    },

    /// Show weather for your current location.
    Here {
        /// Position to report as the device location, e.g. "45.81,15.98".
        #[arg(long, value_parser = parse_coordinate)]
        at: Option<Coordinate>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { place: Some(place) } => {
                if place.trim().is_empty() {
                    bail!("Enter a city, state, or country code.");
                }
                show(PlaceQuery::ByText(place), None).await
            }
            Command::Show { place: None } => show_startup().await,
            Command::Here { at } => show(PlaceQuery::DeviceLocation, at).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.api_key()?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn coordinator(fix: Option<Coordinate>) -> anyhow::Result<WeatherCoordinator> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let store = Arc::new(FileLastPlaceStore::default_location()?);
    tracing::debug!(path = %store.path().display(), "using state file");
    let location = LocationProvider::new(Arc::new(CliLocation::new(fix)));

    Ok(WeatherCoordinator::new(provider, location, store))
}

async fn show_startup() -> anyhow::Result<()> {
    let coordinator = coordinator(None)?;
    let mut notices = coordinator.permission_notices();
    let outcome = coordinator.start().await;
    report(&coordinator, &mut notices, outcome)
}

async fn show(query: PlaceQuery, fix: Option<Coordinate>) -> anyhow::Result<()> {
    let coordinator = coordinator(fix)?;
    let mut notices = coordinator.permission_notices();
    let outcome = coordinator.resolve_and_fetch(query).await;
    report(&coordinator, &mut notices, outcome)
}

fn report(
    coordinator: &WeatherCoordinator,
    notices: &mut tokio::sync::broadcast::Receiver<LocationNotice>,
    outcome: Outcome,
) -> anyhow::Result<()> {
    while let Ok(notice) = notices.try_recv() {
        match notice {
            LocationNotice::PermissionDenied => eprintln!(
                "Location access is off; showing San Francisco. \
                 Pass --at LAT,LON to use a position."
            ),
        }
    }

    match outcome {
        Outcome::Committed => {
            print!("{}", render(&coordinator.state()));
            Ok(())
        }
        Outcome::Failed(e) => bail!("{}\n({e})", e.user_message()),
        Outcome::Superseded => Ok(()),
    }
}
