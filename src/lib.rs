pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod resilience;

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use app::{
    aggregate::{AggregatePlan, Aggregator, BinsPlan, TrainsPlan, WeatherPlan, WeatherSource},
    location::{FixedLocation, LocationResolver, LocationSource, LocationStore},
    settings::{config_dir, load_runtime_settings, save_runtime_settings, settings_path},
};
use chrono::Local;
use cli::{Cli, SectionArg};
use data::{
    bins::BinsClient, football::FootballClient, geoip::GeoIpClient, http::HttpFetcher,
    trains::TrainsClient, weather::WeatherClient,
};
use domain::location::Location;
use tracing::info;

/// One aggregation pass: resolve settings, fetch every enabled section and
/// print the dashboard snapshot as JSON on stdout.
pub async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    let dir = if cli.no_disk { None } else { config_dir(&cli) };

    if cli.save_settings {
        let dir = dir
            .as_deref()
            .context("no config directory: set --config-dir or HOME")?;
        let settings = load_runtime_settings(&cli, Some(dir));
        save_runtime_settings(&settings_path(dir), &settings)?;
        info!(path = %settings_path(dir).display(), "settings_saved");
    }

    let aggregator = build_aggregator(&cli, dir.as_deref());
    let dashboard = aggregator.aggregate(Local::now()).await;

    let payload = if cli.pretty {
        serde_json::to_string_pretty(&dashboard)
    } else {
        serde_json::to_string(&dashboard)
    }
    .context("serializing dashboard failed")?;
    println!("{payload}");
    Ok(())
}

/// Wires clients and plans for one pass. Settings come from `dir` (when given)
/// overlaid by the CLI; `dir` also holds the location cache.
pub fn build_aggregator(cli: &Cli, dir: Option<&Path>) -> Aggregator<LocationSource> {
    let settings = load_runtime_settings(cli, dir);
    let http = HttpFetcher::new(Duration::from_secs(cli.timeout_secs));
    let bins_http = http.with_timeout(Duration::from_secs(cli.bins_timeout_secs));

    let location_source = match cli.fixed_coordinates() {
        Some((lat, lon)) => LocationSource::Fixed(FixedLocation(Location::from_coords(lat, lon))),
        None => LocationSource::GeoIp(GeoIpClient::new(http.clone(), cli.geoip_url.clone())),
    };
    let store = dir.map_or_else(LocationStore::disabled, LocationStore::in_dir);

    Aggregator {
        football: cli.wants(SectionArg::Football).then(|| {
            FootballClient::new(
                http.clone(),
                cli.football_url.clone(),
                settings.device_id.clone(),
            )
        }),
        trains: cli
            .wants(SectionArg::Trains)
            .then(|| TrainsClient::new(http.clone(), cli.trains_url.clone())),
        weather: cli.wants(SectionArg::Weather).then(|| WeatherSource {
            client: WeatherClient::new(
                http.clone(),
                cli.weather_url.clone(),
                cli.weather_key.clone(),
            ),
            resolver: LocationResolver::new(location_source, store),
        }),
        bins: cli
            .wants(SectionArg::Bins)
            .then(|| BinsClient::new(bins_http, cli.bins_url.clone())),
        plan: AggregatePlan {
            max_matches: cli.max_matches,
            trains: TrainsPlan {
                from: settings.from_station.clone(),
                to: settings.to_station.clone(),
                max_trains: cli.max_trains,
                reverse_after: cli.reverse_after,
            },
            weather: WeatherPlan {
                max_hours: cli.max_hours,
                max_days: cli.max_days,
                location_retries: cli.location_retries,
            },
            bins: BinsPlan {
                bin_id: settings.bin_id.clone(),
                interests: settings.bins_of_interest.clone(),
            },
        },
    }
}
