#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use chrono::NaiveTime;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::data::geoip::GEOIP_URL;

pub const FOOTBALL_URL: &str = "https://football-scores-api.fly.dev";
pub const TRAINS_URL: &str = "https://train-track-api.fly.dev";
pub const WEATHER_URL: &str = "https://api.weatherapi.com";
pub const BINS_URL: &str = "https://waste-collection.fly.dev";

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionArg {
    Football,
    Trains,
    Weather,
    Bins,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "widget-feeds",
    version,
    about = "Aggregate football, train, weather and bin feeds into one dashboard snapshot"
)]
pub struct Cli {
    /// Sections to aggregate
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [SectionArg::Football, SectionArg::Trains, SectionArg::Weather, SectionArg::Bins]
    )]
    pub sections: Vec<SectionArg>,

    /// Football API base URL
    #[arg(long, default_value = FOOTBALL_URL)]
    pub football_url: String,

    /// Device id for per-user fixtures
    #[arg(long)]
    pub device_id: Option<String>,

    /// Maximum merged matches
    #[arg(long, default_value_t = 13)]
    pub max_matches: usize,

    /// Train departures API base URL
    #[arg(long, default_value = TRAINS_URL)]
    pub trains_url: String,

    /// Origin station CRS code
    #[arg(long)]
    pub from_station: Option<String>,

    /// Destination station CRS code
    #[arg(long)]
    pub to_station: Option<String>,

    /// Maximum departures per direction
    #[arg(long, default_value_t = 3)]
    pub max_trains: usize,

    /// Show only the return leg from this local time (HH:MM)
    #[arg(long, value_parser = parse_hh_mm)]
    pub reverse_after: Option<NaiveTime>,

    /// Forecast API base URL
    #[arg(long, default_value = WEATHER_URL)]
    pub weather_url: String,

    /// Forecast API key
    #[arg(long, env = "WIDGET_FEEDS_WEATHER_KEY", hide_env_values = true)]
    pub weather_key: Option<String>,

    /// Hourly forecast slots
    #[arg(long, default_value_t = 4)]
    pub max_hours: usize,

    /// Daily forecast slots after today
    #[arg(long, default_value_t = 4)]
    pub max_days: usize,

    /// Direct latitude (requires --lon)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Direct longitude (requires --lat)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// IP geolocation endpoint
    #[arg(long, default_value = GEOIP_URL)]
    pub geoip_url: String,

    /// Extra location attempts after the first failure
    #[arg(long, default_value_t = 3)]
    pub location_retries: u32,

    /// Bin collection API base URL
    #[arg(long, default_value = BINS_URL)]
    pub bins_url: String,

    /// Property id for bin collections
    #[arg(long)]
    pub bin_id: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=120))]
    pub timeout_secs: u64,

    /// Request timeout for the bins feed in seconds
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..=120))]
    pub bins_timeout_secs: u64,

    /// Settings and location cache directory
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Do not read or write settings and the location cache
    #[arg(long)]
    pub no_disk: bool,

    /// Persist the effective settings to the config directory
    #[arg(long, conflicts_with = "no_disk")]
    pub save_settings: bool,

    /// Pretty-print the snapshot
    #[arg(long)]
    pub pretty: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        match (self.lat, self.lon) {
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("--lat and --lon must be provided together")
            }
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn wants(&self, section: SectionArg) -> bool {
        self.sections.contains(&section)
    }

    #[must_use]
    pub fn fixed_coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

fn parse_hh_mm(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| format!("expected HH:MM, got {value:?}"))
}
