use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::{
    app::location::LocationOutcome,
    cache::assets::Asset,
    domain::{
        bins::ClassifiedCollection,
        forecast::{RainTag, TemperatureBand},
        merge::Origin,
        time::{DateBucket, OrderingKey},
        transit::ClassifiedDeparture,
    },
    error::Section,
};

pub const FOOTBALL_PLACEHOLDER: &str = "No matches found";
pub const TRAINS_PLACEHOLDER: &str = "No trains found";
pub const WEATHER_PLACEHOLDER: &str = "Weather unavailable";
pub const BINS_PLACEHOLDER: &str = "No collection found";

/// Everything one aggregation pass hands to the renderer. Disabled sections
/// are left out.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub football: Option<Section<FootballView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trains: Option<Section<TrainsView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Section<WeatherView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<Section<ClassifiedCollection>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FootballView {
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub id: String,
    pub origin: Origin,
    pub label: String,
    /// First match under its label; the renderer draws a header above it.
    pub starts_group: bool,
    pub bucket: DateBucket,
    pub sort_key: OrderingKey,
    pub time: Option<String>,
    pub channel: Option<String>,
    pub home: SideView,
    pub away: SideView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SideView {
    pub name: String,
    pub display_name: String,
    pub score: Option<i64>,
    pub logo: Asset,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainsView {
    pub boards: Vec<BoardView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub from: String,
    pub to: String,
    pub station_label: String,
    pub departures: Vec<ClassifiedDeparture>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherView {
    pub location: LocationOutcome,
    pub hourly: Vec<SlotView>,
    pub daily: Vec<SlotView>,
}

/// One forecast column, hourly ("14:00") or daily ("Tue").
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub icon: Option<Asset>,
    pub temp_c: Option<f32>,
    /// Daytime high; daily slots only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temp_c: Option<f32>,
    pub band: Option<TemperatureBand>,
    pub chance_of_rain: Option<f32>,
    pub precip_mm: Option<f32>,
    pub rain: RainTag,
}
