use serde::Deserialize;
use tracing::warn;

use crate::{
    cache::assets::Asset,
    data::http::{HttpFetcher, endpoint},
    domain::{
        forecast::{DailySlot, Forecast, HourlySlot, icon_url},
        location::Location,
        time::{parse_date, parse_slot_time},
    },
    error::FeedError,
};

const SOURCE: &str = "forecast";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: Option<ForecastBlock>,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: DaySummary,
    #[serde(default)]
    hour: Vec<HourEntry>,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    maxtemp_c: Option<f32>,
    avgtemp_c: Option<f32>,
    daily_chance_of_rain: Option<f32>,
    totalprecip_mm: Option<f32>,
    condition: Option<Condition>,
}

#[derive(Debug, Deserialize)]
struct HourEntry {
    time: String,
    time_epoch: Option<i64>,
    temp_c: Option<f32>,
    chance_of_rain: Option<f32>,
    precip_mm: Option<f32>,
    condition: Option<Condition>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Forecast for `days` days starting today, hourly and daily.
    pub async fn forecast(&self, location: &Location, days: usize) -> Result<Forecast, FeedError> {
        let url = endpoint(SOURCE, &self.base_url, &["v1", "forecast.json"])?;
        let mut query = vec![("q", location.query()), ("days", days.to_string())];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key.to_string()));
        }
        let payload: ForecastResponse = self.http.get_json(SOURCE, &url, &query).await?;
        let forecast_days = payload
            .forecast
            .map(|block| block.forecastday)
            .unwrap_or_default();
        if forecast_days.first().is_none_or(|day| day.hour.is_empty()) {
            return Err(FeedError::no_data(SOURCE));
        }
        Ok(Forecast {
            hourly: parse_hourly(&forecast_days),
            daily: parse_daily(&forecast_days),
        })
    }

    /// Fetch function for forecast icons; the key is the resolved https URL.
    pub async fn icon(&self, url: String) -> Result<Option<Asset>, FeedError> {
        if url.is_empty() {
            return Ok(None);
        }
        let bytes = self.http.get_bytes("forecast_icon", &url).await?;
        Ok(Some(Asset::fetched(url, bytes)))
    }
}

fn condition_icon(condition: Option<&Condition>) -> Option<String> {
    condition
        .and_then(|c| c.icon.as_deref())
        .filter(|icon| !icon.is_empty())
        .map(icon_url)
}

/// Hours from every forecast day, in feed order.
fn parse_hourly(days: &[ForecastDay]) -> Vec<HourlySlot> {
    let mut out = Vec::new();
    for entry in days.iter().flat_map(|day| day.hour.iter()) {
        let (Some(time), Some(epoch)) = (parse_slot_time(&entry.time), entry.time_epoch) else {
            warn!(time = %entry.time, "hourly_slot_skipped");
            continue;
        };
        out.push(HourlySlot {
            time,
            epoch,
            icon: condition_icon(entry.condition.as_ref()),
            temp_c: entry.temp_c,
            chance_of_rain: entry.chance_of_rain,
            precip_mm: entry.precip_mm,
        });
    }
    out
}

fn parse_daily(days: &[ForecastDay]) -> Vec<DailySlot> {
    let mut out = Vec::new();
    for day in days {
        let Some(date) = parse_date(&day.date) else {
            warn!(date = %day.date, "daily_slot_skipped");
            continue;
        };
        out.push(DailySlot {
            date,
            icon: condition_icon(day.day.condition.as_ref()),
            max_temp_c: day.day.maxtemp_c,
            avg_temp_c: day.day.avgtemp_c,
            chance_of_rain: day.day.daily_chance_of_rain,
            precip_mm: day.day.totalprecip_mm,
        });
    }
    out
}
