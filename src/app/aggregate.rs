use chrono::{DateTime, Local, NaiveDateTime, NaiveTime};
use futures::future::join_all;
use tracing::{info, warn};

use crate::{
    app::{
        location::{LocationProvider, LocationResolver},
        snapshot::{
            BINS_PLACEHOLDER, BoardView, Dashboard, FOOTBALL_PLACEHOLDER, FootballView, MatchView,
            SideView, SlotView, TRAINS_PLACEHOLDER, TrainsView, WEATHER_PLACEHOLDER, WeatherView,
        },
    },
    cache::assets::{Asset, AssetCache},
    data::{
        bins::BinsClient,
        football::{FootballClient, MatchFeed},
        trains::TrainsClient,
        weather::WeatherClient,
    },
    domain::{
        bins::{BinOfInterest, ClassifiedCollection, classify_collection},
        forecast::{rain_tag, temperature_band, window_daily, window_hourly},
        matches::{Match, abbreviate_channel, display_team_name},
        merge::{Merged, merge, take_capped},
        time::{bucket, ordering_key, parse_clock},
        transit::classify_departure,
    },
    error::{Feed, FeedError, Section},
};

#[derive(Debug, Clone)]
pub struct TrainsPlan {
    pub from: String,
    pub to: String,
    pub max_trains: usize,
    pub reverse_after: Option<NaiveTime>,
}

#[derive(Debug, Clone)]
pub struct WeatherPlan {
    pub max_hours: usize,
    pub max_days: usize,
    pub location_retries: u32,
}

#[derive(Debug, Clone)]
pub struct BinsPlan {
    pub bin_id: Option<String>,
    pub interests: Vec<BinOfInterest>,
}

#[derive(Debug, Clone)]
pub struct AggregatePlan {
    pub max_matches: usize,
    pub trains: TrainsPlan,
    pub weather: WeatherPlan,
    pub bins: BinsPlan,
}

#[derive(Debug)]
pub struct WeatherSource<P> {
    pub client: WeatherClient,
    pub resolver: LocationResolver<P>,
}

/// The enabled sections and their clients. `None` leaves a section out.
#[derive(Debug)]
pub struct Aggregator<P> {
    pub football: Option<FootballClient>,
    pub trains: Option<TrainsClient>,
    pub weather: Option<WeatherSource<P>>,
    pub bins: Option<BinsClient>,
    pub plan: AggregatePlan,
}

impl<P: LocationProvider> Aggregator<P> {
    /// One pass. All sections run concurrently and none can fail another.
    pub async fn aggregate(&self, now: DateTime<Local>) -> Dashboard {
        let reference = now.naive_local();

        let football = async {
            match &self.football {
                Some(client) => {
                    let feed = football_section(client, self.plan.max_matches, reference).await;
                    Some(Section::new(feed, FOOTBALL_PLACEHOLDER))
                }
                None => None,
            }
        };
        let trains = async {
            match &self.trains {
                Some(client) => {
                    let feed = trains_section(client, &self.plan.trains, reference).await;
                    Some(Section::new(feed, TRAINS_PLACEHOLDER))
                }
                None => None,
            }
        };
        let weather = async {
            match &self.weather {
                Some(source) => {
                    let feed = weather_section(source, &self.plan.weather, now).await;
                    Some(Section::new(feed, WEATHER_PLACEHOLDER))
                }
                None => None,
            }
        };
        let bins = async {
            match &self.bins {
                Some(client) => {
                    let feed = bins_section(client, &self.plan.bins, reference).await;
                    Some(Section::new(feed, BINS_PLACEHOLDER))
                }
                None => None,
            }
        };

        let (football, trains, weather, bins) = tokio::join!(football, trains, weather, bins);
        Dashboard {
            generated_at: now,
            football,
            trains,
            weather,
            bins,
        }
    }
}

/// Logs a failed feed and substitutes an empty list, remembering the first error.
fn settle<T>(
    source: &str,
    outcome: Result<Vec<T>, FeedError>,
    first_error: &mut Option<FeedError>,
) -> Vec<T> {
    match outcome {
        Ok(items) => items,
        Err(err) => {
            warn!(source, error = %err, "feed_unavailable");
            first_error.get_or_insert(err);
            Vec::new()
        }
    }
}

pub async fn football_section(
    client: &FootballClient,
    max_matches: usize,
    now: NaiveDateTime,
) -> Feed<FootballView> {
    let (results, fixtures) = tokio::join!(
        client.matches(MatchFeed::Results, max_matches),
        client.matches(MatchFeed::Fixtures, max_matches),
    );
    let mut first_error = None;
    let results = settle("results", results, &mut first_error);
    let fixtures = settle("fixtures", fixtures, &mut first_error);

    let merged = merge(&results, &fixtures, max_matches, now.date());
    if merged.is_empty() {
        return Feed::Unavailable(first_error.unwrap_or_else(|| FeedError::no_data("matches")));
    }

    let fallback = client.fallback_logo();
    let mut logos = AssetCache::new(fallback.clone());
    let teams = merged
        .iter()
        .flat_map(|entry| [entry.item.home_name(), entry.item.away_name()]);
    let resolved = logos.resolve_all(teams, |team| client.logo(team)).await;
    info!(
        matches = merged.len(),
        logo_fetches = logos.fetch_count(),
        "football_aggregated"
    );

    let logo_for = |name: &str| resolved.get(name).cloned().unwrap_or_else(|| fallback.clone());
    let starts = group_starts(merged.iter().map(|entry| entry.label.as_str()));
    let matches = merged
        .iter()
        .zip(starts)
        .map(|(entry, starts_group)| match_view(entry, starts_group, now, &logo_for))
        .collect();

    Feed::Available(FootballView { matches })
}

/// Marks each position whose label differs from the one before it.
pub fn group_starts<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<bool> {
    let mut previous: Option<&str> = None;
    labels
        .into_iter()
        .map(|label| {
            let starts = previous != Some(label);
            previous = Some(label);
            starts
        })
        .collect()
}

fn match_view(
    entry: &Merged<Match>,
    starts_group: bool,
    now: NaiveDateTime,
    logo_for: &impl Fn(&str) -> Asset,
) -> MatchView {
    let item = &entry.item;
    let kick_off = item.kick_off_time.as_deref().and_then(parse_clock);
    let side = |name: &str, score: Option<i64>| SideView {
        name: name.to_string(),
        display_name: display_team_name(name),
        score,
        logo: logo_for(name),
    };

    MatchView {
        id: item.id.clone(),
        origin: entry.origin,
        label: entry.label.clone(),
        starts_group,
        bucket: bucket(item.date, now),
        sort_key: ordering_key(item.date, kick_off, now),
        time: item.match_time().map(str::to_string),
        channel: item.channel_name().map(abbreviate_channel),
        home: side(item.home_name(), item.home_score()),
        away: side(item.away_name(), item.away_score()),
    }
}

/// Both directions by default. With a reverse-after time only one leg is
/// shown: outbound before it, return from it onwards.
pub fn journey_legs(plan: &TrainsPlan, now: NaiveTime) -> Vec<(String, String)> {
    let outbound = (plan.from.clone(), plan.to.clone());
    let inbound = (plan.to.clone(), plan.from.clone());
    match plan.reverse_after {
        None => vec![outbound, inbound],
        Some(cutoff) if now >= cutoff => vec![inbound],
        Some(_) => vec![outbound],
    }
}

pub async fn trains_section(
    client: &TrainsClient,
    plan: &TrainsPlan,
    now: NaiveDateTime,
) -> Feed<TrainsView> {
    let legs = journey_legs(plan, now.time());
    let fetched = join_all(legs.iter().map(|(from, to)| client.departures(from, to))).await;

    let mut first_error = None;
    let mut boards = Vec::new();
    for ((from, to), outcome) in legs.into_iter().zip(fetched) {
        let departures = settle("departures", outcome, &mut first_error);
        if departures.is_empty() {
            continue;
        }
        let capped = take_capped(&departures, plan.max_trains);
        let station_label = capped
            .first()
            .and_then(|d| d.location_detail.crs.clone())
            .unwrap_or_else(|| from.clone());
        boards.push(BoardView {
            departures: capped.iter().map(classify_departure).collect(),
            from,
            to,
            station_label,
        });
    }

    if boards.is_empty() {
        return Feed::Unavailable(first_error.unwrap_or_else(|| FeedError::no_data("departures")));
    }
    Feed::Available(TrainsView { boards })
}

pub async fn weather_section<P: LocationProvider>(
    source: &WeatherSource<P>,
    plan: &WeatherPlan,
    now: DateTime<Local>,
) -> Feed<WeatherView> {
    let outcome = source.resolver.resolve(plan.location_retries).await;
    let Some(location) = outcome.location().cloned() else {
        warn!("weather_skipped_no_location");
        return Feed::Unavailable(FeedError::LocationUnresolvable);
    };

    let forecast = match source.client.forecast(&location, plan.max_days + 1).await {
        Ok(forecast) => forecast,
        Err(err) => {
            warn!(source = "forecast", error = %err, "feed_unavailable");
            return Feed::Unavailable(err);
        }
    };
    let hourly = window_hourly(&forecast.hourly, plan.max_hours, now.timestamp());
    let daily = window_daily(&forecast.daily, plan.max_days, now.date_naive());

    let mut icons = AssetCache::new(Asset::fallback(String::new()));
    let urls = hourly
        .iter()
        .filter_map(|slot| slot.icon.as_deref())
        .chain(daily.iter().filter_map(|slot| slot.icon.as_deref()));
    let resolved = icons.resolve_all(urls, |url| source.client.icon(url)).await;
    let icon_for = |icon: Option<&str>| icon.and_then(|url| resolved.get(url).cloned());

    let hourly = hourly
        .iter()
        .map(|slot| SlotView {
            label: slot.time.format("%H:%M").to_string(),
            date: None,
            icon: icon_for(slot.icon.as_deref()),
            temp_c: slot.temp_c,
            max_temp_c: None,
            band: slot.temp_c.map(temperature_band),
            chance_of_rain: slot.chance_of_rain,
            precip_mm: slot.precip_mm,
            rain: rain_tag(slot.precip_mm),
        })
        .collect();
    let daily = daily
        .iter()
        .map(|slot| SlotView {
            label: slot.date.format("%a").to_string(),
            date: Some(slot.date),
            icon: icon_for(slot.icon.as_deref()),
            temp_c: slot.avg_temp_c,
            max_temp_c: slot.max_temp_c,
            band: slot.avg_temp_c.map(temperature_band),
            chance_of_rain: slot.chance_of_rain,
            precip_mm: slot.precip_mm,
            rain: rain_tag(slot.precip_mm),
        })
        .collect();

    Feed::Available(WeatherView {
        location: outcome,
        hourly,
        daily,
    })
}

pub async fn bins_section(
    client: &BinsClient,
    plan: &BinsPlan,
    now: NaiveDateTime,
) -> Feed<ClassifiedCollection> {
    let Some(bin_id) = plan.bin_id.as_deref() else {
        warn!("bins_skipped_no_bin_id");
        return Feed::Unavailable(FeedError::no_data("bins"));
    };
    match client.next_collection(bin_id).await {
        Ok(collection) => Feed::Available(classify_collection(&collection, &plan.interests, now)),
        Err(err) => {
            warn!(source = "bins", error = %err, "feed_unavailable");
            Feed::Unavailable(err)
        }
    }
}
