#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde_json::{Value, json};
use widget_feeds::data::http::HttpFetcher;

pub const TODAY: &str = "2024-06-10";
pub const TOMORROW: &str = "2024-06-11";

/// 2024-06-10 12:00 local time.
pub fn noon() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 6, 10, 12, 0, 0)
        .single()
        .expect("unambiguous local noon")
}

pub fn reference() -> NaiveDateTime {
    noon().naive_local()
}

pub fn http() -> HttpFetcher {
    HttpFetcher::new(Duration::from_secs(5))
}

pub fn match_json(id: u64, date: &str, home: &str, away: &str, label: Option<&str>) -> Value {
    let mut value = json!({
        "id": id,
        "date": date,
        "homeTeam": { "names": { "displayName": home }, "score": 1 },
        "awayTeam": { "names": { "displayName": away }, "score": 0 },
        "kickOffTime": "15:00",
        "started": true,
        "tvInfo": { "channelInfo": { "fullName": "BBC One" } }
    });
    if let Some(label) = label {
        value["friendlyDateTime"] = json!(label);
    }
    value
}

pub fn departure_json(crs: &str, booked: &str, actual: &str, platform: Option<&str>) -> Value {
    json!({
        "locationDetail": {
            "crs": crs,
            "gbttBookedDeparture": booked,
            "realtimeDeparture": actual,
            "platform": platform,
        },
        "serviceType": "train"
    })
}

/// Two forecast days of hourly slots starting at 10:00 on the reference day,
/// with epochs anchored to `now`, plus five daily summaries.
pub fn forecast_json(now: DateTime<Local>, icon_base: &str) -> Value {
    let start = now.timestamp() - 2 * 3600;
    let hour = |i: i64| {
        let epoch = start + i * 3600;
        let time = Local
            .timestamp_opt(epoch, 0)
            .single()
            .expect("valid epoch")
            .format("%Y-%m-%d %H:%M")
            .to_string();
        json!({
            "time": time,
            "time_epoch": epoch,
            "temp_c": 10.0 + i as f64,
            "chance_of_rain": 20,
            "precip_mm": if i % 2 == 0 { 0.0 } else { 0.4 },
            "condition": { "icon": format!("{icon_base}/icons/{}.png", 100 + i % 2) }
        })
    };
    let day = |date: &str, avg: f64| {
        json!({
            "date": date,
            "day": {
                "maxtemp_c": avg + 4.0,
                "avgtemp_c": avg,
                "daily_chance_of_rain": 60,
                "totalprecip_mm": 1.5,
                "condition": { "icon": format!("{icon_base}/icons/200.png") }
            },
            "hour": []
        })
    };
    let mut first = day(TODAY, 15.0);
    first["hour"] = Value::Array((0..8).map(hour).collect());
    let mut second = day(TOMORROW, 17.0);
    second["hour"] = Value::Array((8..12).map(hour).collect());
    json!({
        "location": { "name": "Bromley" },
        "forecast": { "forecastday": [
            first,
            second,
            day("2024-06-12", 18.0),
            day("2024-06-13", 19.0),
            day("2024-06-14", 20.0)
        ]}
    })
}
