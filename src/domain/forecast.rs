use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Hourly slots that started up to this long ago are still shown.
pub const HOURLY_LOOK_BACK_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySlot {
    pub time: NaiveDateTime,
    pub epoch: i64,
    pub icon: Option<String>,
    pub temp_c: Option<f32>,
    pub chance_of_rain: Option<f32>,
    pub precip_mm: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySlot {
    pub date: NaiveDate,
    pub icon: Option<String>,
    pub max_temp_c: Option<f32>,
    pub avg_temp_c: Option<f32>,
    pub chance_of_rain: Option<f32>,
    pub precip_mm: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub hourly: Vec<HourlySlot>,
    pub daily: Vec<DailySlot>,
}

/// Slots at or after `reference_epoch - 1h`, in feed order, at most `max_count`.
#[must_use]
pub fn window_hourly(slots: &[HourlySlot], max_count: usize, reference_epoch: i64) -> Vec<HourlySlot> {
    let min_epoch = reference_epoch - HOURLY_LOOK_BACK_SECS;
    slots
        .iter()
        .filter(|slot| slot.epoch >= min_epoch)
        .take(max_count)
        .cloned()
        .collect()
}

/// Days strictly after `reference_date`, in feed order, at most `max_count`.
/// Today is left out because the hourly window already covers it.
#[must_use]
pub fn window_daily(slots: &[DailySlot], max_count: usize, reference_date: NaiveDate) -> Vec<DailySlot> {
    slots
        .iter()
        .filter(|slot| slot.date > reference_date)
        .take(max_count)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    Freezing,
    Cold,
    Cool,
    Mild,
    Warm,
    Hot,
    VeryHot,
    Extreme,
}

#[must_use]
pub fn temperature_band(temp_c: f32) -> TemperatureBand {
    if temp_c <= 0.0 {
        TemperatureBand::Freezing
    } else if temp_c < 8.0 {
        TemperatureBand::Cold
    } else if temp_c < 12.0 {
        TemperatureBand::Cool
    } else if temp_c < 16.0 {
        TemperatureBand::Mild
    } else if temp_c < 20.0 {
        TemperatureBand::Warm
    } else if temp_c < 25.0 {
        TemperatureBand::Hot
    } else if temp_c < 30.0 {
        TemperatureBand::VeryHot
    } else {
        TemperatureBand::Extreme
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RainTag {
    Wet,
    Dry,
}

#[must_use]
pub fn rain_tag(precip_mm: Option<f32>) -> RainTag {
    match precip_mm {
        Some(mm) if mm > 0.0 => RainTag::Wet,
        _ => RainTag::Dry,
    }
}

/// Forecast icons come protocol-relative ("//cdn.weatherapi.com/...").
#[must_use]
pub fn icon_url(raw: &str) -> String {
    if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_slot_time;

    fn hourly(time: &str, epoch: i64) -> HourlySlot {
        HourlySlot {
            time: parse_slot_time(time).expect("valid slot time"),
            epoch,
            icon: Some("//cdn.example/64x64/day/113.png".to_string()),
            temp_c: Some(14.0),
            chance_of_rain: Some(10.0),
            precip_mm: Some(0.0),
        }
    }

    fn daily(date: &str) -> DailySlot {
        DailySlot {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date"),
            icon: None,
            max_temp_c: Some(18.0),
            avg_temp_c: Some(14.0),
            chance_of_rain: Some(40.0),
            precip_mm: Some(1.2),
        }
    }

    #[test]
    fn hourly_window_keeps_current_hour_with_look_back() {
        let base = 1_718_000_000;
        let slots: Vec<_> = (0..6)
            .map(|i| hourly(&format!("2024-06-10 {:02}:00", 10 + i), base + i * 3600))
            .collect();

        // 40 minutes into the 12:00 slot.
        let now = base + 2 * 3600 + 40 * 60;
        let window = window_hourly(&slots, 3, now);

        let times: Vec<_> = window.iter().map(|s| s.epoch).collect();
        assert_eq!(times, vec![base + 3600 * 2, base + 3600 * 3, base + 3600 * 4]);
    }

    #[test]
    fn hourly_look_back_boundary_is_inclusive() {
        let slots = vec![hourly("2024-06-10 10:00", 1000), hourly("2024-06-10 11:00", 4600)];
        let window = window_hourly(&slots, 5, 1000 + HOURLY_LOOK_BACK_SECS);
        assert_eq!(window.len(), 2);
        let window = window_hourly(&slots, 5, 1001 + HOURLY_LOOK_BACK_SECS);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn daily_window_excludes_today() {
        let slots = vec![daily("2024-06-10"), daily("2024-06-11"), daily("2024-06-12")];
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date");
        let window = window_daily(&slots, 4, today);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].date, today.succ_opt().expect("next day"));
    }

    #[test]
    fn daily_window_is_capped() {
        let slots = vec![daily("2024-06-11"), daily("2024-06-12"), daily("2024-06-13")];
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date");
        assert_eq!(window_daily(&slots, 2, today).len(), 2);
    }

    #[test]
    fn temperature_band_boundaries() {
        assert_eq!(temperature_band(0.0), TemperatureBand::Freezing);
        assert_eq!(temperature_band(0.1), TemperatureBand::Cold);
        assert_eq!(temperature_band(8.0), TemperatureBand::Cool);
        assert_eq!(temperature_band(12.0), TemperatureBand::Mild);
        assert_eq!(temperature_band(16.0), TemperatureBand::Warm);
        assert_eq!(temperature_band(20.0), TemperatureBand::Hot);
        assert_eq!(temperature_band(25.0), TemperatureBand::VeryHot);
        assert_eq!(temperature_band(30.0), TemperatureBand::Extreme);
    }

    #[test]
    fn rain_tag_requires_positive_precipitation() {
        assert_eq!(rain_tag(Some(0.0)), RainTag::Dry);
        assert_eq!(rain_tag(None), RainTag::Dry);
        assert_eq!(rain_tag(Some(0.2)), RainTag::Wet);
    }

    #[test]
    fn protocol_relative_icons_get_https() {
        assert_eq!(
            icon_url("//cdn.weatherapi.com/weather/64x64/day/113.png"),
            "https://cdn.weatherapi.com/weather/64x64/day/113.png"
        );
        assert_eq!(icon_url("https://x/y.png"), "https://x/y.png");
    }
}
