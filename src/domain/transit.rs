use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform text shown for a cancelled departure.
pub const CANCELLED_PLATFORM: &str = "X";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("clock value {0:?} is not a 4-digit HHMM time")]
    NotHhmm(String),
    #[error("clock value {0:?} is out of range")]
    OutOfRange(String),
}

/// A 24-hour wall-clock time as carried by the departure feeds ("1205" or "12:05").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clock {
    pub hour: u8,
    pub minute: u8,
}

impl Clock {
    pub fn parse(raw: &str) -> Result<Self, ClockError> {
        let digits = non_digits().replace_all(raw, "");
        if digits.len() != 4 {
            return Err(ClockError::NotHhmm(raw.to_string()));
        }
        let hour: u8 = digits[..2]
            .parse()
            .map_err(|_| ClockError::NotHhmm(raw.to_string()))?;
        let minute: u8 = digits[2..]
            .parse()
            .map_err(|_| ClockError::NotHhmm(raw.to_string()))?;
        if hour > 23 || minute > 59 {
            return Err(ClockError::OutOfRange(raw.to_string()));
        }
        Ok(Self { hour, minute })
    }

    /// The time in HHMM integer space, e.g. 23:58 is 2358.
    #[must_use]
    pub fn hhmm(self) -> i32 {
        i32::from(self.hour) * 100 + i32::from(self.minute)
    }
}

/// Signed delay between the booked and actual times, positive when late.
///
/// The value is the HHMM-space difference, not elapsed minutes: `1459 -> 1501`
/// yields 42. Severity tiers are calibrated against this scale. An actual time
/// in hour 00 for a booking in hour 23 is taken to be on the next day (+2400).
pub fn delay_minutes(booked: &str, actual: &str) -> Result<i32, ClockError> {
    let booked = Clock::parse(booked)?;
    let actual = Clock::parse(actual)?;
    let mut actual_value = actual.hhmm();
    if crosses_midnight(booked, actual) {
        actual_value += 2400;
    }
    Ok(actual_value - booked.hhmm())
}

fn crosses_midnight(booked: Clock, actual: Clock) -> bool {
    booked.hour == 23 && actual.hour == 0
}

/// "1205" -> "12:05". Values that are not four digits pass through untouched.
#[must_use]
pub fn format_clock(raw: &str) -> String {
    hhmm_pattern().replace(raw, "$1:$2").into_owned()
}

fn non_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9]").expect("static regex"))
}

fn hhmm_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2})(\d{2})$").expect("static regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DelaySeverity {
    OnTime,
    Minor,
    Moderate,
    Significant,
    Severe,
}

/// Tiers: on time <= 0, minor 1-2, moderate 3-4, significant 5-6, severe > 6.
#[must_use]
pub fn severity_for(delay: i32) -> DelaySeverity {
    match delay {
        i32::MIN..=0 => DelaySeverity::OnTime,
        1..=2 => DelaySeverity::Minor,
        3..=4 => DelaySeverity::Moderate,
        5..=6 => DelaySeverity::Significant,
        _ => DelaySeverity::Severe,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DepartureState {
    OnTime,
    Delayed { minutes: i32 },
    Cancelled,
    BusReplacement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "platform", content = "value", rename_all = "snake_case")]
pub enum PlatformTag {
    Assigned(String),
    Unknown,
    NotApplicable,
    Cancelled,
}

impl PlatformTag {
    #[must_use]
    pub fn display(&self) -> &str {
        match self {
            Self::Assigned(platform) => platform,
            Self::Unknown => "-",
            Self::NotApplicable => "",
            Self::Cancelled => CANCELLED_PLATFORM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub location_detail: LocationDetail,
    #[serde(default)]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetail {
    #[serde(default)]
    pub crs: Option<String>,
    pub gbtt_booked_departure: String,
    #[serde(default)]
    pub realtime_departure: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub cancel_reason_code: Option<String>,
}

impl Departure {
    pub fn is_cancelled(&self) -> bool {
        self.location_detail
            .cancel_reason_code
            .as_deref()
            .is_some_and(|code| !code.is_empty())
    }

    pub fn is_bus_replacement(&self) -> bool {
        self.service_type
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("bus"))
    }

    /// Realtime departure when reported, otherwise the booked one.
    pub fn display_source(&self) -> &str {
        self.location_detail
            .realtime_departure
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.location_detail.gbtt_booked_departure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedDeparture {
    pub booked: String,
    pub display_time: String,
    pub state: DepartureState,
    pub severity: Option<DelaySeverity>,
    pub platform: PlatformTag,
}

/// One-pass classification: cancelled, then bus replacement, then delay tiers.
#[must_use]
pub fn classify_departure(departure: &Departure) -> ClassifiedDeparture {
    let detail = &departure.location_detail;
    let display_time = format_clock(departure.display_source());

    if departure.is_cancelled() {
        return ClassifiedDeparture {
            booked: detail.gbtt_booked_departure.clone(),
            display_time,
            state: DepartureState::Cancelled,
            severity: None,
            platform: PlatformTag::Cancelled,
        };
    }

    if departure.is_bus_replacement() {
        return ClassifiedDeparture {
            booked: detail.gbtt_booked_departure.clone(),
            display_time,
            state: DepartureState::BusReplacement,
            severity: None,
            platform: PlatformTag::NotApplicable,
        };
    }

    let delay = delay_minutes(&detail.gbtt_booked_departure, departure.display_source())
        .unwrap_or_else(|err| {
            tracing::warn!(
                booked = %detail.gbtt_booked_departure,
                error = %err,
                "departure_delay_unparsed"
            );
            0
        });
    let state = if delay > 0 {
        DepartureState::Delayed { minutes: delay }
    } else {
        DepartureState::OnTime
    };

    ClassifiedDeparture {
        booked: detail.gbtt_booked_departure.clone(),
        display_time,
        state,
        severity: Some(severity_for(delay)),
        platform: platform_tag(detail.platform.as_deref()),
    }
}

fn platform_tag(platform: Option<&str>) -> PlatformTag {
    match platform.map(str::trim) {
        Some(p) if !p.is_empty() => PlatformTag::Assigned(p.to_string()),
        _ => PlatformTag::Unknown,
    }
}
