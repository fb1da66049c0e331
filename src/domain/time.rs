use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Calendar bucket of a date relative to "now". Variants are ordered nearest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DateBucket {
    Today,
    Tomorrow,
    Future,
}

impl DateBucket {
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Today => Some("Today"),
            Self::Tomorrow => Some("Tomorrow"),
            Self::Future => None,
        }
    }
}

/// Buckets `date` by calendar date only. "Tomorrow" is the calendar date of
/// `reference_now + 24h`, not "within the next 24 hours". Dates that are neither
/// today nor tomorrow (including past dates) fall into `Future`, the muted bucket.
#[must_use]
pub fn bucket(date: NaiveDate, reference_now: NaiveDateTime) -> DateBucket {
    let today = reference_now.date();
    let tomorrow = (reference_now + Duration::hours(24)).date();
    if date == today {
        DateBucket::Today
    } else if date == tomorrow {
        DateBucket::Tomorrow
    } else {
        DateBucket::Future
    }
}

/// Stable sort key for dated items: bucket first, then calendar date, then the
/// time of day in minutes (untimed items sort first within their date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OrderingKey {
    pub bucket: DateBucket,
    pub date: NaiveDate,
    pub minute_of_day: Option<u16>,
}

#[must_use]
pub fn ordering_key(
    date: NaiveDate,
    time: Option<NaiveTime>,
    reference_now: NaiveDateTime,
) -> OrderingKey {
    use chrono::Timelike;

    OrderingKey {
        bucket: bucket(date, reference_now),
        date,
        minute_of_day: time.map(|t| (t.hour() * 60 + t.minute()) as u16),
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parses "HH:MM" (the kick-off and forecast slot format).
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Parses the forecast slot format, "YYYY-MM-DD HH:MM".
pub fn parse_slot_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").expect("valid fixture")
    }

    fn day(value: &str) -> NaiveDate {
        parse_date(value).expect("valid fixture")
    }

    #[test]
    fn late_evening_reference_buckets_next_date_as_tomorrow() {
        let now = at("2024-06-10T23:00");
        assert_eq!(bucket(day("2024-06-11"), now), DateBucket::Tomorrow);
        assert_eq!(bucket(day("2024-06-10"), now), DateBucket::Today);
        assert_eq!(bucket(day("2024-06-12"), now), DateBucket::Future);
    }

    #[test]
    fn early_morning_reference_uses_calendar_dates() {
        let now = at("2024-06-10T00:05");
        assert_eq!(bucket(day("2024-06-10"), now), DateBucket::Today);
        assert_eq!(bucket(day("2024-06-11"), now), DateBucket::Tomorrow);
    }

    #[test]
    fn month_and_year_rollover() {
        assert_eq!(
            bucket(day("2024-07-01"), at("2024-06-30T12:00")),
            DateBucket::Tomorrow
        );
        assert_eq!(
            bucket(day("2025-01-01"), at("2024-12-31T23:59")),
            DateBucket::Tomorrow
        );
    }

    #[test]
    fn past_dates_are_not_today() {
        assert_eq!(
            bucket(day("2024-06-09"), at("2024-06-10T08:00")),
            DateBucket::Future
        );
    }

    #[test]
    fn ordering_key_sorts_by_bucket_then_time() {
        let now = at("2024-06-10T09:00");
        let untimed = ordering_key(day("2024-06-10"), None, now);
        let noon = ordering_key(day("2024-06-10"), parse_clock("12:00"), now);
        let tomorrow = ordering_key(day("2024-06-11"), parse_clock("08:00"), now);
        assert!(untimed < noon);
        assert!(noon < tomorrow);
        assert_eq!(noon.minute_of_day, Some(720));
    }

    #[test]
    fn parses_slot_time() {
        let parsed = parse_slot_time("2024-06-10 14:00").expect("slot time");
        assert_eq!(parsed, at("2024-06-10T14:00"));
        assert!(parse_slot_time("2024-06-10T14:00").is_none());
    }
}
