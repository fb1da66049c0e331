use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Location {
    pub fn from_coords(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
        }
    }

    /// "lat,lon" as the forecast API expects in its `q` parameter.
    pub fn query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Single-slot snapshot of the last fresh fix, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

impl CachedLocation {
    pub fn capture(location: &Location, captured_at: DateTime<Utc>) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            captured_at,
        }
    }

    pub fn to_location(&self) -> Location {
        Location::from_coords(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_joins_coordinates() {
        assert_eq!(Location::from_coords(51.5, -0.12).query(), "51.5,-0.12");
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Location::from_coords(51.5, -0.12).is_valid());
        assert!(!Location::from_coords(91.0, 0.0).is_valid());
        assert!(!Location::from_coords(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn capture_roundtrips_core_fields() {
        let location = Location {
            latitude: 51.4,
            longitude: 0.02,
            name: Some("Bromley".to_string()),
        };
        let cached = CachedLocation::capture(&location, Utc::now());
        let restored = cached.to_location();
        assert!((restored.latitude - location.latitude).abs() < f64::EPSILON);
        assert!((restored.longitude - location.longitude).abs() < f64::EPSILON);
        assert_eq!(restored.name, None);
    }
}
