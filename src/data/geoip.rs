use serde::Deserialize;

use crate::{data::http::HttpFetcher, domain::location::Location, error::FeedError};

pub const GEOIP_URL: &str = "https://ipapi.co/json/";
const SOURCE: &str = "geoip";

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GeoIpClient {
    http: HttpFetcher,
    url: String,
}

impl GeoIpClient {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn detect_location(&self) -> Result<Location, FeedError> {
        let response: IpApiResponse = self.http.get_json(SOURCE, &self.url, &[]).await?;
        let (Some(latitude), Some(longitude)) = (response.latitude, response.longitude) else {
            return Err(FeedError::malformed(SOURCE, "missing coordinates"));
        };
        let location = Location {
            latitude,
            longitude,
            name: response.city.filter(|c| !c.is_empty()),
        };
        if !location.is_valid() {
            return Err(FeedError::malformed(SOURCE, "coordinates out of range"));
        }
        Ok(location)
    }
}
