use serde::Deserialize;
use tracing::warn;

use crate::{
    data::http::{HttpFetcher, endpoint},
    domain::transit::Departure,
    error::FeedError,
};

const SOURCE: &str = "departures";

#[derive(Debug, Deserialize)]
struct DeparturesResponse {
    #[serde(default)]
    departures: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub struct TrainsClient {
    http: HttpFetcher,
    base_url: String,
}

impl TrainsClient {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Departures from `from` calling at `to`, in feed (booked time) order.
    pub async fn departures(&self, from: &str, to: &str) -> Result<Vec<Departure>, FeedError> {
        let url = endpoint(
            SOURCE,
            &self.base_url,
            &["api", "v1", "departures", "from", from, "to", to],
        )?;
        let payload: DeparturesResponse = self.http.get_json(SOURCE, &url, &[]).await?;
        Ok(payload
            .departures
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Departure>(value) {
                Ok(departure) => Some(departure),
                Err(err) => {
                    warn!(from, to, error = %err, "departure_skipped");
                    None
                }
            })
            .collect())
    }
}
