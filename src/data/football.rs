use serde::Deserialize;
use tracing::warn;

use crate::{
    cache::assets::Asset,
    data::http::{HttpFetcher, endpoint},
    domain::matches::{Match, is_placeholder_team},
    error::FeedError,
};

pub const NO_LOGO_PATH: &str = "/icons/team-logos/_noLogo.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFeed {
    Fixtures,
    Results,
}

impl MatchFeed {
    fn segment(self) -> &'static str {
        match self {
            Self::Fixtures => "fixtures",
            Self::Results => "results",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogoResponse {
    logo_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FootballClient {
    http: HttpFetcher,
    base_url: String,
    device_id: Option<String>,
}

impl FootballClient {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, device_id: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            device_id: device_id.filter(|id| !id.is_empty()),
        }
    }

    pub async fn matches(&self, feed: MatchFeed, limit: usize) -> Result<Vec<Match>, FeedError> {
        let source = feed.segment();
        let mut segments = vec!["api", "v1"];
        if let Some(device) = self.device_id.as_deref() {
            segments.extend(["user", device]);
        }
        segments.extend(["matches", source]);
        let url = endpoint(source, &self.base_url, &segments)?;
        let raw: Vec<serde_json::Value> = self
            .http
            .get_json(source, &url, &[("limit", limit.to_string())])
            .await?;
        Ok(parse_matches(source, raw))
    }

    /// Relative logo path for a team, `None` for placeholder sides and teams
    /// the server has no logo for.
    pub async fn logo_path(&self, team: &str) -> Result<Option<String>, FeedError> {
        if is_placeholder_team(team) {
            return Ok(None);
        }
        let url = endpoint("team_logo", &self.base_url, &["api", "v1", "teams", team, "logo"])?;
        let payload: LogoResponse = self.http.get_json("team_logo", &url, &[]).await?;
        Ok(payload.logo_path.filter(|path| !path.is_empty()))
    }

    /// Looks up and downloads the logo for `team`. This is the fetch function
    /// handed to the asset cache, one call per distinct team.
    pub async fn logo(&self, team: String) -> Result<Option<Asset>, FeedError> {
        let Some(path) = self.logo_path(&team).await? else {
            return Ok(None);
        };
        let url = self.asset_url(&path);
        let bytes = self.http.get_bytes("team_logo_image", &url).await?;
        Ok(Some(Asset::fetched(url, bytes)))
    }

    pub fn fallback_logo(&self) -> Asset {
        Asset::fallback(self.asset_url(NO_LOGO_PATH))
    }

    fn asset_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Decodes each element on its own so one bad match does not cost the feed.
fn parse_matches(source: &str, raw: Vec<serde_json::Value>) -> Vec<Match> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<Match>(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(source, index = idx, error = %err, "match_skipped");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_entries_are_skipped() {
        let raw = vec![
            serde_json::json!({
                "id": 1,
                "date": "2024-06-10",
                "homeTeam": { "names": { "displayName": "Arsenal" } },
                "awayTeam": { "names": { "displayName": "Chelsea" } },
                "friendlyDateTime": "Today"
            }),
            serde_json::json!({ "id": 2, "date": "not-a-date" }),
        ];
        let parsed = parse_matches("fixtures", raw);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "1");
    }

    #[tokio::test]
    async fn placeholder_teams_never_hit_the_network() {
        // Unroutable base: any request would fail.
        let client = FootballClient::new(HttpFetcher::default(), "http://127.0.0.1:9", None);
        assert_eq!(client.logo_path("Winner QF1").await, Ok(None));
        assert_eq!(client.logo("Spain/Italy".to_string()).await, Ok(None));
    }

    #[test]
    fn fallback_logo_points_at_no_logo_icon() {
        let client = FootballClient::new(HttpFetcher::default(), "http://host/", None);
        let fallback = client.fallback_logo();
        assert!(fallback.fallback);
        assert_eq!(fallback.url, "http://host/icons/team-logos/_noLogo.png");
    }
}
