use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FeedError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin GET wrapper shared by the feed clients. Every call carries its own
/// timeout and every failure comes back as a [`FeedError`] naming the source.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder().build().expect("reqwest client"),
            timeout,
        }
    }

    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            client: self.client.clone(),
            timeout,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        source: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FeedError> {
        let body = self.send(source, self.client.get(url).query(query)).await?;
        serde_json::from_slice(&body).map_err(|err| FeedError::malformed(source, err))
    }

    pub async fn get_bytes(&self, source: &str, url: &str) -> Result<Vec<u8>, FeedError> {
        self.send(source, self.client.get(url)).await
    }

    async fn send(&self, source: &str, request: RequestBuilder) -> Result<Vec<u8>, FeedError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.transport_error(source, &err))?;
        let status = response.status();
        debug!(source, %status, "http_response");
        let response = response
            .error_for_status()
            .map_err(|err| FeedError::network(source, err))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(source, &err))?;
        Ok(body.to_vec())
    }

    fn transport_error(&self, source: &str, err: &reqwest::Error) -> FeedError {
        if err.is_timeout() {
            FeedError::network(
                source,
                format!("timed out after {:?}", self.timeout),
            )
        } else {
            FeedError::network(source, err)
        }
    }
}

/// Appends path segments to `base`, percent-encoding each one ("Spain/Italy"
/// stays a single segment).
pub fn endpoint(source: &str, base: &str, segments: &[&str]) -> Result<String, FeedError> {
    let mut url = reqwest::Url::parse(base).map_err(|err| FeedError::network(source, err))?;
    url.path_segments_mut()
        .map_err(|()| FeedError::network(source, format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_each_segment() {
        let url = endpoint("logo", "http://localhost:8080/", &["api", "v1", "teams", "Man Utd", "logo"])
            .expect("valid base");
        assert_eq!(url, "http://localhost:8080/api/v1/teams/Man%20Utd/logo");
    }

    #[test]
    fn endpoint_rejects_unusable_base() {
        assert!(endpoint("logo", "not a url", &["x"]).is_err());
    }
}
