use crate::{
    data::http::{HttpFetcher, endpoint},
    domain::bins::BinCollection,
    error::FeedError,
};

const SOURCE: &str = "bins";

#[derive(Debug, Clone)]
pub struct BinsClient {
    http: HttpFetcher,
    base_url: String,
}

impl BinsClient {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Next scheduled collection for `bin_id`.
    pub async fn next_collection(&self, bin_id: &str) -> Result<BinCollection, FeedError> {
        let url = endpoint(
            SOURCE,
            &self.base_url,
            &["api", "v1", "bin", bin_id, "next_collections"],
        )?;
        let payload: serde_json::Value = self.http.get_json(SOURCE, &url, &[]).await?;
        parse_collection(payload)
    }
}

/// An empty body (`null`, `{}`, `[]`) or a record without bins means nothing
/// is scheduled; a record with an unreadable date is malformed.
fn parse_collection(payload: serde_json::Value) -> Result<BinCollection, FeedError> {
    let is_empty = match &payload {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(FeedError::no_data(SOURCE));
    }
    let collection: BinCollection =
        serde_json::from_value(payload).map_err(|err| FeedError::malformed(SOURCE, err))?;
    if collection.bins.is_empty() {
        return Err(FeedError::no_data(SOURCE));
    }
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payloads_mean_no_collection() {
        for payload in [
            serde_json::Value::Null,
            serde_json::json!({}),
            serde_json::json!([]),
        ] {
            assert_eq!(parse_collection(payload), Err(FeedError::no_data("bins")));
        }
    }

    #[test]
    fn record_without_bins_is_no_data() {
        let payload = serde_json::json!({ "nextCollectionDate": "2024-06-11", "bins": [] });
        assert_eq!(parse_collection(payload), Err(FeedError::no_data("bins")));
    }

    #[test]
    fn unreadable_date_is_malformed() {
        let payload = serde_json::json!({ "nextCollectionDate": "soon", "bins": ["Paper & Cardboard"] });
        assert!(matches!(
            parse_collection(payload),
            Err(FeedError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn full_record_decodes() {
        let payload = serde_json::json!({
            "nextCollectionDate": "2024-06-11",
            "nextCollectionDateDay": "Tuesday",
            "nextCollectionDateFriendly": "Tue 11 Jun",
            "bins": ["Paper & Cardboard", "Garden Waste"]
        });
        let collection = parse_collection(payload).expect("decodes");
        assert_eq!(collection.bins.len(), 2);
        assert_eq!(collection.next_collection_date_day.as_deref(), Some("Tuesday"));
    }
}
