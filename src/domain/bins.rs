use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::time::{DateBucket, bucket};

/// Next-collection record from the bins feed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinCollection {
    pub next_collection_date: NaiveDate,
    #[serde(default)]
    pub next_collection_date_day: Option<String>,
    #[serde(default)]
    pub next_collection_date_friendly: Option<String>,
    #[serde(default)]
    pub bins: Vec<String>,
}

/// A bin the user cares about and the icon that stands for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BinOfInterest {
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionEmphasis {
    /// Due tomorrow: the bins go out tonight.
    Highlight,
    Secondary,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedCollection {
    pub date: NaiveDate,
    pub bucket: DateBucket,
    pub label: String,
    pub emphasis: CollectionEmphasis,
    pub icons: Vec<String>,
}

/// Buckets the collection date and maps bin names onto the configured icons.
/// Bins that are not of interest are dropped; match is case-sensitive.
#[must_use]
pub fn classify_collection(
    collection: &BinCollection,
    interests: &[BinOfInterest],
    reference_now: NaiveDateTime,
) -> ClassifiedCollection {
    let date_bucket = bucket(collection.next_collection_date, reference_now);
    let label = match date_bucket.label() {
        Some(label) => label.to_string(),
        None => collection
            .next_collection_date_day
            .clone()
            .or_else(|| collection.next_collection_date_friendly.clone())
            .unwrap_or_else(|| collection.next_collection_date.format("%A").to_string()),
    };
    let emphasis = match date_bucket {
        DateBucket::Tomorrow => CollectionEmphasis::Highlight,
        DateBucket::Today => CollectionEmphasis::Secondary,
        DateBucket::Future => CollectionEmphasis::Muted,
    };
    let icons = collection
        .bins
        .iter()
        .filter_map(|bin| interests.iter().find(|i| &i.name == bin))
        .map(|i| i.icon.clone())
        .collect();

    ClassifiedCollection {
        date: collection.next_collection_date,
        bucket: date_bucket,
        label,
        emphasis,
        icons,
    }
}

pub fn default_bins_of_interest() -> Vec<BinOfInterest> {
    [
        ("Paper & Cardboard", "📦"),
        ("Mixed Recycling (Cans, Plastics & Glass)", "♻️"),
        ("Non-Recyclable Refuse", "🗑️"),
    ]
    .into_iter()
    .map(|(name, icon)| BinOfInterest {
        name: name.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}
