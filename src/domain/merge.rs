use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

/// Label attached to results that are merged in ahead of the fixtures.
pub const TODAY_LABEL: &str = "Today";

/// An entity from an upstream feed that can take part in a merge.
pub trait FeedItem {
    /// Stable identity shared by the result and fixture variants of one entity.
    fn id(&self) -> &str;
    fn date(&self) -> NaiveDate;
    /// Upstream scheduling label ("Today", "Sat 29 Jun", ...). Items without one
    /// cannot be placed in the list.
    fn schedule_label(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Result,
    Fixture,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Merged<T> {
    pub origin: Origin,
    pub label: String,
    pub item: T,
}

/// Ordered, deduplicated, capped output of [`merge`]. Built once and read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedSequence<T> {
    items: Vec<Merged<T>>,
}

impl<T> MergedSequence<T> {
    pub fn items(&self) -> &[Merged<T>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Merged<T>> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Merged<T>> {
        self.items
    }
}

/// Merges today's results with the fixtures feed.
///
/// Results dated `today` come first in feed order, labelled [`TODAY_LABEL`].
/// Fixtures follow in feed order, skipping any whose id already has a result and
/// any without a scheduling label; collection stops once `max_items` is reached.
/// The final slice to `max_items` also bounds the case where today's results
/// alone exceed the cap.
pub fn merge<T: FeedItem + Clone>(
    results: &[T],
    fixtures: &[T],
    max_items: usize,
    today: NaiveDate,
) -> MergedSequence<T> {
    let mut items: Vec<Merged<T>> = results
        .iter()
        .filter(|item| item.date() == today)
        .map(|item| Merged {
            origin: Origin::Result,
            label: TODAY_LABEL.to_string(),
            item: item.clone(),
        })
        .collect();

    let mut seen: HashSet<String> = items.iter().map(|m| m.item.id().to_string()).collect();

    for fixture in fixtures {
        if items.len() >= max_items {
            break;
        }
        let Some(label) = fixture.schedule_label() else {
            continue;
        };
        if !seen.insert(fixture.id().to_string()) {
            continue;
        }
        items.push(Merged {
            origin: Origin::Fixture,
            label: label.to_string(),
            item: fixture.clone(),
        });
    }

    items.truncate(max_items);
    MergedSequence { items }
}

/// Single-feed variant used by the departure boards: feed order, capped.
pub fn take_capped<T: Clone>(feed: &[T], max_items: usize) -> Vec<T> {
    feed.iter().take(max_items).cloned().collect()
}
