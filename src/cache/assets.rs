use std::{
    collections::{HashMap, HashSet},
    future::Future,
};

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::FeedError;

/// A fetched image, or the designated stand-in when fetching was not possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub fallback: bool,
}

impl Asset {
    pub fn fetched(url: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            bytes,
            fallback: false,
        }
    }

    pub fn fallback(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bytes: Vec::new(),
            fallback: true,
        }
    }
}

/// Memoizing key -> asset map scoped to one aggregation pass.
///
/// Each distinct key is fetched at most once for the lifetime of the cache.
/// A fetch that fails or yields nothing resolves to the fallback value, so one
/// missing image never blocks the rest.
#[derive(Debug)]
pub struct AssetCache<A> {
    entries: HashMap<String, A>,
    fallback: A,
    fetches: usize,
}

impl<A: Clone> AssetCache<A> {
    pub fn new(fallback: A) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
            fetches: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fetch invocations issued so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    pub async fn resolve<F, Fut>(&mut self, key: &str, fetch: F) -> A
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Option<A>, FeedError>>,
    {
        if let Some(hit) = self.entries.get(key) {
            return hit.clone();
        }
        self.fetches += 1;
        let resolved = self.settle(key, fetch(key.to_string()).await);
        self.entries.insert(key.to_string(), resolved.clone());
        resolved
    }

    /// Fans out one fetch per distinct uncached key, waits for all of them to
    /// settle, and returns the asset for every requested key.
    pub async fn resolve_all<I, S, F, Fut>(&mut self, keys: I, fetch: F) -> HashMap<String, A>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Option<A>, FeedError>>,
    {
        let mut seen = HashSet::new();
        let requested: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .filter(|k| seen.insert(k.clone()))
            .collect();

        let missing: Vec<String> = requested
            .iter()
            .filter(|k| !self.entries.contains_key(k.as_str()))
            .cloned()
            .collect();
        debug!(
            requested = requested.len(),
            to_fetch = missing.len(),
            "asset_batch"
        );

        self.fetches += missing.len();
        let outcomes = join_all(missing.iter().map(|key| fetch(key.clone()))).await;
        for (key, outcome) in missing.into_iter().zip(outcomes) {
            let resolved = self.settle(&key, outcome);
            self.entries.insert(key, resolved);
        }

        requested
            .into_iter()
            .filter_map(|key| {
                let asset = self.entries.get(&key)?.clone();
                Some((key, asset))
            })
            .collect()
    }

    fn settle(&self, key: &str, outcome: Result<Option<A>, FeedError>) -> A {
        match outcome {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                debug!(key, "asset_fallback_no_path");
                self.fallback.clone()
            }
            Err(err) => {
                warn!(key, error = %err, "asset_fallback_fetch_failed");
                self.fallback.clone()
            }
        }
    }
}
