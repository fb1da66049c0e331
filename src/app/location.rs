use std::{
    fs,
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    data::geoip::GeoIpClient,
    domain::location::{CachedLocation, Location},
    error::FeedError,
    resilience::retry::retry_bounded,
};

const LOCATION_FILE: &str = "last_location.json";

/// Source of a fresh location fix.
pub trait LocationProvider {
    fn current(&self) -> impl Future<Output = Result<Location, FeedError>>;
}

impl LocationProvider for GeoIpClient {
    fn current(&self) -> impl Future<Output = Result<Location, FeedError>> {
        self.detect_location()
    }
}

/// Coordinates given on the command line. Always succeeds.
#[derive(Debug, Clone)]
pub struct FixedLocation(pub Location);

impl LocationProvider for FixedLocation {
    fn current(&self) -> impl Future<Output = Result<Location, FeedError>> {
        std::future::ready(Ok(self.0.clone()))
    }
}

/// Provider chosen at startup: fixed coordinates or IP geolocation.
#[derive(Debug, Clone)]
pub enum LocationSource {
    Fixed(FixedLocation),
    GeoIp(GeoIpClient),
}

impl LocationProvider for LocationSource {
    fn current(&self) -> impl Future<Output = Result<Location, FeedError>> {
        async move {
            match self {
                Self::Fixed(fixed) => fixed.current().await,
                Self::GeoIp(client) => client.current().await,
            }
        }
    }
}

/// Single-slot, overwrite-only store for the last fresh fix.
#[derive(Debug, Clone)]
pub struct LocationStore {
    path: Option<PathBuf>,
}

impl LocationStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(LOCATION_FILE)),
        }
    }

    /// A store that never persists and never has a value.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Option<CachedLocation> {
        let path = self.path.as_ref()?;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "location_cache_missing");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(cached) => Some(cached),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "location_cache_malformed");
                None
            }
        }
    }

    pub fn save(&self, cached: &CachedLocation) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("creating location cache directory failed")?;
        }
        let payload =
            serde_json::to_string(cached).context("serializing cached location failed")?;
        fs::write(path, payload).context("writing location cache failed")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LocationOutcome {
    Fresh {
        location: Location,
    },
    Cached {
        location: Location,
        captured_at: DateTime<Utc>,
    },
    Unavailable,
}

impl LocationOutcome {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Fresh { location } | Self::Cached { location, .. } => Some(location),
            Self::Unavailable => None,
        }
    }

    pub fn into_result(self) -> Result<Location, FeedError> {
        match self {
            Self::Fresh { location } | Self::Cached { location, .. } => Ok(location),
            Self::Unavailable => Err(FeedError::LocationUnresolvable),
        }
    }
}

/// Fresh fix with bounded retries, then the persisted last-known fix.
#[derive(Debug)]
pub struct LocationResolver<P> {
    provider: P,
    store: LocationStore,
}

impl<P: LocationProvider> LocationResolver<P> {
    pub fn new(provider: P, store: LocationStore) -> Self {
        Self { provider, store }
    }

    /// Never fails: exhaustion with no cached value is [`LocationOutcome::Unavailable`].
    pub async fn resolve(&self, max_retries: u32) -> LocationOutcome {
        match retry_bounded("location", max_retries, |_| self.provider.current()).await {
            Ok(location) => {
                let cached = CachedLocation::capture(&location, Utc::now());
                if let Err(err) = self.store.save(&cached) {
                    warn!(error = %err, "location_cache_write_failed");
                }
                LocationOutcome::Fresh { location }
            }
            Err(exhausted) => {
                warn!(
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "location_attempts_exhausted"
                );
                match self.store.load() {
                    Some(cached) => {
                        info!(captured_at = %cached.captured_at, "location_from_cache");
                        LocationOutcome::Cached {
                            location: cached.to_location(),
                            captured_at: cached.captured_at,
                        }
                    }
                    None => LocationOutcome::Unavailable,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Fails the first `failures` calls, then returns `location`.
    struct Scripted {
        failures: u32,
        calls: Cell<u32>,
        location: Location,
    }

    impl Scripted {
        fn failing(failures: u32) -> Self {
            Self {
                failures,
                calls: Cell::new(0),
                location: Location::from_coords(51.4, 0.02),
            }
        }
    }

    impl LocationProvider for Scripted {
        fn current(&self) -> impl Future<Output = Result<Location, FeedError>> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            let outcome = if call < self.failures {
                Err(FeedError::network("geoip", "timed out"))
            } else {
                Ok(self.location.clone())
            };
            std::future::ready(outcome)
        }
    }

    #[tokio::test]
    async fn fresh_fix_is_persisted() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = LocationStore::in_dir(dir.path());
        let resolver = LocationResolver::new(Scripted::failing(2), store.clone());

        let outcome = resolver.resolve(3).await;

        assert!(matches!(outcome, LocationOutcome::Fresh { .. }));
        assert_eq!(resolver.provider.calls.get(), 3);
        let cached = store.load().expect("location persisted");
        assert!((cached.latitude - 51.4).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn exhausted_retries_fall_back_to_cached_fix() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = LocationStore::in_dir(dir.path());
        let previous = CachedLocation::capture(&Location::from_coords(53.5, -2.2), Utc::now());
        store.save(&previous).expect("seed cache");

        let resolver = LocationResolver::new(Scripted::failing(u32::MAX), store);
        let outcome = resolver.resolve(3).await;

        assert_eq!(resolver.provider.calls.get(), 4);
        match outcome {
            LocationOutcome::Cached { location, captured_at } => {
                assert!((location.latitude - 53.5).abs() < f64::EPSILON);
                assert_eq!(captured_at, previous.captured_at);
            }
            other => panic!("expected cached outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_retries_without_cache_are_unavailable() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let resolver =
            LocationResolver::new(Scripted::failing(u32::MAX), LocationStore::in_dir(dir.path()));
        let outcome = resolver.resolve(3).await;
        assert_eq!(outcome, LocationOutcome::Unavailable);
        assert_eq!(outcome.into_result(), Err(FeedError::LocationUnresolvable));
    }

    #[tokio::test]
    async fn failed_attempts_leave_cache_untouched() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = LocationStore::in_dir(dir.path());
        let previous = CachedLocation::capture(&Location::from_coords(53.5, -2.2), Utc::now());
        store.save(&previous).expect("seed cache");

        let resolver = LocationResolver::new(Scripted::failing(u32::MAX), store.clone());
        resolver.resolve(1).await;

        assert_eq!(store.load(), Some(previous));
    }

    #[tokio::test]
    async fn fixed_location_always_resolves_fresh() {
        let resolver = LocationResolver::new(
            FixedLocation(Location::from_coords(1.0, 2.0)),
            LocationStore::disabled(),
        );
        let outcome = resolver.resolve(0).await;
        assert_eq!(outcome.location(), Some(&Location::from_coords(1.0, 2.0)));
    }

    #[test]
    fn malformed_cache_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = LocationStore::in_dir(dir.path());
        std::fs::write(store.path().expect("path"), "garbage").expect("write file");
        assert_eq!(store.load(), None);
    }
}
