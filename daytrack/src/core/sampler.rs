use std::time::Duration;

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use tokio::time::timeout;

use super::location::Locator;
use super::window::SamplingWindow;
use super::CoreEvent;
use crate::error::TrackerError;
use crate::geocode::{join_address_lines, ReverseGeocoder, ADDRESS_NOT_FOUND};
use crate::prefs::{KeyValueStore, ID_KEY};
use crate::store::{record_path, TrackStore};

/// Identifier samples are recorded under when none has been configured.
pub const UNREGISTERED_ID: &str = "unregistered";

#[derive(Debug)]
pub enum SampleOutcome {
    /// Current time is outside the sampling window, nothing was done.
    Skipped,
    Recorded { path: String, value: String },
}

/// One scheduled unit of work: read the identifier, gate on the sampling
/// window, fetch a fix, resolve it to an address and record it.
///
/// All collaborators sit behind trait seams so the pipeline can be
/// exercised without a platform location service or network.
pub struct Sampler {
    prefs: Box<dyn KeyValueStore>,
    locator: Box<dyn Locator>,
    geocoder: Box<dyn ReverseGeocoder>,
    store: Box<dyn TrackStore>,
    window: SamplingWindow,
    fix_timeout: Duration,
}

impl Sampler {
    pub fn new(
        prefs: Box<dyn KeyValueStore>,
        locator: Box<dyn Locator>,
        geocoder: Box<dyn ReverseGeocoder>,
        store: Box<dyn TrackStore>,
        window: SamplingWindow,
        fix_timeout: Duration,
    ) -> Self {
        Self {
            prefs,
            locator,
            geocoder,
            store,
            window,
            fix_timeout,
        }
    }

    /// Runs a single sampling invocation at the given local timestamp.
    ///
    /// `notify` is called with the raw resolved address before anything
    /// is persisted. Errors end the invocation without a write; the next
    /// scheduled tick is the only retry.
    pub async fn sample_once(
        &self,
        now: NaiveDateTime,
        notify: impl Fn(CoreEvent),
    ) -> Result<SampleOutcome, TrackerError> {
        let id = match self.prefs.get(ID_KEY) {
            Ok(id) if !id.is_empty() => id,
            _ => {
                warn!("no identifier configured, recording under '{UNREGISTERED_ID}'");
                UNREGISTERED_ID.to_string()
            }
        };

        if !self.window.contains(now.time()) {
            debug!(
                "{} is outside the sampling window {}, skipping",
                now.format("%H:%M"),
                self.window
            );
            return Ok(SampleOutcome::Skipped);
        }

        let fix = match timeout(self.fix_timeout, self.locator.request_fix()).await {
            Ok(Ok(fix)) => fix,
            Ok(Err(e)) => return Err(e),
            Err(_elapsed) => return Err(TrackerError::FixTimeout(self.fix_timeout.as_secs())),
        };
        debug!("got fix {fix:?}");

        let address = match self.geocoder.lookup(fix.latitude(), fix.longitude(), 1).await {
            Ok(candidates) => join_address_lines(&candidates),
            Err(e) => {
                warn!("reverse geocoding failed: {e}");
                String::new()
            }
        };

        notify(CoreEvent::AddressResolved(address.clone()));

        let value = if address.is_empty() {
            ADDRESS_NOT_FOUND.to_string()
        } else {
            address
        };
        let path = record_path(&id, now);
        self.store.write(&path, &value).await?;
        info!("recorded sample at {path}");

        Ok(SampleOutcome::Recorded { path, value })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::core::location::{FixedLocator, Location};
    use crate::geocode::AddressCandidate;
    use crate::prefs::MemoryPrefs;
    use crate::store::MemoryStore;

    struct StaticGeocoder(Vec<AddressCandidate>);

    #[async_trait]
    impl ReverseGeocoder for StaticGeocoder {
        async fn lookup(
            &self,
            _latitude: f64,
            _longitude: f64,
            max_results: usize,
        ) -> Result<Vec<AddressCandidate>, TrackerError> {
            Ok(self.0.iter().take(max_results).cloned().collect())
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        async fn lookup(
            &self,
            _latitude: f64,
            _longitude: f64,
            _max_results: usize,
        ) -> Result<Vec<AddressCandidate>, TrackerError> {
            Err(TrackerError::Geocode("name resolution failed".to_string()))
        }
    }

    struct DeniedLocator;

    #[async_trait]
    impl Locator for DeniedLocator {
        async fn request_fix(&self) -> Result<Location, TrackerError> {
            Err(TrackerError::PermissionDenied(
                "location access is off".to_string(),
            ))
        }
    }

    struct StalledLocator;

    #[async_trait]
    impl Locator for StalledLocator {
        async fn request_fix(&self) -> Result<Location, TrackerError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    fn baker_street() -> Vec<AddressCandidate> {
        vec![AddressCandidate {
            lines: vec!["221B Baker Street".to_string()],
        }]
    }

    fn prefs_with_id(id: &str) -> Box<dyn KeyValueStore> {
        let mut prefs = MemoryPrefs::new();
        prefs.set(ID_KEY, id).unwrap();
        Box::new(prefs)
    }

    fn sampler(
        prefs: Box<dyn KeyValueStore>,
        locator: Box<dyn Locator>,
        geocoder: Box<dyn ReverseGeocoder>,
        store: &MemoryStore,
    ) -> Sampler {
        Sampler::new(
            prefs,
            locator,
            geocoder,
            Box::new(store.clone()),
            SamplingWindow::parse("06:00", "22:00").unwrap(),
            Duration::from_secs(30),
        )
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 7)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn records_address_inside_window() {
        let store = MemoryStore::new();
        let sampler = sampler(
            prefs_with_id("U1"),
            Box::new(FixedLocator::new(Location::new(51.5237, -0.1585))),
            Box::new(StaticGeocoder(baker_street())),
            &store,
        );

        let outcome = sampler.sample_once(at(10, 15), |_| {}).await.unwrap();

        assert!(matches!(outcome, SampleOutcome::Recorded { .. }));
        assert_eq!(
            store.get("U1/07-08-2026/10:15").unwrap(),
            "221B Baker Street\n"
        );
    }

    #[tokio::test]
    async fn skips_outside_window() {
        let store = MemoryStore::new();
        let sampler = sampler(
            prefs_with_id("U1"),
            Box::new(FixedLocator::new(Location::new(51.5237, -0.1585))),
            Box::new(StaticGeocoder(baker_street())),
            &store,
        );

        let outcome = sampler.sample_once(at(23, 30), |_| {}).await.unwrap();

        assert!(matches!(outcome, SampleOutcome::Skipped));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn writes_sentinel_when_geocoder_finds_nothing() {
        let store = MemoryStore::new();
        let sampler = sampler(
            prefs_with_id("U1"),
            Box::new(FixedLocator::new(Location::new(0.0, 0.0))),
            Box::new(StaticGeocoder(vec![])),
            &store,
        );

        sampler.sample_once(at(10, 15), |_| {}).await.unwrap();

        assert_eq!(store.get("U1/07-08-2026/10:15").unwrap(), ADDRESS_NOT_FOUND);
    }

    #[tokio::test]
    async fn writes_sentinel_when_geocoder_fails() {
        let store = MemoryStore::new();
        let sampler = sampler(
            prefs_with_id("U1"),
            Box::new(FixedLocator::new(Location::new(0.0, 0.0))),
            Box::new(FailingGeocoder),
            &store,
        );

        sampler.sample_once(at(10, 15), |_| {}).await.unwrap();

        assert_eq!(store.get("U1/07-08-2026/10:15").unwrap(), ADDRESS_NOT_FOUND);
    }

    #[tokio::test]
    async fn observer_sees_raw_address_even_when_sentinel_is_stored() {
        let store = MemoryStore::new();
        let sampler = sampler(
            prefs_with_id("U1"),
            Box::new(FixedLocator::new(Location::new(0.0, 0.0))),
            Box::new(StaticGeocoder(vec![])),
            &store,
        );

        let events = Mutex::new(Vec::new());
        sampler
            .sample_once(at(10, 15), |e| events.lock().unwrap().push(e))
            .await
            .unwrap();

        let events = events.into_inner().unwrap();
        assert!(matches!(
            events.as_slice(),
            [CoreEvent::AddressResolved(addr)] if addr.is_empty()
        ));
    }

    #[tokio::test]
    async fn permission_denied_means_no_write() {
        let store = MemoryStore::new();
        let sampler = sampler(
            prefs_with_id("U1"),
            Box::new(DeniedLocator),
            Box::new(StaticGeocoder(baker_street())),
            &store,
        );

        let result = sampler.sample_once(at(10, 15), |_| {}).await;

        assert!(matches!(result, Err(TrackerError::PermissionDenied(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stalled_fix_times_out_without_write() {
        let store = MemoryStore::new();
        let sampler = Sampler::new(
            prefs_with_id("U1"),
            Box::new(StalledLocator),
            Box::new(StaticGeocoder(baker_street())),
            Box::new(store.clone()),
            SamplingWindow::parse("06:00", "22:00").unwrap(),
            Duration::from_millis(10),
        );

        let result = sampler.sample_once(at(10, 15), |_| {}).await;

        assert!(matches!(result, Err(TrackerError::FixTimeout(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_identifier_records_under_sentinel_id() {
        let store = MemoryStore::new();
        let sampler = sampler(
            Box::new(MemoryPrefs::new()),
            Box::new(FixedLocator::new(Location::new(0.0, 0.0))),
            Box::new(StaticGeocoder(baker_street())),
            &store,
        );

        sampler.sample_once(at(10, 15), |_| {}).await.unwrap();

        assert!(store.get("unregistered/07-08-2026/10:15").is_some());
    }

    #[tokio::test]
    async fn same_minute_samples_overwrite() {
        let store = MemoryStore::new();
        let first = sampler(
            prefs_with_id("U1"),
            Box::new(FixedLocator::new(Location::new(0.0, 0.0))),
            Box::new(StaticGeocoder(baker_street())),
            &store,
        );
        let second = sampler(
            prefs_with_id("U1"),
            Box::new(FixedLocator::new(Location::new(0.0, 0.0))),
            Box::new(StaticGeocoder(vec![AddressCandidate {
                lines: vec!["Marylebone Road".to_string()],
            }])),
            &store,
        );

        first.sample_once(at(10, 15), |_| {}).await.unwrap();
        second.sample_once(at(10, 15), |_| {}).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("U1/07-08-2026/10:15").unwrap(), "Marylebone Road\n");
    }
}
