use async_trait::async_trait;

use super::TrackStore;
use crate::error::TrackerError;

/// Client for a Firebase-RTDB-style REST store: a record is written by
/// PUTting a JSON string to `<base>/<path>.json`.
pub struct RtdbStore {
    client: reqwest::Client,
    base_url: String,
}

impl RtdbStore {
    pub fn new(base_url: &str) -> Result<Self, TrackerError> {
        url::Url::parse(base_url).map_err(|e| TrackerError::Store(e.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TrackStore for RtdbStore {
    async fn write(&self, path: &str, value: &str) -> Result<(), TrackerError> {
        let url = format!("{}/{}.json", self.base_url, path);
        log::trace!("writing record to {url}");
        self.client
            .put(&url)
            .json(&value)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TrackerError::Store(e.to_string()))?;
        Ok(())
    }
}

#[test]
fn test_rtdb_store_rejects_bad_url() {
    assert!(matches!(
        RtdbStore::new("not a url"),
        Err(TrackerError::Store(_))
    ));
}
