use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::TrackerError;

/// Literal fallback value persisted when no address can be resolved.
pub const ADDRESS_NOT_FOUND: &str =
    "[ERROR] Address not found ! Probably there was no internet connection !";

/// One candidate result of a reverse lookup, as free-text address lines.
#[derive(Clone, Debug)]
pub struct AddressCandidate {
    pub lines: Vec<String>,
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Resolves a coordinate to at most `max_results` address candidates.
    /// May return an empty list when the coordinate is unknown.
    async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: usize,
    ) -> Result<Vec<AddressCandidate>, TrackerError>;
}

/// Joins the address lines of the first candidate, each line terminated
/// by a newline. Empty if there is no candidate.
pub fn join_address_lines(candidates: &[AddressCandidate]) -> String {
    let Some(first) = candidates.first() else {
        return String::new();
    };
    let mut joined = String::new();
    for line in &first.lines {
        joined.push_str(line);
        joined.push('\n');
    }
    joined
}

/// Reverse geocoder against a Nominatim-style `/reverse` endpoint.
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

impl HttpGeocoder {
    pub fn new(base_url: &str) -> Result<Self, TrackerError> {
        let base_url = Url::parse(base_url).map_err(|e| TrackerError::Geocode(e.to_string()))?;
        // Nominatim rejects requests without an identifying user agent
        let client = reqwest::Client::builder()
            .user_agent(concat!("daytrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackerError::Geocode(e.to_string()))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ReverseGeocoder for HttpGeocoder {
    async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: usize,
    ) -> Result<Vec<AddressCandidate>, TrackerError> {
        let mut url = self
            .base_url
            .join("reverse")
            .map_err(|e| TrackerError::Geocode(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string());

        log::trace!("reverse geocoding via {url}");
        let response: ReverseResponse = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TrackerError::Geocode(e.to_string()))?
            .json()
            .await
            .map_err(|e| TrackerError::Geocode(e.to_string()))?;

        let candidates = response
            .display_name
            .map(|name| AddressCandidate { lines: vec![name] })
            .into_iter()
            .take(max_results)
            .collect();
        Ok(candidates)
    }
}

#[test]
fn test_join_takes_first_candidate_only() {
    let candidates = vec![
        AddressCandidate {
            lines: vec!["221B Baker Street".to_string(), "London".to_string()],
        },
        AddressCandidate {
            lines: vec!["ignored".to_string()],
        },
    ];
    assert_eq!(join_address_lines(&candidates), "221B Baker Street\nLondon\n");
}

#[test]
fn test_join_without_candidates_is_empty() {
    assert_eq!(join_address_lines(&[]), "");
}
