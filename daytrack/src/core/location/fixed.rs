use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{Location, Locator};
use crate::error::TrackerError;
use daytrack_config::Config;

/// Locator that always reports the same configured coordinate. Stands in
/// on platforms without a geolocation service; also what a stationary
/// deployment (a desk machine) actually wants.
#[derive(Debug)]
pub struct FixedLocator {
    location: Location,
}

impl FixedLocator {
    pub fn new(location: Location) -> Self {
        Self { location }
    }

    pub fn from_config(config: &dyn Config) -> Result<Self> {
        let latitude: f64 = config
            .get("FIXED_LAT")?
            .parse()
            .context("FIXED_LAT is not a number")?;
        let longitude: f64 = config
            .get("FIXED_LON")?
            .parse()
            .context("FIXED_LON is not a number")?;
        Ok(Self::new(Location::new(latitude, longitude)))
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn request_fix(&self) -> Result<Location, TrackerError> {
        Ok(self.location.clone())
    }
}

#[tokio::test]
async fn test_fixed_locator_reports_configured_coordinate() {
    let locator = FixedLocator::new(Location::new(51.5237, -0.1585));
    let fix = locator.request_fix().await.unwrap();
    assert_eq!(fix, Location::new(51.5237, -0.1585));
}
