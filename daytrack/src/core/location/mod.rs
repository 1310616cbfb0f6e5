use anyhow::Result;
use async_trait::async_trait;

use crate::error::TrackerError;
use daytrack_config::Config;

mod fixed;
#[cfg(target_os = "windows")]
mod windows;

pub use fixed::FixedLocator;
#[cfg(target_os = "windows")]
pub use windows::WindowsLocator;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A source of on-demand location fixes. One invocation of the sampler
/// requests exactly one fix; there is no update subscription to manage.
#[async_trait]
pub trait Locator: Send + Sync {
    async fn request_fix(&self) -> Result<Location, TrackerError>;
}

/// Returns the locator for the platform we run on: the system geolocation
/// service on Windows, the configured fixed coordinate everywhere else.
pub fn platform_locator(config: &dyn Config) -> Result<Box<dyn Locator>> {
    #[cfg(target_os = "windows")]
    {
        let _ = config;
        Ok(Box::new(WindowsLocator::new()?))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Ok(Box::new(FixedLocator::from_config(config)?))
    }
}
