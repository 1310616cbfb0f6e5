use async_trait::async_trait;
use windows::Devices::Geolocation::{BasicGeoposition, Geolocator};

use super::{Location, Locator};
use crate::error::TrackerError;

// https://docs.microsoft.com/en-us/uwp/api/windows.devices.geolocation.geolocator
pub(crate) struct WindowsLocator {
    loc: Geolocator,
}

impl WindowsLocator {
    pub fn new() -> Result<Self, TrackerError> {
        let loc = Geolocator::new().map_err(to_tracker_error)?;
        Ok(Self { loc })
    }
}

impl From<&BasicGeoposition> for Location {
    fn from(pos: &BasicGeoposition) -> Self {
        Location::new(pos.Latitude, pos.Longitude)
    }
}

fn to_tracker_error(e: windows::core::Error) -> TrackerError {
    // 0x80070005 is E_ACCESSDENIED, raised when location access is off
    if e.code() == windows::core::HRESULT(0x80070005u32 as i32) {
        TrackerError::PermissionDenied(e.message().to_string())
    } else {
        TrackerError::FixUnavailable(e.message().to_string())
    }
}

#[async_trait]
impl Locator for WindowsLocator {
    async fn request_fix(&self) -> Result<Location, TrackerError> {
        let position = self
            .loc
            .GetGeopositionAsync()
            .map_err(to_tracker_error)?
            .await
            .map_err(to_tracker_error)?;
        let position = position
            .Coordinate()
            .and_then(|c| c.Point())
            .and_then(|p| p.Position())
            .map_err(to_tracker_error)?;
        let location = Location::from(&position);
        log::debug!("location: {location:?}");
        Ok(location)
    }
}
