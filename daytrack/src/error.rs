use thiserror::Error;

/// Errors a single sampling invocation can end with. All of these are
/// invocation-local: the caller logs them and waits for the next tick.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("location permission denied: {0}")]
    PermissionDenied(String),

    #[error("location fix unavailable: {0}")]
    FixUnavailable(String),

    #[error("location fix timed out after {0}s")]
    FixTimeout(u64),

    #[error("invalid time-of-day '{0}', expected HH:MM")]
    WindowParse(String),

    #[error("reverse geocoding failed: {0}")]
    Geocode(String),

    #[error("store write failed: {0}")]
    Store(String),
}
