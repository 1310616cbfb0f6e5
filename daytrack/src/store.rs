use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::TrackerError;

mod memory;
mod rtdb;

pub use memory::MemoryStore;
pub use rtdb::RtdbStore;

/// Remote keyed store the samples are recorded in. Writing the same path
/// twice overwrites, so same-minute samples collapse into one record.
#[async_trait]
pub trait TrackStore: Send + Sync {
    async fn write(&self, path: &str, value: &str) -> Result<(), TrackerError>;
}

/// Composes the record path for an identifier and a local timestamp:
/// `id/dd-mm-yyyy/HH:MM`.
pub fn record_path(id: &str, when: NaiveDateTime) -> String {
    format!(
        "{}/{}/{}",
        id,
        when.format("%d-%m-%Y"),
        when.format("%H:%M")
    )
}

#[test]
fn test_record_path_format() {
    let when = chrono::NaiveDate::from_ymd_opt(2026, 8, 7)
        .unwrap()
        .and_hms_opt(10, 15, 42)
        .unwrap();
    assert_eq!(record_path("U1", when), "U1/07-08-2026/10:15");
}

#[test]
fn test_record_path_zero_pads() {
    let when = chrono::NaiveDate::from_ymd_opt(2026, 1, 3)
        .unwrap()
        .and_hms_opt(6, 5, 0)
        .unwrap();
    assert_eq!(record_path("someone", when), "someone/03-01-2026/06:05");
}
