use std::fmt;

use chrono::NaiveTime;

use crate::error::TrackerError;

/// Daily time-of-day range during which sampling is permitted.
///
/// The range is half-open: the start is inclusive, the end exclusive.
/// An end bound of `24:00` (which no clock time can represent) marks the
/// window as running through the end of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingWindow {
    start: NaiveTime,
    /// `None` means the window extends to the end of the day.
    end: Option<NaiveTime>,
}

impl SamplingWindow {
    pub fn parse(start: &str, end: &str) -> Result<SamplingWindow, TrackerError> {
        let start = parse_time_of_day(start)?
            .ok_or_else(|| TrackerError::WindowParse(start.to_string()))?;
        let end = parse_time_of_day(end)?;
        Ok(SamplingWindow { start, end })
    }

    pub fn contains(&self, time_of_day: NaiveTime) -> bool {
        match self.end {
            Some(end) => self.start <= time_of_day && time_of_day < end,
            None => self.start <= time_of_day,
        }
    }
}

impl fmt::Display for SamplingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.format("%H:%M");
        match self.end {
            Some(end) => write!(f, "{start} to {}", end.format("%H:%M")),
            None => write!(f, "{start} to 24:00"),
        }
    }
}

/// Parses a `HH:MM` string, mapping the conventional `24:00` to `None`
/// since `NaiveTime` cannot represent it.
fn parse_time_of_day(s: &str) -> Result<Option<NaiveTime>, TrackerError> {
    if s == "24:00" {
        return Ok(None);
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .map(Some)
        .map_err(|_| TrackerError::WindowParse(s.to_string()))
}

#[cfg(test)]
fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

#[test]
fn test_window_contains() {
    let window = SamplingWindow::parse("06:00", "22:00").unwrap();

    assert!(window.contains(t("06:00")), "start is inclusive");
    assert!(window.contains(t("10:15")));
    assert!(window.contains(t("21:59")));
    assert!(!window.contains(t("22:00")), "end is exclusive");
    assert!(!window.contains(t("05:59")));
    assert!(!window.contains(t("23:30")));
    assert!(!window.contains(t("00:00")));
}

#[test]
fn test_window_until_end_of_day() {
    let window = SamplingWindow::parse("06:00", "24:00").unwrap();

    assert!(window.contains(t("06:00")));
    assert!(window.contains(t("23:59")));
    assert!(!window.contains(t("00:00")));
    assert!(!window.contains(t("05:59")));
}

#[test]
fn test_empty_window_contains_nothing() {
    let window = SamplingWindow::parse("12:00", "12:00").unwrap();
    assert!(!window.contains(t("12:00")));
    assert!(!window.contains(t("11:59")));
}

#[test]
fn test_window_parse_errors() {
    assert!(matches!(
        SamplingWindow::parse("6 o'clock", "22:00"),
        Err(TrackerError::WindowParse(_))
    ));
    assert!(matches!(
        SamplingWindow::parse("06:00", "25:00"),
        Err(TrackerError::WindowParse(_))
    ));
    // 24:00 only makes sense as an end bound
    assert!(matches!(
        SamplingWindow::parse("24:00", "24:00"),
        Err(TrackerError::WindowParse(_))
    ));
}

#[test]
fn test_window_display() {
    let window = SamplingWindow::parse("06:00", "24:00").unwrap();
    assert_eq!(window.to_string(), "06:00 to 24:00");
}
