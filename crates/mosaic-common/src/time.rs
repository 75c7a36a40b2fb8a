//! Time handling for frame labels, request windows and tile source paths.
//!
//! Requests arrive in the tile service's local time (a fixed UTC offset with
//! no daylight saving). Frames are labelled with the local `HHMM` of their
//! timestamp, while the source URL is built from the matching UTC instant.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::{MosaicError, MosaicResult};

/// Input format for request datetimes.
pub const REQUEST_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Minutes past the hour at which source imagery is published.
pub const DEFAULT_ALLOWED_MINUTES: [u32; 2] = [15, 45];

/// Local offset of the tile service (IST, UTC+05:30), in minutes.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// A frame label: minutes since local midnight, rendered as `HHMM`.
///
/// Values past 23:59 are allowed so that per-minute relabelling near the end
/// of a day keeps increasing instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameTime(u32);

impl FrameTime {
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self(hour * 60 + minute)
    }

    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self::from_hm(dt.hour(), dt.minute())
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn add_minutes(&self, minutes: u32) -> Self {
        Self(self.0 + minutes)
    }

    /// Render as the zero-padded `HHMM` label.
    pub fn to_hhmm(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for FrameTime {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MosaicError::invalid(format!("'{}' is not an HHMM label", s)));
        }
        let hours: u32 = s[..2]
            .parse()
            .map_err(|_| MosaicError::invalid(format!("bad hours in '{}'", s)))?;
        let minutes: u32 = s[2..]
            .parse()
            .map_err(|_| MosaicError::invalid(format!("bad minutes in '{}'", s)))?;
        if minutes >= 60 {
            return Err(MosaicError::invalid(format!("minutes out of range in '{}'", s)));
        }
        Ok(Self::from_hm(hours, minutes))
    }
}

/// Build the fixed offset for a minute count east of UTC.
pub fn utc_offset(minutes_east: i32) -> MosaicResult<FixedOffset> {
    FixedOffset::east_opt(minutes_east * 60)
        .ok_or_else(|| MosaicError::invalid(format!("invalid UTC offset {} minutes", minutes_east)))
}

/// Parse a local request datetime (`YYYY-MM-DD HH:MM`).
pub fn parse_local_datetime(s: &str, offset: FixedOffset) -> MosaicResult<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), REQUEST_DATETIME_FORMAT).map_err(|e| {
        MosaicError::invalid(format!(
            "'{}' does not match {}: {}",
            s, REQUEST_DATETIME_FORMAT, e
        ))
    })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| MosaicError::invalid(format!("ambiguous local time '{}'", s)))
}

/// A validated start/end window of local request times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl RequestWindow {
    /// Parse and validate a request window.
    ///
    /// Both ends must fall on one of `allowed_minutes`, the start must not be
    /// after the end, and the window must stay within one local day so that
    /// frame labels remain strictly increasing.
    pub fn parse(
        start: &str,
        end: &str,
        offset: FixedOffset,
        allowed_minutes: &[u32],
    ) -> MosaicResult<Self> {
        let start = parse_local_datetime(start, offset)?;
        let end = parse_local_datetime(end, offset)?;

        for dt in [&start, &end] {
            if !allowed_minutes.contains(&dt.minute()) {
                return Err(MosaicError::invalid(format!(
                    "{} is not on an allowed minute mark {:?}",
                    dt.format("%H:%M"),
                    allowed_minutes
                )));
            }
        }

        if start > end {
            return Err(MosaicError::invalid("start time must not be after end time"));
        }

        if start.date_naive() != end.date_naive() {
            return Err(MosaicError::invalid(
                "time window must not cross local midnight",
            ));
        }

        Ok(Self { start, end })
    }

    /// Inclusive timestamps from start to end at `step_minutes` spacing.
    pub fn steps(&self, step_minutes: u32) -> Vec<DateTime<FixedOffset>> {
        let step = Duration::minutes(i64::from(step_minutes.max(1)));
        let mut steps = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            steps.push(current);
            current += step;
        }
        steps
    }
}

/// Date/time fragments used to template the tile source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTime {
    /// `YYYY/DDMON`, e.g. `2024/15JAN`
    pub folder_date: String,
    /// `DDMONYYYY`, e.g. `15JAN2024`
    pub file_date: String,
    /// UTC `HHMM`
    pub time: String,
}

impl SourceTime {
    pub fn from_local<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self::from_utc(&dt.with_timezone(&Utc))
    }

    pub fn from_utc(utc: &DateTime<Utc>) -> Self {
        Self {
            folder_date: utc.format("%Y/%d%b").to_string().to_uppercase(),
            file_date: utc.format("%d%b%Y").to_string().to_uppercase(),
            time: utc.format("%H%M").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        utc_offset(DEFAULT_UTC_OFFSET_MINUTES).unwrap()
    }

    #[test]
    fn test_frame_time_round_trip() {
        let t: FrameTime = "0915".parse().unwrap();
        assert_eq!(t.minutes(), 555);
        assert_eq!(t.to_hhmm(), "0915");
        assert_eq!(t.add_minutes(50).to_hhmm(), "1005");
    }

    #[test]
    fn test_frame_time_rejects_bad_labels() {
        assert!("915".parse::<FrameTime>().is_err());
        assert!("09a5".parse::<FrameTime>().is_err());
        assert!("0975".parse::<FrameTime>().is_err());
    }

    #[test]
    fn test_window_steps_inclusive() {
        let window =
            RequestWindow::parse("2024-01-15 09:15", "2024-01-15 10:45", ist(), &DEFAULT_ALLOWED_MINUTES)
                .unwrap();
        let labels: Vec<String> = window
            .steps(30)
            .iter()
            .map(|dt| FrameTime::from_datetime(dt).to_hhmm())
            .collect();
        assert_eq!(labels, vec!["0915", "0945", "1015", "1045"]);
    }

    #[test]
    fn test_window_rejects_off_mark_minutes() {
        let err =
            RequestWindow::parse("2024-01-15 09:20", "2024-01-15 10:45", ist(), &DEFAULT_ALLOWED_MINUTES)
                .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidInput(_)));
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let err =
            RequestWindow::parse("2024-01-15 10:45", "2024-01-15 09:15", ist(), &DEFAULT_ALLOWED_MINUTES)
                .unwrap_err();
        assert!(matches!(err, MosaicError::InvalidInput(_)));
    }

    #[test]
    fn test_source_time_is_utc() {
        let local = parse_local_datetime("2024-01-15 05:15", ist()).unwrap();
        let source = SourceTime::from_local(&local);
        assert_eq!(source.folder_date, "2024/14JAN");
        assert_eq!(source.file_date, "14JAN2024");
        assert_eq!(source.time, "2345");
    }
}
