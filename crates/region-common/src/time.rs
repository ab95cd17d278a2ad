//! Timestamp helpers for gridded model output.
//!
//! Model files carry their valid time either in the file name (WRF
//! `wrfout_d01_2024-02-01_00:00:00`, WRF-Hydro `202402010000.CHRTOUT_DOMAIN1`)
//! or in a CF-style time variable (`hours since 2024-02-01 00:00:00`, GPM
//! IMERG `Grid/time` in `seconds since 1970-01-01 00:00:00 UTC`).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegionError, RegionResult};

/// Unit of a CF `"<unit> since <epoch>"` time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Parse a CF unit word (case-insensitive, singular or plural).
    pub fn parse(unit: &str) -> RegionResult<Self> {
        match unit.trim().to_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Ok(Self::Seconds),
            "minutes" | "minute" | "mins" | "min" => Ok(Self::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Ok(Self::Hours),
            "days" | "day" | "d" => Ok(Self::Days),
            other => Err(RegionError::UnsupportedTimeUnits(other.to_string())),
        }
    }

    /// Number of seconds in one unit.
    pub fn seconds(&self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
            Self::Days => 86400.0,
        }
    }
}

/// A parsed CF time axis definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    pub unit: TimeUnit,
    pub epoch: DateTime<Utc>,
}

impl CfTimeUnits {
    /// Parse a CF `units` attribute such as `"seconds since 1970-01-01 00:00:00 UTC"`.
    pub fn parse(units: &str) -> RegionResult<Self> {
        let (unit, base) = units
            .split_once(" since ")
            .ok_or_else(|| RegionError::UnsupportedTimeUnits(units.to_string()))?;

        let base = base
            .trim()
            .trim_end_matches("UTC")
            .trim_end_matches('Z')
            .trim();

        Ok(Self {
            unit: TimeUnit::parse(unit)?,
            epoch: parse_timestamp(base)?,
        })
    }

    /// Convert an offset on this axis to an absolute time (millisecond precision).
    pub fn to_datetime(&self, offset: f64) -> RegionResult<DateTime<Utc>> {
        if !offset.is_finite() {
            return Err(RegionError::invalid_timestamp(
                offset.to_string(),
                "time offset is not finite",
            ));
        }

        let millis = (offset * self.unit.seconds() * 1000.0).round();
        let out_of_range =
            || RegionError::invalid_timestamp(offset.to_string(), "time offset out of range");
        if millis.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }

        Duration::try_milliseconds(millis as i64)
            .and_then(|delta| self.epoch.checked_add_signed(delta))
            .ok_or_else(out_of_range)
    }
}

/// Parse a timestamp written by this workspace or by the research scripts.
///
/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S`, `%Y-%m-%dT%H:%M:%S` and a bare
/// `%Y-%m-%d` date (midnight UTC).
pub fn parse_timestamp(s: &str) -> RegionResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(RegionError::invalid_timestamp(s, "unrecognised timestamp format"))
}

/// Extract a timestamp from a file name using a chrono pattern that covers
/// the whole name, e.g. `wrfout_d01_%Y-%m-%d_%H:%M:%S` or
/// `%Y%m%d%H%M.CHRTOUT_DOMAIN1`.
///
/// If the full name does not match, the name without its last extension is
/// tried, so `wrfout_d01_2024-02-01_00:00:00.nc` also works.
pub fn timestamp_from_filename(name: &str, pattern: &str) -> RegionResult<DateTime<Utc>> {
    let mut candidates = vec![name];
    if let Some((stem, _)) = name.rsplit_once('.') {
        candidates.push(stem);
    }

    for candidate in candidates {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, pattern) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
        if let Ok(date) = NaiveDate::parse_from_str(candidate, pattern) {
            if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&ndt));
            }
        }
    }

    Err(RegionError::invalid_timestamp(
        name,
        format!("file name does not match pattern '{}'", pattern),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrfout_filename() {
        let ts = timestamp_from_filename(
            "wrfout_d01_2024-02-01_06:00:00",
            "wrfout_d01_%Y-%m-%d_%H:%M:%S",
        )
        .unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_wrfout_filename_with_extension() {
        let ts = timestamp_from_filename(
            "wrfout_d02_2024-02-01_18:30:00.nc",
            "wrfout_d02_%Y-%m-%d_%H:%M:%S",
        )
        .unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 1, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_chrtout_filename() {
        let ts = timestamp_from_filename(
            "202402010100.CHRTOUT_DOMAIN1",
            "%Y%m%d%H%M.CHRTOUT_DOMAIN1",
        )
        .unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_filename_mismatch() {
        let err = timestamp_from_filename("notes.txt", "%Y%m%d%H").unwrap_err();
        assert!(matches!(err, RegionError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_cf_offset_out_of_range() {
        let units = CfTimeUnits::parse("days since 1970-01-01").unwrap();
        assert!(matches!(
            units.to_datetime(1e300),
            Err(RegionError::InvalidTimestamp { .. })
        ));
        // Fits in i64 milliseconds but not in a DateTime
        assert!(matches!(
            units.to_datetime(1e11),
            Err(RegionError::InvalidTimestamp { .. })
        ));
        assert!(units.to_datetime(-1e300).is_err());
        assert!(units.to_datetime(f64::NAN).is_err());
    }

    #[test]
    fn test_cf_units() {
        let units = CfTimeUnits::parse("hours since 2024-02-01 00:00:00").unwrap();
        assert_eq!(units.unit, TimeUnit::Hours);
        assert_eq!(
            units.to_datetime(1.5).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 1, 30, 0).unwrap()
        );

        let units = CfTimeUnits::parse("seconds since 1970-01-01 00:00:00 UTC").unwrap();
        assert_eq!(units.unit, TimeUnit::Seconds);

        assert!(CfTimeUnits::parse("fortnights since 2024-01-01").is_err());
        assert!(CfTimeUnits::parse("hours").is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 2, 1, 3, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-02-01 03:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-02-01T03:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-02-01T03:00:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-02-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }
}
