//! Timestamp extraction for the model output naming schemes.

use chrono::{TimeZone, Utc};
use region_common::time::{timestamp_from_filename, CfTimeUnits};
use test_utils::fixtures::time;

#[test]
fn test_wrf_history_name() {
    let ts = timestamp_from_filename(time::WRF_FILENAME, time::WRF_PATTERN).unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap());
}

#[test]
fn test_chrtout_name() {
    let ts = timestamp_from_filename(time::CHRTOUT_FILENAME, time::CHRTOUT_PATTERN).unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap());
}

#[test]
fn test_chrtout_pattern_rejects_wrf_name() {
    assert!(timestamp_from_filename(time::WRF_FILENAME, time::CHRTOUT_PATTERN).is_err());
}

#[test]
fn test_gpm_epoch_seconds() {
    let units = CfTimeUnits::parse("seconds since 1970-01-01 00:00:00 UTC").unwrap();
    let ts = units.to_datetime(time::REFERENCE_EPOCH + 1800.0).unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 1, 0, 30, 0).unwrap());
}
