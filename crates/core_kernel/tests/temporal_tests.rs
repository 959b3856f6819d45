//! Resolved timestamp tests

use chrono::{TimeZone, Utc};
use core_kernel::{ResolvedTimestamp, TemporalError, TzAssumption};

#[test]
fn test_fractional_seconds_naive() {
    let ts = ResolvedTimestamp::parse("2024-01-11 10:30:00.250").unwrap();
    assert_eq!(ts.assumption, TzAssumption::TzAssumedUtc);
}

#[test]
fn test_us_slash_format_naive() {
    let ts = ResolvedTimestamp::parse("01/11/2024 10:30").unwrap();
    assert_eq!(ts.assumption, TzAssumption::TzAssumedUtc);
    assert_eq!(ts.utc, Utc.with_ymd_and_hms(2024, 1, 11, 10, 30, 0).unwrap());
}

#[test]
fn test_assumption_tags() {
    assert_eq!(TzAssumption::TzGiven.as_str(), "tz-given");
    assert_eq!(TzAssumption::TzAssumedUtc.as_str(), "tz-assumed-utc");
}

#[test]
fn test_confidence_ordering() {
    assert!(TzAssumption::TzGiven.confidence() > TzAssumption::TzAssumedUtc.confidence());
}

#[test]
fn test_empty_and_garbage_inputs() {
    assert_eq!(ResolvedTimestamp::parse(""), Err(TemporalError::Empty));
    assert!(matches!(
        ResolvedTimestamp::parse("not-a-date"),
        Err(TemporalError::Unparseable(_))
    ));
}

#[test]
fn test_is_after_strict() {
    let promised = ResolvedTimestamp::parse("2024-01-11T10:30:00Z").unwrap();
    let actual = ResolvedTimestamp::parse("2024-01-11T14:15:00Z").unwrap();
    assert!(actual.is_after(&promised));
    assert!(!promised.is_after(&actual));
}

#[test]
fn test_serde_round_trip() {
    let ts = ResolvedTimestamp::parse("2024-01-11T10:30:00Z").unwrap();
    let json = serde_json::to_string(&ts).unwrap();
    assert!(json.contains("tz-given"));
    let back: ResolvedTimestamp = serde_json::from_str(&json).unwrap();
    assert_eq!(ts, back);
}
