//! UTC-resolved timestamps with timezone provenance
//!
//! Carrier invoices and tracking feeds mix timezone-aware and naive
//! timestamps. Every timestamp entering the audit pipeline is normalized to
//! UTC here and tagged with how that normalization was obtained, so the
//! decision engine can refuse to trust thin margins built on guesswork.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a timestamp's UTC value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TzAssumption {
    /// The source carried an explicit offset or zone designator
    TzGiven,
    /// The source was naive; the value was assumed to already be UTC
    TzAssumedUtc,
}

impl TzAssumption {
    /// Confidence that the UTC value reflects the real instant
    pub fn confidence(&self) -> f32 {
        match self {
            TzAssumption::TzGiven => 1.0,
            TzAssumption::TzAssumedUtc => 0.7,
        }
    }

    /// Stable tag recorded on audit results
    pub fn as_str(&self) -> &'static str {
        match self {
            TzAssumption::TzGiven => "tz-given",
            TzAssumption::TzAssumedUtc => "tz-assumed-utc",
        }
    }
}

/// Errors related to timestamp resolution
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unparseable timestamp: {0}")]
    Unparseable(String),

    #[error("Empty timestamp")]
    Empty,
}

/// A timestamp resolved to UTC, carrying its resolution provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTimestamp {
    pub utc: DateTime<Utc>,
    pub assumption: TzAssumption,
}

// Naive formats seen on carrier invoices and CSV exports.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

impl ResolvedTimestamp {
    /// Wraps a timestamp that arrived with an explicit timezone
    pub fn given(utc: DateTime<Utc>) -> Self {
        Self {
            utc,
            assumption: TzAssumption::TzGiven,
        }
    }

    /// Wraps a naive timestamp, assuming it was already UTC
    pub fn assumed_utc(naive: NaiveDateTime) -> Self {
        Self {
            utc: DateTime::from_naive_utc_and_offset(naive, Utc),
            assumption: TzAssumption::TzAssumedUtc,
        }
    }

    /// Parses a raw timestamp string, preferring explicit-offset forms
    ///
    /// RFC 3339 input resolves with full confidence. Naive input falls back
    /// to the assumed-UTC interpretation at reduced confidence. Anything
    /// else is an error; timestamps are never silently defaulted.
    pub fn parse(raw: &str) -> Result<Self, TemporalError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TemporalError::Empty);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::given(dt.with_timezone(&Utc)));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self::assumed_utc(naive));
            }
        }

        Err(TemporalError::Unparseable(trimmed.to_string()))
    }

    /// Confidence that the UTC value reflects the real instant
    pub fn confidence(&self) -> f32 {
        self.assumption.confidence()
    }

    /// Absolute distance to another resolved timestamp, in whole minutes
    pub fn minutes_from(&self, other: &ResolvedTimestamp) -> i64 {
        (self.utc - other.utc).num_minutes().abs()
    }

    /// Strictly-after comparison; equal instants are not "after"
    pub fn is_after(&self, other: &ResolvedTimestamp) -> bool {
        self.utc > other.utc
    }
}
