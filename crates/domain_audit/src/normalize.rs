//! Normalization layer
//!
//! Canonicalizes raw carrier and service-type strings and resolves every
//! timestamp to UTC with a provenance tag. Pure functions with no side
//! effects; the same raw input always normalizes identically, which the
//! idempotent ledger write depends on.

use core_kernel::{ResolvedTimestamp, TzAssumption};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuditError;

/// Supported carriers
///
/// Unrecognized carriers are a terminal input error, not a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Carrier {
    FedEx,
    Ups,
}

impl Carrier {
    /// Canonical tag used as part of the shipment natural key
    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::FedEx => "FEDEX",
            Carrier::Ups => "UPS",
        }
    }

    /// Canonicalizes a raw carrier string
    ///
    /// Invoice extracts are messy ("FedEx Express", "UPS Ground Inc."), so
    /// matching is by containment on the upper-cased input. FedEx is tested
    /// first; no real carrier string contains both tokens.
    pub fn from_raw(raw: &str) -> Result<Self, AuditError> {
        let upper = raw.trim().to_uppercase();
        if upper.contains("FEDEX") {
            Ok(Carrier::FedEx)
        } else if upper.contains("UPS") {
            Ok(Carrier::Ups)
        } else {
            Err(AuditError::InvalidCarrier(raw.trim().to_string()))
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Carrier {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_raw(s)
    }
}

/// Normalizes a raw service-type string into a deterministic lookup key
///
/// Trimmed, upper-cased, internal whitespace collapsed to single spaces.
pub fn normalize_service_type(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonicalized audit input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInput {
    pub carrier: Carrier,
    /// Normalized service type, used as the commitment lookup key
    pub service_type: String,
    pub shipped_at: ResolvedTimestamp,
    pub promised_delivery: ResolvedTimestamp,
    pub actual_delivery: ResolvedTimestamp,
}

impl NormalizedInput {
    /// Combined timezone confidence of the delivery comparison
    ///
    /// The minimum of the two sides: one assumed timezone is enough to
    /// distrust a thin lateness margin.
    pub fn delivery_confidence(&self) -> f32 {
        self.promised_delivery
            .confidence()
            .min(self.actual_delivery.confidence())
    }

    /// Worst-case assumption across the delivery comparison, recorded as
    /// provenance on the audit result
    pub fn delivery_assumption(&self) -> TzAssumption {
        if self.promised_delivery.assumption == TzAssumption::TzAssumedUtc
            || self.actual_delivery.assumption == TzAssumption::TzAssumedUtc
        {
            TzAssumption::TzAssumedUtc
        } else {
            TzAssumption::TzGiven
        }
    }
}

/// Canonicalizes carrier, service type, and the three shipment timestamps
pub fn normalize(
    carrier_raw: &str,
    service_type_raw: &str,
    shipped_at_raw: &str,
    promised_delivery_raw: &str,
    actual_delivery_raw: &str,
) -> Result<NormalizedInput, AuditError> {
    let carrier = Carrier::from_raw(carrier_raw)?;
    let service_type = normalize_service_type(service_type_raw);

    Ok(NormalizedInput {
        carrier,
        service_type,
        shipped_at: parse_field("shipped_at", shipped_at_raw)?,
        promised_delivery: parse_field("promised_delivery", promised_delivery_raw)?,
        actual_delivery: parse_field("actual_delivery", actual_delivery_raw)?,
    })
}

fn parse_field(field: &'static str, raw: &str) -> Result<ResolvedTimestamp, AuditError> {
    ResolvedTimestamp::parse(raw).map_err(|source| AuditError::InvalidTimestamp { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::TzAssumption;

    #[test]
    fn test_carrier_containment_match() {
        assert_eq!(Carrier::from_raw("FedEx Express").unwrap(), Carrier::FedEx);
        assert_eq!(Carrier::from_raw("  ups ground ").unwrap(), Carrier::Ups);
    }

    #[test]
    fn test_unknown_carrier_is_terminal() {
        let err = Carrier::from_raw("DHL").unwrap_err();
        assert_eq!(err, AuditError::InvalidCarrier("DHL".to_string()));
    }

    #[test]
    fn test_service_type_normalization() {
        assert_eq!(
            normalize_service_type("  priority   overnight "),
            "PRIORITY OVERNIGHT"
        );
        assert_eq!(normalize_service_type("Ground"), "GROUND");
        assert_eq!(normalize_service_type("2nd\tDay\n Air"), "2ND DAY AIR");
    }

    #[test]
    fn test_normalize_tags_each_timestamp() {
        let input = normalize(
            "FedEx",
            "Priority Overnight",
            "2024-01-08T09:00:00Z",
            "2024-01-11T10:30:00Z",
            "2024-01-11T14:15:00",
        )
        .unwrap();

        assert_eq!(input.promised_delivery.assumption, TzAssumption::TzGiven);
        assert_eq!(input.actual_delivery.assumption, TzAssumption::TzAssumedUtc);
        assert!(input.delivery_confidence() < 1.0);
    }

    #[test]
    fn test_normalize_rejects_bad_timestamp() {
        let err = normalize("UPS", "Ground", "garbage", "2024-01-11T10:30:00Z", "2024-01-11T14:15:00Z")
            .unwrap_err();
        assert!(matches!(
            err,
            AuditError::InvalidTimestamp { field: "shipped_at", .. }
        ));
    }
}
