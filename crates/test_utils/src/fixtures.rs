//! Pre-built Test Fixtures
//!
//! Reference data matching the published FedEx/UPS service guides closely
//! enough for realistic scenarios.

use chrono::{TimeZone, Utc};
use core_kernel::{CommitmentId, ExceptionRuleId};
use domain_audit::{Carrier, ExceptionRule, MatchType, ServiceCommitment};

use crate::memory::MemoryReferenceData;

/// Builds a commitment row current since Jan 1, 2023
pub fn commitment(carrier: Carrier, service_type: &str, guaranteed: bool) -> ServiceCommitment {
    ServiceCommitment {
        id: CommitmentId::new(),
        carrier,
        service_type: service_type.to_string(),
        guaranteed,
        valid_from: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        valid_to: None,
    }
}

/// Builds an exception rule
pub fn exception_rule(
    carrier: Carrier,
    match_type: MatchType,
    match_value: &str,
    excusable: bool,
    category: &str,
) -> ExceptionRule {
    ExceptionRule {
        id: ExceptionRuleId::new(),
        carrier,
        match_type,
        match_value: match_value.to_string(),
        excusable,
        category: category.to_string(),
    }
}

/// Standard reference data used by most service tests
///
/// Guaranteed: FedEx Priority Overnight, UPS Next Day Air.
/// Not guaranteed: FedEx Ground Economy, UPS Ground (suspended).
/// Exception rules: one excusable CODE per carrier plus an excusable
/// KEYWORD and a non-excusable CODE for tier-precedence tests.
pub fn standard_reference_data() -> MemoryReferenceData {
    let reference = MemoryReferenceData::new();

    reference.add_commitment(commitment(Carrier::FedEx, "PRIORITY OVERNIGHT", true));
    reference.add_commitment(commitment(Carrier::FedEx, "GROUND ECONOMY", false));
    reference.add_commitment(commitment(Carrier::Ups, "NEXT DAY AIR", true));
    reference.add_commitment(commitment(Carrier::Ups, "GROUND", false));

    reference.add_rule(exception_rule(
        Carrier::FedEx,
        MatchType::Code,
        "DE.WX",
        true,
        "WEATHER",
    ));
    reference.add_rule(exception_rule(
        Carrier::FedEx,
        MatchType::Code,
        "DE.ADDR",
        false,
        "ADDRESS",
    ));
    reference.add_rule(exception_rule(
        Carrier::Ups,
        MatchType::Code,
        "X4",
        true,
        "EMERGENCY",
    ));
    reference.add_rule(exception_rule(
        Carrier::Ups,
        MatchType::Keyword,
        "SEVERE WEATHER",
        true,
        "WEATHER",
    ));

    reference
}
