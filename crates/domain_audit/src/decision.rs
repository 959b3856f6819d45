//! Eligibility decision engine
//!
//! Combines lateness, guarantee status, exception status, and the
//! timezone-ambiguity gate into a single verdict with a monetary variance,
//! a narrative failure reason, and a rule identifier for the audit trail.
//!
//! `decide` is a pure function of its inputs: no clock, no randomness, no
//! hidden state. Identical inputs always yield an identical verdict, which
//! makes the idempotent ledger write safe to repeat.

use core_kernel::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::exceptions::ExceptionMatch;
use crate::normalize::NormalizedInput;

/// Identifies which rule path produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    RuleTzAmbiguousFailClosed,
    RuleExceptionRules,
    RuleServiceNotGuaranteed,
    RuleLateDelivery,
    RuleOnTime,
}

impl RuleId {
    /// Stable identifier recorded on audit results and log events
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::RuleTzAmbiguousFailClosed => "RULE_TZ_AMBIGUOUS_FAIL_CLOSED",
            RuleId::RuleExceptionRules => "RULE_EXCEPTION_RULES",
            RuleId::RuleServiceNotGuaranteed => "RULE_SERVICE_NOT_GUARANTEED",
            RuleId::RuleLateDelivery => "RULE_LATE_DELIVERY",
            RuleId::RuleOnTime => "RULE_ON_TIME",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RULE_TZ_AMBIGUOUS_FAIL_CLOSED" => Ok(RuleId::RuleTzAmbiguousFailClosed),
            "RULE_EXCEPTION_RULES" => Ok(RuleId::RuleExceptionRules),
            "RULE_SERVICE_NOT_GUARANTEED" => Ok(RuleId::RuleServiceNotGuaranteed),
            "RULE_LATE_DELIVERY" => Ok(RuleId::RuleLateDelivery),
            "RULE_ON_TIME" => Ok(RuleId::RuleOnTime),
            other => Err(format!("unknown rule id: {other}")),
        }
    }
}

/// Tunable decision policy
///
/// The ambiguity threshold has no derived rationale; it is an operator
/// policy knob, not a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPolicy {
    /// Margins thinner than this are untrusted when a timezone was assumed
    pub ambiguity_threshold_minutes: i64,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            ambiguity_threshold_minutes: 30,
        }
    }
}

/// The eligibility verdict for one shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub is_eligible: bool,
    /// Refundable delta: full charge when eligible, zero otherwise
    pub variance_amount: Money,
    pub failure_reason: Option<String>,
    pub rule_id: RuleId,
    pub is_late: bool,
}

/// Produces the eligibility verdict for a normalized shipment
///
/// Evaluation order is fixed and short-circuiting:
/// 1. Ambiguity gate: assumed timezone plus a delta under the threshold
///    forces not-eligible.
/// 2. Strict lateness test; equal timestamps are on time.
/// 3. Combined verdict with exactly one of four narrative outcomes.
/// 4. Binary variance: full refund or nothing.
pub fn decide(
    input: &NormalizedInput,
    guaranteed: bool,
    exception: &ExceptionMatch,
    total_charged: Money,
    policy: &AuditPolicy,
) -> EligibilityDecision {
    let delta_minutes = input.actual_delivery.minutes_from(&input.promised_delivery);
    let is_late = input.actual_delivery.is_after(&input.promised_delivery);

    if input.delivery_confidence() < 1.0 && delta_minutes < policy.ambiguity_threshold_minutes {
        return EligibilityDecision {
            is_eligible: false,
            variance_amount: Money::zero(total_charged.currency()),
            failure_reason: Some("Ambiguous delivery time (timezone)".to_string()),
            rule_id: RuleId::RuleTzAmbiguousFailClosed,
            is_late,
        };
    }

    if exception.found {
        let category = exception.category.as_deref().unwrap_or("OTHER");
        return EligibilityDecision {
            is_eligible: false,
            variance_amount: Money::zero(total_charged.currency()),
            failure_reason: Some(format!("Excusable Delay ({category})")),
            rule_id: RuleId::RuleExceptionRules,
            is_late,
        };
    }

    if !guaranteed {
        return EligibilityDecision {
            is_eligible: false,
            variance_amount: Money::zero(total_charged.currency()),
            failure_reason: Some("Non-guaranteed service".to_string()),
            rule_id: RuleId::RuleServiceNotGuaranteed,
            is_late,
        };
    }

    if is_late {
        EligibilityDecision {
            is_eligible: true,
            variance_amount: total_charged,
            failure_reason: Some("Late Delivery (GSR)".to_string()),
            rule_id: RuleId::RuleLateDelivery,
            is_late,
        }
    } else {
        EligibilityDecision {
            is_eligible: false,
            variance_amount: Money::zero(total_charged.currency()),
            failure_reason: None,
            rule_id: RuleId::RuleOnTime,
            is_late,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn charged() -> Money {
        Money::new(dec!(125.50), Currency::USD)
    }

    fn input(promised: &str, actual: &str) -> NormalizedInput {
        normalize("FEDEX", "PRIORITY OVERNIGHT", "2024-01-08T09:00:00Z", promised, actual).unwrap()
    }

    #[test]
    fn test_ambiguity_gate_overrides_everything() {
        // Naive timestamps, 20-minute delta: below the 30-minute threshold.
        let input = input("2024-01-11T10:30:00", "2024-01-11T10:50:00");
        let d = decide(&input, true, &ExceptionMatch::not_found(), charged(), &AuditPolicy::default());

        assert!(!d.is_eligible);
        assert_eq!(d.rule_id, RuleId::RuleTzAmbiguousFailClosed);
        assert_eq!(d.failure_reason.as_deref(), Some("Ambiguous delivery time (timezone)"));
        assert!(d.variance_amount.is_zero());
    }

    #[test]
    fn test_ambiguity_gate_opens_past_threshold() {
        // Naive timestamps but a 225-minute delta: the margin is trusted.
        let input = input("2024-01-11T10:30:00", "2024-01-11T14:15:00");
        let d = decide(&input, true, &ExceptionMatch::not_found(), charged(), &AuditPolicy::default());

        assert!(d.is_eligible);
        assert_eq!(d.rule_id, RuleId::RuleLateDelivery);
    }

    #[test]
    fn test_exception_overrides_lateness() {
        let input = input("2024-01-11T10:30:00Z", "2024-01-11T14:15:00Z");
        let exception = ExceptionMatch::matched("WEATHER", "FALLBACK:WEATHER");
        let d = decide(&input, true, &exception, charged(), &AuditPolicy::default());

        assert!(!d.is_eligible);
        assert_eq!(d.rule_id, RuleId::RuleExceptionRules);
        assert_eq!(d.failure_reason.as_deref(), Some("Excusable Delay (WEATHER)"));
        assert!(d.variance_amount.is_zero());
    }

    #[test]
    fn test_non_guaranteed_service() {
        let input = input("2024-01-11T10:30:00Z", "2024-01-11T14:15:00Z");
        let d = decide(&input, false, &ExceptionMatch::not_found(), charged(), &AuditPolicy::default());

        assert!(!d.is_eligible);
        assert_eq!(d.rule_id, RuleId::RuleServiceNotGuaranteed);
        assert_eq!(d.failure_reason.as_deref(), Some("Non-guaranteed service"));
    }

    #[test]
    fn test_late_guaranteed_no_exception_is_eligible() {
        let input = input("2024-01-11T10:30:00Z", "2024-01-11T14:15:00Z");
        let d = decide(&input, true, &ExceptionMatch::not_found(), charged(), &AuditPolicy::default());

        assert!(d.is_eligible);
        assert!(d.is_late);
        assert_eq!(d.rule_id, RuleId::RuleLateDelivery);
        assert_eq!(d.variance_amount, charged());
    }

    #[test]
    fn test_on_time_has_no_failure_reason() {
        let input = input("2024-01-11T10:30:00Z", "2024-01-11T10:30:00Z");
        let d = decide(&input, true, &ExceptionMatch::not_found(), charged(), &AuditPolicy::default());

        assert!(!d.is_eligible);
        assert!(!d.is_late);
        assert_eq!(d.rule_id, RuleId::RuleOnTime);
        assert_eq!(d.failure_reason, None);
    }

    #[test]
    fn test_rule_id_wire_format() {
        let json = serde_json::to_string(&RuleId::RuleTzAmbiguousFailClosed).unwrap();
        assert_eq!(json, "\"RULE_TZ_AMBIGUOUS_FAIL_CLOSED\"");
        assert_eq!(RuleId::RuleLateDelivery.as_str(), "RULE_LATE_DELIVERY");
        assert_eq!("RULE_ON_TIME".parse::<RuleId>().unwrap(), RuleId::RuleOnTime);
    }
}
