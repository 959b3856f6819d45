//! Persisted ledger record shapes
//!
//! These are the typed rows the ledger writer upserts. Shipments are
//! identified by their natural key; audit results and claims hang off the
//! shipment identity.

use chrono::{DateTime, Utc};
use core_kernel::{AuditResultId, Money, ResolvedTimestamp, ShipmentId, TzAssumption};
use domain_audit::{Carrier, EligibilityDecision, ExceptionMatch, NormalizedInput, RuleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The natural key identifying a shipment across repeated ingestions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub carrier: Carrier,
    pub tracking_number: String,
}

impl NaturalKey {
    pub fn new(carrier: Carrier, tracking_number: impl Into<String>) -> Self {
        Self {
            carrier,
            tracking_number: tracking_number.into(),
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.carrier, self.tracking_number)
    }
}

/// A shipment as persisted in the ledger
///
/// Later ingestions update this row in place; there is never more than one
/// row per natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub key: NaturalKey,
    /// Service type as it appeared on the invoice
    pub service_type_raw: String,
    /// Normalized commitment lookup key
    pub service_type: String,
    pub shipped_at: ResolvedTimestamp,
    pub promised_delivery: ResolvedTimestamp,
    pub actual_delivery: ResolvedTimestamp,
    pub total_charged: Money,
    pub weight_value: Option<Decimal>,
    pub weight_unit: Option<String>,
    /// Opaque passthrough from the extraction layer
    pub raw_metadata: serde_json::Value,
}

/// A shipment row with its storage identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredShipment {
    pub id: ShipmentId,
    pub record: ShipmentRecord,
}

/// The single audit result for a shipment
///
/// Re-audits overwrite this record; it is a correction, not history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub is_eligible: bool,
    pub variance_amount: Money,
    pub failure_reason: Option<String>,
    pub rule_id: RuleId,
    pub audited_at: DateTime<Utc>,
    /// Provenance of the time comparison
    pub timezone_assumption: TzAssumption,
    pub timezone_confidence: f32,
    /// Provenance of exception matching
    pub exception_category: Option<String>,
    pub exception_signal: Option<String>,
}

impl AuditRecord {
    /// Builds the audit record from a decision and its provenance
    pub fn from_decision(
        input: &NormalizedInput,
        decision: &EligibilityDecision,
        exception: &ExceptionMatch,
        audited_at: DateTime<Utc>,
    ) -> Self {
        Self {
            is_eligible: decision.is_eligible,
            variance_amount: decision.variance_amount,
            failure_reason: decision.failure_reason.clone(),
            rule_id: decision.rule_id,
            audited_at,
            timezone_assumption: input.delivery_assumption(),
            timezone_confidence: input.delivery_confidence(),
            exception_category: exception.category.clone(),
            exception_signal: exception.signal.clone(),
        }
    }
}

/// An audit result row with its storage identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAuditResult {
    pub id: AuditResultId,
    pub shipment_id: ShipmentId,
    pub record: AuditRecord,
}
