//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AuditResultId, ClaimId, Money, ShipmentId};

use crate::error::ClaimError;

/// Claim status
///
/// DISPUTED is entered by an external operator action when the carrier
/// pushes back on a submitted claim; the core only needs to accept it as a
/// reachable intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Created from an eligible audit, not yet filed
    Draft,
    /// Included in a dispute batch filed with the carrier
    Submitted,
    /// Carrier contested the claim
    Disputed,
    /// Carrier credited a recovery amount
    Recovered,
    /// Carrier rejected the claim
    Denied,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "DRAFT",
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::Disputed => "DISPUTED",
            ClaimStatus::Recovered => "RECOVERED",
            ClaimStatus::Denied => "DENIED",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Recovered | ClaimStatus::Denied)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ClaimStatus::Draft),
            "SUBMITTED" => Ok(ClaimStatus::Submitted),
            "DISPUTED" => Ok(ClaimStatus::Disputed),
            "RECOVERED" => Ok(ClaimStatus::Recovered),
            "DENIED" => Ok(ClaimStatus::Denied),
            other => Err(ClaimError::UnknownStatus(other.to_string())),
        }
    }
}

/// A refund claim against a carrier
///
/// Zero-or-one per shipment, created only when the audit found the
/// shipment eligible. References its shipment and audit result by id; it
/// is a derived workflow object, never the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub shipment_id: ShipmentId,
    pub audit_id: AuditResultId,
    pub status: ClaimStatus,
    /// Equal to the audit variance at creation
    pub claim_amount: Money,
    pub reason: Option<String>,
    /// Carrier-assigned case reference, known after submission at earliest
    pub carrier_case_number: Option<String>,
    /// Set only when the claim is RECOVERED
    pub recovery_amount: Option<Money>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a new DRAFT claim for an eligible shipment
    pub fn draft(
        shipment_id: ShipmentId,
        audit_id: AuditResultId,
        claim_amount: Money,
        reason: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClaimId::new_v7(),
            shipment_id,
            audit_id,
            status: ClaimStatus::Draft,
            claim_amount,
            reason,
            carrier_case_number: None,
            recovery_amount: None,
            created_at: now,
            submitted_at: None,
            settled_at: None,
            updated_at: now,
        }
    }

    /// Updates amount and reason from a re-audit while still in DRAFT
    ///
    /// Claims already filed with the carrier are never revised; the audit
    /// result carries the corrected numbers.
    pub fn revise(&mut self, claim_amount: Money, reason: Option<String>) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Draft {
            return Err(self.invalid_transition(ClaimStatus::Draft));
        }
        self.claim_amount = claim_amount;
        self.reason = reason;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the claim SUBMITTED as part of a dispute batch
    pub fn submit(&mut self) -> Result<(), ClaimError> {
        self.transition(ClaimStatus::Submitted)?;
        self.submitted_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the claim DISPUTED after carrier pushback
    pub fn mark_disputed(&mut self, carrier_case_number: Option<String>) -> Result<(), ClaimError> {
        self.transition(ClaimStatus::Disputed)?;
        if carrier_case_number.is_some() {
            self.carrier_case_number = carrier_case_number;
        }
        Ok(())
    }

    /// Settles the claim as RECOVERED or DENIED
    ///
    /// Any other target status is rejected before any state change, as is
    /// RECOVERED without a recovery amount.
    pub fn reconcile(
        &mut self,
        target: ClaimStatus,
        recovery_amount: Option<Money>,
        carrier_case_number: Option<String>,
    ) -> Result<(), ClaimError> {
        match target {
            ClaimStatus::Recovered => {
                let amount = recovery_amount.ok_or(ClaimError::MissingRecoveryAmount)?;
                self.transition(ClaimStatus::Recovered)?;
                self.recovery_amount = Some(amount);
            }
            ClaimStatus::Denied => {
                self.transition(ClaimStatus::Denied)?;
            }
            other => {
                return Err(ClaimError::InvalidReconciliationStatus(other.to_string()));
            }
        }
        self.settled_at = Some(Utc::now());
        if carrier_case_number.is_some() {
            self.carrier_case_number = carrier_case_number;
        }
        Ok(())
    }

    fn transition(&mut self, target: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(target) {
            return Err(self.invalid_transition(target));
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if a transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Draft, Submitted)
                | (Submitted, Disputed)
                | (Submitted, Recovered)
                | (Submitted, Denied)
                | (Disputed, Recovered)
                | (Disputed, Denied)
        )
    }

    fn invalid_transition(&self, target: ClaimStatus) -> ClaimError {
        ClaimError::InvalidStatusTransition {
            from: self.status.to_string(),
            to: target.to_string(),
        }
    }
}
