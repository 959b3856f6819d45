//! Carrier dispute batch artifact
//!
//! Submitting DRAFT claims to a carrier produces a dispute batch: one line
//! per claim in the shape carrier billing portals expect for bulk
//! service-failure disputes. Rendering the batch to a file is the export
//! layer's concern; this module owns the typed artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ClaimId, Money};

/// Dispute type used for all GSR lateness claims
pub const DISPUTE_TYPE_SERVICE_FAILURE: &str = "Service Failure (GSR)";

/// Reason code used for all GSR lateness claims
pub const REASON_CODE_LATE_DELIVERY: &str = "LATE_DELIVERY";

/// One claim as filed with the carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeLine {
    pub claim_id: ClaimId,
    pub tracking_number: String,
    pub carrier: String,
    pub dispute_type: String,
    pub claim_amount: Money,
    pub reason_code: String,
    /// Narrative shown to the carrier agent, e.g. promised vs actual
    pub notes: String,
}

impl DisputeLine {
    pub fn service_failure(
        claim_id: ClaimId,
        tracking_number: impl Into<String>,
        carrier: impl Into<String>,
        claim_amount: Money,
        promised: DateTime<Utc>,
        actual: DateTime<Utc>,
    ) -> Self {
        Self {
            claim_id,
            tracking_number: tracking_number.into(),
            carrier: carrier.into(),
            dispute_type: DISPUTE_TYPE_SERVICE_FAILURE.to_string(),
            claim_amount,
            reason_code: REASON_CODE_LATE_DELIVERY.to_string(),
            notes: format!(
                "Audit: Promised {} vs Actual {}",
                promised.to_rfc3339(),
                actual.to_rfc3339()
            ),
        }
    }
}

/// A batch of claims filed together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeBatch {
    pub id: BatchId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<DisputeLine>,
}

impl DisputeBatch {
    pub fn new(lines: Vec<DisputeLine>) -> Self {
        Self {
            id: BatchId::new_v7(),
            created_at: Utc::now(),
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total claimed value, when all lines share one currency
    pub fn total(&self) -> Option<Money> {
        let first = self.lines.first()?;
        let mut total = Money::zero(first.claim_amount.currency());
        for line in &self.lines {
            total = total.checked_add(&line.claim_amount).ok()?;
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_batch_total() {
        let promised = Utc::now();
        let actual = promised + chrono::Duration::hours(4);
        let lines = vec![
            DisputeLine::service_failure(
                ClaimId::new(),
                "794644790132",
                "FEDEX",
                Money::new(dec!(125.50), Currency::USD),
                promised,
                actual,
            ),
            DisputeLine::service_failure(
                ClaimId::new(),
                "1Z999AA10123456784",
                "UPS",
                Money::new(dec!(60.00), Currency::USD),
                promised,
                actual,
            ),
        ];

        let batch = DisputeBatch::new(lines);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.total().unwrap().amount(), dec!(185.50));
    }

    #[test]
    fn test_empty_batch_has_no_total() {
        let batch = DisputeBatch::new(vec![]);
        assert!(batch.is_empty());
        assert!(batch.total().is_none());
    }

    #[test]
    fn test_line_shape() {
        let promised = Utc::now();
        let line = DisputeLine::service_failure(
            ClaimId::new(),
            "794644790132",
            "FEDEX",
            Money::new(dec!(125.50), Currency::USD),
            promised,
            promised + chrono::Duration::hours(1),
        );
        assert_eq!(line.dispute_type, DISPUTE_TYPE_SERVICE_FAILURE);
        assert_eq!(line.reason_code, REASON_CODE_LATE_DELIVERY);
        assert!(line.notes.starts_with("Audit: Promised "));
    }
}
