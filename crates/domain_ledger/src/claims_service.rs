//! Claim lifecycle services
//!
//! Operator-facing operations over the claim slot of the ledger: filing
//! the current DRAFT claims as one dispute batch, recording carrier
//! pushback, and settling claims as recovered or denied.

use core_kernel::{ClaimId, Money};
use domain_claims::{Claim, ClaimStatus, DisputeBatch, DisputeLine};
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::ports::LedgerStore;

/// Drives claim state changes against an injected store
pub struct ClaimsService<S> {
    store: S,
}

impl<S: LedgerStore> ClaimsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Files every DRAFT claim with its carrier as one dispute batch
    ///
    /// Each claim is marked SUBMITTED only after its dispute line is
    /// assembled; a claim whose shipment cannot be loaded is skipped with
    /// a warning and stays DRAFT for the next run.
    pub async fn submit_draft_batch(&self) -> Result<DisputeBatch, LedgerError> {
        let drafts = self.store.claims_with_status(ClaimStatus::Draft).await?;

        let mut lines = Vec::with_capacity(drafts.len());
        for mut claim in drafts {
            let shipment = match self.store.get_shipment(claim.shipment_id).await {
                Ok(shipment) => shipment,
                Err(err) => {
                    warn!(
                        claim_id = %claim.id,
                        shipment_id = %claim.shipment_id,
                        error = %err,
                        "shipment lookup failed; claim stays DRAFT"
                    );
                    continue;
                }
            };

            let line = DisputeLine::service_failure(
                claim.id,
                shipment.record.key.tracking_number.clone(),
                shipment.record.key.carrier.as_str(),
                claim.claim_amount,
                shipment.record.promised_delivery.utc,
                shipment.record.actual_delivery.utc,
            );

            claim.submit()?;
            self.store.update_claim(&claim).await?;
            lines.push(line);
        }

        let batch = DisputeBatch::new(lines);
        info!(
            batch_id = %batch.id,
            claims = batch.len(),
            "dispute batch assembled"
        );
        Ok(batch)
    }

    /// Records carrier pushback on a submitted claim
    pub async fn mark_disputed(
        &self,
        claim_id: ClaimId,
        carrier_case_number: Option<String>,
    ) -> Result<Claim, LedgerError> {
        let mut claim = self.store.get_claim(claim_id).await?;
        claim.mark_disputed(carrier_case_number)?;
        self.store.update_claim(&claim).await?;
        info!(%claim_id, "claim marked disputed");
        Ok(claim)
    }

    /// Settles a claim as RECOVERED or DENIED
    ///
    /// Validation happens on the aggregate before any write: RECOVERED
    /// requires a recovery amount, and only RECOVERED/DENIED are
    /// acceptable targets.
    pub async fn reconcile(
        &self,
        claim_id: ClaimId,
        target: ClaimStatus,
        recovery_amount: Option<Money>,
        carrier_case_number: Option<String>,
    ) -> Result<Claim, LedgerError> {
        let mut claim = self.store.get_claim(claim_id).await?;
        claim.reconcile(target, recovery_amount, carrier_case_number)?;
        self.store.update_claim(&claim).await?;
        info!(%claim_id, status = %claim.status, "claim reconciled");
        Ok(claim)
    }
}
