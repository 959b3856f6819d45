//! Idempotent ledger writer
//!
//! Persists the shipment, its single audit result, and the optional claim
//! as three natural-key upserts. The steps commit independently; a crash
//! between steps leaves a partial state that the next ingestion of the
//! same tracking number repairs, so no compensating transaction exists.

use core_kernel::{AuditResultId, ClaimId, PortError, ShipmentId};
use domain_claims::{Claim, ClaimStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::ports::LedgerStore;
use crate::records::{AuditRecord, ShipmentRecord};

/// What happened to the claim slot during a ledger write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "outcome", content = "claim_id")]
pub enum ClaimOutcome {
    /// Eligible, no prior claim: a DRAFT claim was created
    DraftCreated(ClaimId),
    /// Eligible, prior DRAFT claim: amount and reason refreshed
    DraftRevised(ClaimId),
    /// A prior claim exists but was not touched (already filed, or the
    /// shipment is no longer eligible)
    LeftUntouched(ClaimId),
    /// Not eligible and no claim exists
    Skipped,
}

/// Identities produced by one ledger write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub shipment_id: ShipmentId,
    pub audit_id: AuditResultId,
    pub claim: ClaimOutcome,
}

/// Drives the three-step upsert protocol against an injected store
#[derive(Debug, Clone)]
pub struct LedgerWriter<S> {
    store: S,
}

impl<S: LedgerStore> LedgerWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconciles one audited shipment into the ledger
    pub async fn write(
        &self,
        shipment: &ShipmentRecord,
        audit: &AuditRecord,
    ) -> Result<LedgerReceipt, LedgerError> {
        let shipment_id = self.upsert_shipment(shipment).await?;
        let audit_id = self.upsert_audit_result(shipment_id, audit).await?;
        let claim = self.reconcile_claim(shipment_id, audit_id, audit).await?;

        info!(
            natural_key = %shipment.key,
            rule_id = %audit.rule_id,
            is_eligible = audit.is_eligible,
            %shipment_id,
            "ledger write complete"
        );

        Ok(LedgerReceipt {
            shipment_id,
            audit_id,
            claim,
        })
    }

    /// Step 1: one shipment row per natural key
    ///
    /// A Conflict on insert means a concurrent ingestion won the race for
    /// a brand-new tracking number; the row now exists, so retry as an
    /// update.
    async fn upsert_shipment(&self, record: &ShipmentRecord) -> Result<ShipmentId, LedgerError> {
        if let Some(existing) = self.store.find_shipment(&record.key).await? {
            self.store.update_shipment(existing.id, record).await?;
            return Ok(existing.id);
        }

        match self.store.insert_shipment(record).await {
            Ok(id) => Ok(id),
            Err(err) if err.is_conflict() => {
                warn!(natural_key = %record.key, "lost shipment insert race; retrying as update");
                let existing = self
                    .store
                    .find_shipment(&record.key)
                    .await?
                    .ok_or_else(|| {
                        PortError::internal("shipment vanished after duplicate-key conflict")
                    })?;
                self.store.update_shipment(existing.id, record).await?;
                Ok(existing.id)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Step 2: exactly one audit result per shipment, overwritten on
    /// re-audit
    async fn upsert_audit_result(
        &self,
        shipment_id: ShipmentId,
        record: &AuditRecord,
    ) -> Result<AuditResultId, LedgerError> {
        if let Some(existing) = self.store.find_audit_result(shipment_id).await? {
            self.store.update_audit_result(existing.id, record).await?;
            return Ok(existing.id);
        }

        match self.store.insert_audit_result(shipment_id, record).await {
            Ok(id) => Ok(id),
            Err(err) if err.is_conflict() => {
                let existing = self
                    .store
                    .find_audit_result(shipment_id)
                    .await?
                    .ok_or_else(|| {
                        PortError::internal("audit result vanished after duplicate-key conflict")
                    })?;
                self.store.update_audit_result(existing.id, record).await?;
                Ok(existing.id)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Step 3: at most one claim per shipment, created only when eligible
    ///
    /// An ineligible re-audit leaves an existing claim untouched: the
    /// audit result is the source of truth, and a claim may already be
    /// filed with the carrier. Operators review via the warn event.
    async fn reconcile_claim(
        &self,
        shipment_id: ShipmentId,
        audit_id: AuditResultId,
        audit: &AuditRecord,
    ) -> Result<ClaimOutcome, LedgerError> {
        let existing = self.store.find_claim_for_shipment(shipment_id).await?;

        if !audit.is_eligible {
            return Ok(match existing {
                Some(claim) => {
                    warn!(
                        %shipment_id,
                        claim_id = %claim.id,
                        claim_status = %claim.status,
                        rule_id = %audit.rule_id,
                        "shipment no longer eligible; existing claim left untouched"
                    );
                    ClaimOutcome::LeftUntouched(claim.id)
                }
                None => ClaimOutcome::Skipped,
            });
        }

        match existing {
            Some(mut claim) if claim.status == ClaimStatus::Draft => {
                claim.revise(audit.variance_amount, audit.failure_reason.clone())?;
                self.store.update_claim(&claim).await?;
                Ok(ClaimOutcome::DraftRevised(claim.id))
            }
            Some(claim) => {
                warn!(
                    %shipment_id,
                    claim_id = %claim.id,
                    claim_status = %claim.status,
                    "claim already filed; re-audit does not revise it"
                );
                Ok(ClaimOutcome::LeftUntouched(claim.id))
            }
            None => {
                let claim = Claim::draft(
                    shipment_id,
                    audit_id,
                    audit.variance_amount,
                    audit.failure_reason.clone(),
                );
                let claim_id = claim.id;
                match self.store.insert_claim(&claim).await {
                    Ok(()) => Ok(ClaimOutcome::DraftCreated(claim_id)),
                    Err(err) if err.is_conflict() => {
                        // Concurrent ingestion created the claim first.
                        let winner = self
                            .store
                            .find_claim_for_shipment(shipment_id)
                            .await?
                            .ok_or_else(|| {
                                PortError::internal("claim vanished after duplicate-key conflict")
                            })?;
                        Ok(ClaimOutcome::LeftUntouched(winner.id))
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}
