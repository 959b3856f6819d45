//! Ledger and enrichment ports
//!
//! `LedgerStore` is the persistence seam the writer drives. Implementations
//! must enforce natural-key uniqueness for shipments at the storage layer
//! and report a lost duplicate-insert race as `PortError::Conflict`; the
//! writer then retries that step as an update.

use async_trait::async_trait;
use core_kernel::{AuditResultId, ClaimId, DomainPort, PortError, ShipmentId};
use domain_audit::Carrier;
use domain_claims::{Claim, ClaimStatus};

use crate::records::{AuditRecord, NaturalKey, ShipmentRecord, StoredAuditResult, StoredShipment};

/// Persistent store for shipments, audit results, and claims
#[async_trait]
pub trait LedgerStore: DomainPort {
    async fn find_shipment(&self, key: &NaturalKey) -> Result<Option<StoredShipment>, PortError>;

    async fn get_shipment(&self, id: ShipmentId) -> Result<StoredShipment, PortError>;

    /// Inserts a new shipment row; a natural-key collision is a Conflict
    async fn insert_shipment(&self, record: &ShipmentRecord) -> Result<ShipmentId, PortError>;

    async fn update_shipment(&self, id: ShipmentId, record: &ShipmentRecord)
        -> Result<(), PortError>;

    async fn find_audit_result(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<StoredAuditResult>, PortError>;

    async fn insert_audit_result(
        &self,
        shipment_id: ShipmentId,
        record: &AuditRecord,
    ) -> Result<AuditResultId, PortError>;

    async fn update_audit_result(
        &self,
        id: AuditResultId,
        record: &AuditRecord,
    ) -> Result<(), PortError>;

    async fn find_claim_for_shipment(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<Claim>, PortError>;

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    async fn claims_with_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError>;

    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError>;

    async fn update_claim(&self, claim: &Claim) -> Result<(), PortError>;
}

/// Latest tracking event from a carrier API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEvent {
    pub status: String,
    pub description: String,
    pub exception_code: Option<String>,
    /// Raw timestamp string; resolved by the normalization layer
    pub timestamp: String,
}

/// Optional live-tracking enrichment
///
/// Never required for a valid decision: callers time-bound the call and
/// fall back to the caller-supplied data on any failure.
#[async_trait]
pub trait TrackingProbe: Send + Sync {
    async fn latest_event(
        &self,
        carrier: Carrier,
        tracking_number: &str,
    ) -> Result<Option<TrackingEvent>, PortError>;
}
