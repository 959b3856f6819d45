//! PostgreSQL ledger adapter
//!
//! Implements `LedgerStore` over the shipments, audit results, and claims
//! repositories. Unique violations surface as `PortError::Conflict`, which
//! the ledger writer interprets as a lost insert race.

use async_trait::async_trait;
use core_kernel::{AuditResultId, ClaimId, DomainPort, PortError, ShipmentId};
use domain_claims::{Claim, ClaimStatus};
use domain_ledger::{
    AuditRecord, LedgerStore, NaturalKey, ShipmentRecord, StoredAuditResult, StoredShipment,
};
use sqlx::PgPool;

use crate::adapters::map_db_error;
use crate::repositories::{AuditResultsRepository, ClaimsRepository, ShipmentsRepository};

/// PostgreSQL-backed implementation of the `LedgerStore` port
#[derive(Debug, Clone)]
pub struct PostgresLedgerAdapter {
    shipments: ShipmentsRepository,
    audit_results: AuditResultsRepository,
    claims: ClaimsRepository,
}

impl PostgresLedgerAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            shipments: ShipmentsRepository::new(pool.clone()),
            audit_results: AuditResultsRepository::new(pool.clone()),
            claims: ClaimsRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresLedgerAdapter {}

#[async_trait]
impl LedgerStore for PostgresLedgerAdapter {
    async fn find_shipment(&self, key: &NaturalKey) -> Result<Option<StoredShipment>, PortError> {
        self.shipments
            .find_by_natural_key(key)
            .await
            .map_err(map_db_error)
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<StoredShipment, PortError> {
        match self.shipments.get_by_id(id).await {
            Ok(shipment) => Ok(shipment),
            Err(err) if err.is_not_found() => Err(PortError::not_found("Shipment", id)),
            Err(err) => Err(map_db_error(err)),
        }
    }

    async fn insert_shipment(&self, record: &ShipmentRecord) -> Result<ShipmentId, PortError> {
        self.shipments.insert(record).await.map_err(map_db_error)
    }

    async fn update_shipment(
        &self,
        id: ShipmentId,
        record: &ShipmentRecord,
    ) -> Result<(), PortError> {
        self.shipments.update(id, record).await.map_err(map_db_error)
    }

    async fn find_audit_result(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<StoredAuditResult>, PortError> {
        self.audit_results
            .find_by_shipment(shipment_id)
            .await
            .map_err(map_db_error)
    }

    async fn insert_audit_result(
        &self,
        shipment_id: ShipmentId,
        record: &AuditRecord,
    ) -> Result<AuditResultId, PortError> {
        self.audit_results
            .insert(shipment_id, record)
            .await
            .map_err(map_db_error)
    }

    async fn update_audit_result(
        &self,
        id: AuditResultId,
        record: &AuditRecord,
    ) -> Result<(), PortError> {
        self.audit_results
            .update(id, record)
            .await
            .map_err(map_db_error)
    }

    async fn find_claim_for_shipment(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<Claim>, PortError> {
        self.claims
            .find_by_shipment(shipment_id)
            .await
            .map_err(map_db_error)
    }

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        match self.claims.get_by_id(id).await {
            Ok(claim) => Ok(claim),
            Err(err) if err.is_not_found() => Err(PortError::not_found("Claim", id)),
            Err(err) => Err(map_db_error(err)),
        }
    }

    async fn claims_with_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError> {
        self.claims
            .find_by_status(status)
            .await
            .map_err(map_db_error)
    }

    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError> {
        self.claims.insert(claim).await.map_err(map_db_error)
    }

    async fn update_claim(&self, claim: &Claim) -> Result<(), PortError> {
        self.claims.update(claim).await.map_err(map_db_error)
    }
}
