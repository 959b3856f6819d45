//! In-memory port implementations
//!
//! Hash-map-backed stands-ins for the persistence and reference-data
//! ports. They enforce the same uniqueness rules as the database schema
//! (one shipment per natural key, one audit result per shipment, at most
//! one claim per shipment) so writer race handling and idempotence can be
//! tested without Postgres.

use async_trait::async_trait;
use core_kernel::{AuditResultId, ClaimId, DomainPort, PortError, ShipmentId};
use domain_audit::{
    Carrier, CommitmentStore, ExceptionRule, ExceptionRuleStore, ServiceCommitment,
};
use domain_claims::{Claim, ClaimStatus};
use domain_ledger::{
    AuditRecord, LedgerStore, NaturalKey, ShipmentRecord, StoredAuditResult, StoredShipment,
    TrackingEvent, TrackingProbe,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct LedgerState {
    shipments: HashMap<NaturalKey, StoredShipment>,
    audits: HashMap<ShipmentId, StoredAuditResult>,
    claims: HashMap<ShipmentId, Claim>,
}

/// In-memory ledger store
///
/// Clones share state, so a test can hand one clone to a service and
/// inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shipment_count(&self) -> usize {
        self.lock().shipments.len()
    }

    pub fn audit_count(&self) -> usize {
        self.lock().audits.len()
    }

    pub fn claim_count(&self) -> usize {
        self.lock().claims.len()
    }

    /// Seeds a claim directly, bypassing the writer
    pub fn seed_claim(&self, claim: Claim) {
        self.lock().claims.insert(claim.shipment_id, claim);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DomainPort for MemoryLedger {}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_shipment(&self, key: &NaturalKey) -> Result<Option<StoredShipment>, PortError> {
        Ok(self.lock().shipments.get(key).cloned())
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<StoredShipment, PortError> {
        self.lock()
            .shipments
            .values()
            .find(|stored| stored.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Shipment", id.to_string()))
    }

    async fn insert_shipment(&self, record: &ShipmentRecord) -> Result<ShipmentId, PortError> {
        let mut state = self.lock();
        if state.shipments.contains_key(&record.key) {
            return Err(PortError::conflict(format!(
                "shipment already exists: {}",
                record.key
            )));
        }
        let id = ShipmentId::new_v7();
        state.shipments.insert(
            record.key.clone(),
            StoredShipment {
                id,
                record: record.clone(),
            },
        );
        Ok(id)
    }

    async fn update_shipment(
        &self,
        id: ShipmentId,
        record: &ShipmentRecord,
    ) -> Result<(), PortError> {
        let mut state = self.lock();
        let stored = state
            .shipments
            .values_mut()
            .find(|stored| stored.id == id)
            .ok_or_else(|| PortError::not_found("Shipment", id.to_string()))?;
        stored.record = record.clone();
        Ok(())
    }

    async fn find_audit_result(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<StoredAuditResult>, PortError> {
        Ok(self.lock().audits.get(&shipment_id).cloned())
    }

    async fn insert_audit_result(
        &self,
        shipment_id: ShipmentId,
        record: &AuditRecord,
    ) -> Result<AuditResultId, PortError> {
        let mut state = self.lock();
        if state.audits.contains_key(&shipment_id) {
            return Err(PortError::conflict(format!(
                "audit result already exists for shipment {shipment_id}"
            )));
        }
        let id = AuditResultId::new_v7();
        state.audits.insert(
            shipment_id,
            StoredAuditResult {
                id,
                shipment_id,
                record: record.clone(),
            },
        );
        Ok(id)
    }

    async fn update_audit_result(
        &self,
        id: AuditResultId,
        record: &AuditRecord,
    ) -> Result<(), PortError> {
        let mut state = self.lock();
        let stored = state
            .audits
            .values_mut()
            .find(|stored| stored.id == id)
            .ok_or_else(|| PortError::not_found("AuditResult", id.to_string()))?;
        stored.record = record.clone();
        Ok(())
    }

    async fn find_claim_for_shipment(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<Claim>, PortError> {
        Ok(self.lock().claims.get(&shipment_id).cloned())
    }

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        self.lock()
            .claims
            .values()
            .find(|claim| claim.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", id.to_string()))
    }

    async fn claims_with_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError> {
        Ok(self
            .lock()
            .claims
            .values()
            .filter(|claim| claim.status == status)
            .cloned()
            .collect())
    }

    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError> {
        let mut state = self.lock();
        if state.claims.contains_key(&claim.shipment_id) {
            return Err(PortError::conflict(format!(
                "claim already exists for shipment {}",
                claim.shipment_id
            )));
        }
        state.claims.insert(claim.shipment_id, claim.clone());
        Ok(())
    }

    async fn update_claim(&self, claim: &Claim) -> Result<(), PortError> {
        let mut state = self.lock();
        let stored = state
            .claims
            .get_mut(&claim.shipment_id)
            .filter(|stored| stored.id == claim.id)
            .ok_or_else(|| PortError::not_found("Claim", claim.id.to_string()))?;
        *stored = claim.clone();
        Ok(())
    }
}

/// In-memory reference data for commitments and exception rules
#[derive(Debug, Clone, Default)]
pub struct MemoryReferenceData {
    commitments: Arc<Mutex<Vec<ServiceCommitment>>>,
    rules: Arc<Mutex<Vec<ExceptionRule>>>,
}

impl MemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_commitment(&self, commitment: ServiceCommitment) {
        self.lock_commitments().push(commitment);
    }

    pub fn add_rule(&self, rule: ExceptionRule) {
        self.lock_rules().push(rule);
    }

    fn lock_commitments(&self) -> std::sync::MutexGuard<'_, Vec<ServiceCommitment>> {
        match self.commitments.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_rules(&self) -> std::sync::MutexGuard<'_, Vec<ExceptionRule>> {
        match self.rules.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DomainPort for MemoryReferenceData {}

#[async_trait]
impl CommitmentStore for MemoryReferenceData {
    async fn current_commitments(
        &self,
        carrier: Carrier,
        service_type: &str,
    ) -> Result<Vec<ServiceCommitment>, PortError> {
        Ok(self
            .lock_commitments()
            .iter()
            .filter(|row| row.carrier == carrier && row.service_type == service_type)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ExceptionRuleStore for MemoryReferenceData {
    async fn rules_for(&self, carrier: Carrier) -> Result<Vec<ExceptionRule>, PortError> {
        Ok(self
            .lock_rules()
            .iter()
            .filter(|rule| rule.carrier == carrier)
            .cloned()
            .collect())
    }
}

/// Tracking probe returning a fixed response
#[derive(Debug, Clone)]
pub struct StaticProbe {
    event: Option<TrackingEvent>,
}

impl StaticProbe {
    pub fn with_event(event: TrackingEvent) -> Self {
        Self { event: Some(event) }
    }

    pub fn empty() -> Self {
        Self { event: None }
    }
}

#[async_trait]
impl TrackingProbe for StaticProbe {
    async fn latest_event(
        &self,
        _carrier: Carrier,
        _tracking_number: &str,
    ) -> Result<Option<TrackingEvent>, PortError> {
        Ok(self.event.clone())
    }
}

/// Tracking probe that always fails, for fail-open tests
#[derive(Debug, Clone, Default)]
pub struct FailingProbe;

#[async_trait]
impl TrackingProbe for FailingProbe {
    async fn latest_event(
        &self,
        _carrier: Carrier,
        _tracking_number: &str,
    ) -> Result<Option<TrackingEvent>, PortError> {
        Err(PortError::connection("carrier API unreachable"))
    }
}
