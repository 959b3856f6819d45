//! PostgreSQL reference data adapter

use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};
use domain_audit::{
    Carrier, CommitmentStore, ExceptionRule, ExceptionRuleStore, ServiceCommitment,
};
use sqlx::PgPool;

use crate::adapters::map_db_error;
use crate::repositories::ReferenceRepository;

/// PostgreSQL-backed implementation of the reference data ports
#[derive(Debug, Clone)]
pub struct PostgresReferenceAdapter {
    repository: ReferenceRepository,
}

impl PostgresReferenceAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ReferenceRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresReferenceAdapter {}

#[async_trait]
impl CommitmentStore for PostgresReferenceAdapter {
    async fn current_commitments(
        &self,
        carrier: Carrier,
        service_type: &str,
    ) -> Result<Vec<ServiceCommitment>, PortError> {
        self.repository
            .current_commitments(carrier.as_str(), service_type)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl ExceptionRuleStore for PostgresReferenceAdapter {
    async fn rules_for(&self, carrier: Carrier) -> Result<Vec<ExceptionRule>, PortError> {
        self.repository
            .rules_for_carrier(carrier.as_str())
            .await
            .map_err(map_db_error)
    }
}
