//! Reference-data ports
//!
//! Read-only stores consumed by the resolvers. Both are safe to call once
//! per shipment: idempotent reads with no side effects, independent of one
//! another.

use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};

use crate::exceptions::ExceptionRule;
use crate::guarantee::ServiceCommitment;
use crate::normalize::Carrier;

/// Access to the versioned service-commitments table
#[async_trait]
pub trait CommitmentStore: DomainPort {
    /// Returns the current (valid_to unset) commitment rows for a
    /// (carrier, normalized service type) key, in any order
    async fn current_commitments(
        &self,
        carrier: Carrier,
        service_type: &str,
    ) -> Result<Vec<ServiceCommitment>, PortError>;
}

/// Access to the operator-maintained exception rules
#[async_trait]
pub trait ExceptionRuleStore: DomainPort {
    /// Returns all exception rules configured for a carrier
    async fn rules_for(&self, carrier: Carrier) -> Result<Vec<ExceptionRule>, PortError>;
}
