//! Core Kernel - Foundational types for the carrier audit system
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - UTC-resolved timestamps carrying timezone provenance
//! - Strongly-typed identifiers
//! - Port infrastructure shared by all storage adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{ResolvedTimestamp, TzAssumption, TemporalError};
pub use identifiers::{
    ShipmentId, AuditResultId, ClaimId, CommitmentId, ExceptionRuleId, BatchId,
};
pub use ports::{PortError, DomainPort};
