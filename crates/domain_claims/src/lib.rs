//! Refund Claim Lifecycle Domain
//!
//! This crate implements the claim workflow for eligible shipments, from
//! DRAFT creation through submission to the carrier and final settlement.
//!
//! # Claim Lifecycle
//!
//! ```text
//! DRAFT -> SUBMITTED -> (DISPUTED) -> RECOVERED | DENIED
//! ```
//!
//! Claims are derived workflow objects: the shipment and its audit result
//! remain the source of truth for eligibility.

pub mod claim;
pub mod dispute;
pub mod error;

pub use claim::{Claim, ClaimStatus};
pub use dispute::{
    DisputeBatch, DisputeLine, DISPUTE_TYPE_SERVICE_FAILURE, REASON_CODE_LATE_DELIVERY,
};
pub use error::ClaimError;
