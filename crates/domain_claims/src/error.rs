//! Claims domain errors

use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid reconciliation status: {0} (expected RECOVERED or DENIED)")]
    InvalidReconciliationStatus(String),

    #[error("Recovery amount is required to mark a claim RECOVERED")]
    MissingRecoveryAmount,

    #[error("Unknown claim status: {0}")]
    UnknownStatus(String),
}
