//! Ledger domain errors
//!
//! Input errors abort ingestion before any ledger write. Persistence
//! errors fail the whole ingestion call; the caller's retry is safe
//! because every write step is idempotent.

use core_kernel::PortError;
use domain_audit::AuditError;
use domain_claims::ClaimError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ingestion and ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("total_charged must be positive, got {0}")]
    NonPositiveCharge(Decimal),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl LedgerError {
    /// Returns true for terminal input errors that no retry can fix
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LedgerError::Audit(_)
                | LedgerError::MissingRequiredField(_)
                | LedgerError::NonPositiveCharge(_)
        )
    }
}
