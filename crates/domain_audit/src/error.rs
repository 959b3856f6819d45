//! Audit domain errors

use core_kernel::TemporalError;
use thiserror::Error;

/// Errors that can occur while normalizing audit input
///
/// These are terminal input errors: ingestion aborts before any ledger
/// write when one is raised.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("Unsupported carrier: {0}")]
    InvalidCarrier(String),

    #[error("Invalid {field} timestamp: {source}")]
    InvalidTimestamp {
        field: &'static str,
        #[source]
        source: TemporalError,
    },
}
