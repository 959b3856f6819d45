//! Repository layer
//!
//! Each repository owns the SQL and the `FromRow` row type for one table
//! family. Status and provenance enums are stored as TEXT and decoded in
//! the row-to-domain conversions; a tag that fails to decode surfaces as
//! `DatabaseError::CorruptRow` rather than a panic.

pub mod shipments;
pub mod audit_results;
pub mod claims;
pub mod reference;

pub use shipments::ShipmentsRepository;
pub use audit_results::AuditResultsRepository;
pub use claims::ClaimsRepository;
pub use reference::ReferenceRepository;

use core_kernel::TzAssumption;
use domain_audit::Carrier;

use crate::error::DatabaseError;

pub(crate) fn decode_carrier(tag: &str) -> Result<Carrier, DatabaseError> {
    Carrier::from_raw(tag).map_err(|_| DatabaseError::CorruptRow(format!("carrier tag '{tag}'")))
}

pub(crate) fn decode_assumption(tag: &str) -> Result<TzAssumption, DatabaseError> {
    match tag {
        "tz-given" => Ok(TzAssumption::TzGiven),
        "tz-assumed-utc" => Ok(TzAssumption::TzAssumedUtc),
        other => Err(DatabaseError::CorruptRow(format!(
            "timezone assumption tag '{other}'"
        ))),
    }
}
