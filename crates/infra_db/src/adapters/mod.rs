//! Domain Adapters
//!
//! Adapter implementations for the domain ports: each translates port
//! calls into repository operations and `DatabaseError` into `PortError`.

pub mod ledger;
pub mod reference;

pub use ledger::PostgresLedgerAdapter;
pub use reference::PostgresReferenceAdapter;

use core_kernel::PortError;

use crate::error::DatabaseError;

pub(crate) fn map_db_error(error: DatabaseError) -> PortError {
    if error.is_duplicate() {
        PortError::conflict(error.to_string())
    } else if error.is_connection_error() {
        PortError::connection(error.to_string())
    } else {
        PortError::internal(error.to_string())
    }
}
