//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the audit ledger and the operator-maintained
//! reference data, built on SQLx.
//!
//! # Architecture
//!
//! Repositories own the SQL and the row types; adapters implement the
//! domain port traits on top of them and translate `DatabaseError` into
//! `PortError`. The domain crates never see SQLx types.
//!
//! Natural-key uniqueness (one shipment per carrier + tracking number, one
//! audit result per shipment, at most one claim per shipment) is enforced
//! by constraints in `migrations/`; the ledger writer relies on the
//! resulting unique-violation conflicts for its race handling.

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{PostgresLedgerAdapter, PostgresReferenceAdapter};
