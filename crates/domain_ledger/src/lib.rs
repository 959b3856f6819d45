//! Ledger Domain - ingestion and idempotent persistence
//!
//! This crate owns the end-to-end ingestion pipeline and the upsert
//! protocol that keeps the ledger idempotent under repeated or duplicate
//! ingestion:
//!
//! ```text
//! ShipmentIngest -> normalize -> {guarantee, exception} -> decide
//!                -> LedgerWriter (shipment, audit result, claim upserts)
//! ```
//!
//! Re-ingesting the same tracking number any number of times converges to
//! one Shipment row, one AuditResult, and at most one Claim.

pub mod records;
pub mod ports;
pub mod writer;
pub mod ingestion;
pub mod claims_service;
pub mod config;
pub mod error;

pub use records::{AuditRecord, NaturalKey, ShipmentRecord, StoredAuditResult, StoredShipment};
pub use ports::{LedgerStore, TrackingEvent, TrackingProbe};
pub use writer::{ClaimOutcome, LedgerReceipt, LedgerWriter};
pub use ingestion::{IngestOutcome, IngestionService, ShipmentIngest};
pub use claims_service::ClaimsService;
pub use config::AuditServiceConfig;
pub use error::LedgerError;
