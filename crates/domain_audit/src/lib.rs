//! Shipment Audit Domain
//!
//! This crate implements the deterministic audit engine: given a shipment's
//! promised and actual delivery times, its service level, and any carrier
//! exception signals, it produces a reproducible eligibility verdict and
//! refundable variance.
//!
//! # Pipeline position
//!
//! ```text
//! raw input -> normalize -> {guarantee, exception} resolvers -> decide
//! ```
//!
//! Normalization and the decision engine are pure functions; the two
//! resolvers are side-effect-free reads through injected reference-data
//! ports.

pub mod normalize;
pub mod guarantee;
pub mod exceptions;
pub mod decision;
pub mod ports;
pub mod error;

pub use normalize::{normalize, Carrier, NormalizedInput};
pub use guarantee::{resolve_guarantee, ServiceCommitment};
pub use exceptions::{match_exception, resolve_exception, ExceptionMatch, ExceptionRule, MatchType};
pub use decision::{decide, AuditPolicy, EligibilityDecision, RuleId};
pub use ports::{CommitmentStore, ExceptionRuleStore};
pub use error::AuditError;
