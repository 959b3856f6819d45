//! Test Utilities Crate
//!
//! Shared test infrastructure for the freight audit test suite.
//!
//! # Modules
//!
//! - `memory`: In-memory implementations of the persistence and
//!   reference-data ports
//! - `builders`: Builder patterns for test data construction
//! - `fixtures`: Pre-built reference data and payloads
//! - `telemetry`: One-shot tracing initialization for tests

pub mod memory;
pub mod builders;
pub mod fixtures;
pub mod telemetry;

pub use memory::*;
pub use builders::*;
pub use fixtures::*;
pub use telemetry::*;
