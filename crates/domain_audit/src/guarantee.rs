//! Service guarantee resolution
//!
//! Looks up whether a (carrier, service type) pair is currently under a
//! guaranteed-delivery commitment. Fails closed: absence of data never
//! grants a refund.

use chrono::{DateTime, Utc};
use core_kernel::{CommitmentId, PortError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::Carrier;
use crate::ports::CommitmentStore;

/// A versioned (carrier, service type) -> guaranteed mapping
///
/// Reference data owned by operators, read-only from the core's
/// perspective. Only rows with no `valid_to` are current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCommitment {
    pub id: CommitmentId,
    pub carrier: Carrier,
    /// Normalized service type key
    pub service_type: String,
    pub guaranteed: bool,
    pub valid_from: DateTime<Utc>,
    /// Unset means the row is current
    pub valid_to: Option<DateTime<Utc>>,
}

impl ServiceCommitment {
    pub fn is_current(&self) -> bool {
        self.valid_to.is_none()
    }
}

/// Resolves the guarantee status for a normalized service type
///
/// The most recent current row (by `valid_from`) wins. No current row
/// means not guaranteed.
pub async fn resolve_guarantee(
    store: &dyn CommitmentStore,
    carrier: Carrier,
    service_type: &str,
) -> Result<bool, PortError> {
    let rows = store.current_commitments(carrier, service_type).await?;
    Ok(pick_guarantee(rows, carrier, service_type))
}

fn pick_guarantee(mut rows: Vec<ServiceCommitment>, carrier: Carrier, service_type: &str) -> bool {
    rows.retain(|row| row.is_current());
    rows.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));

    match rows.first() {
        Some(row) => row.guaranteed,
        None => {
            debug!(
                carrier = %carrier,
                service_type,
                "no current commitment row; treating as non-guaranteed"
            );
            false
        }
    }
}
