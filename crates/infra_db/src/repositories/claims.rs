//! Claims repository
//!
//! At most one claim per shipment, enforced by the UNIQUE constraint on
//! shipment_id. Status is stored as TEXT in the same tags the domain
//! status machine serializes to.

use chrono::{DateTime, Utc};
use core_kernel::{AuditResultId, ClaimId, Currency, Money, ShipmentId};
use domain_claims::{Claim, ClaimStatus};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DatabaseError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, shipment_id, audit_id, status, claim_amount, currency,
           reason, carrier_case_number, recovery_amount,
           created_at, submitted_at, settled_at, updated_at
    FROM claims
"#;

#[derive(Debug, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub audit_id: Uuid,
    pub status: String,
    pub claim_amount: Decimal,
    pub currency: String,
    pub reason: Option<String>,
    pub carrier_case_number: Option<String>,
    pub recovery_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimRow {
    pub fn into_domain(self) -> Result<Claim, DatabaseError> {
        let currency = Currency::from_str(&self.currency)
            .map_err(|_| DatabaseError::CorruptRow(format!("currency tag '{}'", self.currency)))?;
        let status = ClaimStatus::from_str(&self.status)
            .map_err(|_| DatabaseError::CorruptRow(format!("claim status '{}'", self.status)))?;

        Ok(Claim {
            id: ClaimId::from_uuid(self.id),
            shipment_id: ShipmentId::from_uuid(self.shipment_id),
            audit_id: AuditResultId::from_uuid(self.audit_id),
            status,
            claim_amount: Money::new(self.claim_amount, currency),
            reason: self.reason,
            carrier_case_number: self.carrier_case_number,
            recovery_amount: self.recovery_amount.map(|amount| Money::new(amount, currency)),
            created_at: self.created_at,
            submitted_at: self.submitted_at,
            settled_at: self.settled_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for claim rows
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_shipment(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<Claim>, DatabaseError> {
        let query = format!("{SELECT_COLUMNS} WHERE shipment_id = $1");
        let row = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(shipment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ClaimRow::into_domain).transpose()
    }

    pub async fn get_by_id(&self, id: ClaimId) -> Result<Claim, DatabaseError> {
        let query = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", id))?;

        row.into_domain()
    }

    pub async fn find_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, DatabaseError> {
        let query = format!("{SELECT_COLUMNS} WHERE status = $1 ORDER BY created_at");
        let rows = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ClaimRow::into_domain).collect()
    }

    pub async fn insert(&self, claim: &Claim) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                id, shipment_id, audit_id, status, claim_amount, currency,
                reason, carrier_case_number, recovery_amount,
                created_at, submitted_at, settled_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(claim.shipment_id.as_uuid())
        .bind(claim.audit_id.as_uuid())
        .bind(claim.status.as_str())
        .bind(claim.claim_amount.amount())
        .bind(claim.claim_amount.currency().code())
        .bind(&claim.reason)
        .bind(&claim.carrier_case_number)
        .bind(claim.recovery_amount.map(|amount| amount.amount()))
        .bind(claim.created_at)
        .bind(claim.submitted_at)
        .bind(claim.settled_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, claim: &Claim) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET status = $2,
                claim_amount = $3, currency = $4,
                reason = $5,
                carrier_case_number = $6,
                recovery_amount = $7,
                submitted_at = $8,
                settled_at = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(claim.status.as_str())
        .bind(claim.claim_amount.amount())
        .bind(claim.claim_amount.currency().code())
        .bind(&claim.reason)
        .bind(&claim.carrier_case_number)
        .bind(claim.recovery_amount.map(|amount| amount.amount()))
        .bind(claim.submitted_at)
        .bind(claim.settled_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Claim", claim.id));
        }
        Ok(())
    }
}
