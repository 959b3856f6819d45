//! Audit results repository
//!
//! Exactly one row per shipment, overwritten on re-audit. The UNIQUE
//! constraint on shipment_id backs the writer's conflict handling.

use chrono::{DateTime, Utc};
use core_kernel::{AuditResultId, Currency, Money, ShipmentId};
use domain_audit::RuleId;
use domain_ledger::{AuditRecord, StoredAuditResult};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::decode_assumption;

const SELECT_COLUMNS: &str = r#"
    SELECT id, shipment_id, is_eligible, variance_amount, currency,
           failure_reason, rule_id, audited_at,
           timezone_assumption, timezone_confidence,
           exception_category, exception_signal
    FROM audit_results
"#;

#[derive(Debug, sqlx::FromRow)]
pub struct AuditResultRow {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub is_eligible: bool,
    pub variance_amount: Decimal,
    pub currency: String,
    pub failure_reason: Option<String>,
    pub rule_id: String,
    pub audited_at: DateTime<Utc>,
    pub timezone_assumption: String,
    pub timezone_confidence: f32,
    pub exception_category: Option<String>,
    pub exception_signal: Option<String>,
}

impl AuditResultRow {
    pub fn into_domain(self) -> Result<StoredAuditResult, DatabaseError> {
        let currency = Currency::from_str(&self.currency)
            .map_err(|_| DatabaseError::CorruptRow(format!("currency tag '{}'", self.currency)))?;
        let rule_id = RuleId::from_str(&self.rule_id)
            .map_err(|_| DatabaseError::CorruptRow(format!("rule id '{}'", self.rule_id)))?;

        Ok(StoredAuditResult {
            id: AuditResultId::from_uuid(self.id),
            shipment_id: ShipmentId::from_uuid(self.shipment_id),
            record: AuditRecord {
                is_eligible: self.is_eligible,
                variance_amount: Money::new(self.variance_amount, currency),
                failure_reason: self.failure_reason,
                rule_id,
                audited_at: self.audited_at,
                timezone_assumption: decode_assumption(&self.timezone_assumption)?,
                timezone_confidence: self.timezone_confidence,
                exception_category: self.exception_category,
                exception_signal: self.exception_signal,
            },
        })
    }
}

/// Repository for audit result rows
#[derive(Debug, Clone)]
pub struct AuditResultsRepository {
    pool: PgPool,
}

impl AuditResultsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_shipment(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Option<StoredAuditResult>, DatabaseError> {
        let query = format!("{SELECT_COLUMNS} WHERE shipment_id = $1");
        let row = sqlx::query_as::<_, AuditResultRow>(&query)
            .bind(shipment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AuditResultRow::into_domain).transpose()
    }

    pub async fn insert(
        &self,
        shipment_id: ShipmentId,
        record: &AuditRecord,
    ) -> Result<AuditResultId, DatabaseError> {
        let id = AuditResultId::new_v7();
        sqlx::query(
            r#"
            INSERT INTO audit_results (
                id, shipment_id, is_eligible, variance_amount, currency,
                failure_reason, rule_id, audited_at,
                timezone_assumption, timezone_confidence,
                exception_category, exception_signal
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(id.as_uuid())
        .bind(shipment_id.as_uuid())
        .bind(record.is_eligible)
        .bind(record.variance_amount.amount())
        .bind(record.variance_amount.currency().code())
        .bind(&record.failure_reason)
        .bind(record.rule_id.as_str())
        .bind(record.audited_at)
        .bind(record.timezone_assumption.as_str())
        .bind(record.timezone_confidence)
        .bind(&record.exception_category)
        .bind(&record.exception_signal)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn update(
        &self,
        id: AuditResultId,
        record: &AuditRecord,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE audit_results
            SET is_eligible = $2,
                variance_amount = $3, currency = $4,
                failure_reason = $5,
                rule_id = $6,
                audited_at = $7,
                timezone_assumption = $8, timezone_confidence = $9,
                exception_category = $10, exception_signal = $11,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(record.is_eligible)
        .bind(record.variance_amount.amount())
        .bind(record.variance_amount.currency().code())
        .bind(&record.failure_reason)
        .bind(record.rule_id.as_str())
        .bind(record.audited_at)
        .bind(record.timezone_assumption.as_str())
        .bind(record.timezone_confidence)
        .bind(&record.exception_category)
        .bind(&record.exception_signal)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("AuditResult", id));
        }
        Ok(())
    }
}
