//! Reference data repository
//!
//! Operator-maintained service commitments and exception rules. Read-heavy;
//! the resolvers query these on every audit.

use chrono::{DateTime, Utc};
use core_kernel::{CommitmentId, ExceptionRuleId};
use domain_audit::{ExceptionRule, MatchType, ServiceCommitment};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::decode_carrier;

#[derive(Debug, sqlx::FromRow)]
pub struct CommitmentRow {
    pub id: Uuid,
    pub carrier: String,
    pub service_type: String,
    pub guaranteed: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl CommitmentRow {
    pub fn into_domain(self) -> Result<ServiceCommitment, DatabaseError> {
        Ok(ServiceCommitment {
            id: CommitmentId::from_uuid(self.id),
            carrier: decode_carrier(&self.carrier)?,
            service_type: self.service_type,
            guaranteed: self.guaranteed,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ExceptionRuleRow {
    pub id: Uuid,
    pub carrier: String,
    pub match_type: String,
    pub match_value: String,
    pub excusable: bool,
    pub category: String,
}

impl ExceptionRuleRow {
    pub fn into_domain(self) -> Result<ExceptionRule, DatabaseError> {
        let match_type = match self.match_type.as_str() {
            "CODE" => MatchType::Code,
            "KEYWORD" => MatchType::Keyword,
            other => {
                return Err(DatabaseError::CorruptRow(format!("match type '{other}'")));
            }
        };

        Ok(ExceptionRule {
            id: ExceptionRuleId::from_uuid(self.id),
            carrier: decode_carrier(&self.carrier)?,
            match_type,
            match_value: self.match_value,
            excusable: self.excusable,
            category: self.category,
        })
    }
}

/// Repository for reference data rows
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current commitment rows for a (carrier, normalized service type) key
    pub async fn current_commitments(
        &self,
        carrier: &str,
        service_type: &str,
    ) -> Result<Vec<ServiceCommitment>, DatabaseError> {
        let rows = sqlx::query_as::<_, CommitmentRow>(
            r#"
            SELECT id, carrier, service_type, guaranteed, valid_from, valid_to
            FROM service_commitments
            WHERE carrier = $1 AND service_type = $2 AND valid_to IS NULL
            ORDER BY valid_from DESC
            "#,
        )
        .bind(carrier)
        .bind(service_type)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CommitmentRow::into_domain).collect()
    }

    /// All exception rules for a carrier
    pub async fn rules_for_carrier(
        &self,
        carrier: &str,
    ) -> Result<Vec<ExceptionRule>, DatabaseError> {
        let rows = sqlx::query_as::<_, ExceptionRuleRow>(
            r#"
            SELECT id, carrier, match_type, match_value, excusable, category
            FROM exception_rules
            WHERE carrier = $1
            ORDER BY match_type, match_value
            "#,
        )
        .bind(carrier)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExceptionRuleRow::into_domain).collect()
    }
}
