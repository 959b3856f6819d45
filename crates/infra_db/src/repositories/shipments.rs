//! Shipments repository
//!
//! One row per (carrier, tracking_number); the UNIQUE constraint on that
//! pair is what turns concurrent first-time ingestions into the 23505
//! conflict the ledger writer expects.

use chrono::{DateTime, Utc};
use core_kernel::{Currency, Money, ResolvedTimestamp, ShipmentId};
use domain_ledger::{NaturalKey, ShipmentRecord, StoredShipment};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::{decode_assumption, decode_carrier};

const SELECT_COLUMNS: &str = r#"
    SELECT id, carrier, tracking_number, service_type_raw, service_type,
           shipped_at, shipped_at_tz,
           promised_delivery, promised_delivery_tz,
           actual_delivery, actual_delivery_tz,
           total_charged, currency, weight_value, weight_unit, raw_metadata
    FROM shipments
"#;

#[derive(Debug, sqlx::FromRow)]
pub struct ShipmentRow {
    pub id: Uuid,
    pub carrier: String,
    pub tracking_number: String,
    pub service_type_raw: String,
    pub service_type: String,
    pub shipped_at: DateTime<Utc>,
    pub shipped_at_tz: String,
    pub promised_delivery: DateTime<Utc>,
    pub promised_delivery_tz: String,
    pub actual_delivery: DateTime<Utc>,
    pub actual_delivery_tz: String,
    pub total_charged: Decimal,
    pub currency: String,
    pub weight_value: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub raw_metadata: serde_json::Value,
}

impl ShipmentRow {
    pub fn into_domain(self) -> Result<StoredShipment, DatabaseError> {
        let carrier = decode_carrier(&self.carrier)?;
        let currency = Currency::from_str(&self.currency)
            .map_err(|_| DatabaseError::CorruptRow(format!("currency tag '{}'", self.currency)))?;

        Ok(StoredShipment {
            id: ShipmentId::from_uuid(self.id),
            record: ShipmentRecord {
                key: NaturalKey::new(carrier, self.tracking_number),
                service_type_raw: self.service_type_raw,
                service_type: self.service_type,
                shipped_at: ResolvedTimestamp {
                    utc: self.shipped_at,
                    assumption: decode_assumption(&self.shipped_at_tz)?,
                },
                promised_delivery: ResolvedTimestamp {
                    utc: self.promised_delivery,
                    assumption: decode_assumption(&self.promised_delivery_tz)?,
                },
                actual_delivery: ResolvedTimestamp {
                    utc: self.actual_delivery,
                    assumption: decode_assumption(&self.actual_delivery_tz)?,
                },
                total_charged: Money::new(self.total_charged, currency),
                weight_value: self.weight_value,
                weight_unit: self.weight_unit,
                raw_metadata: self.raw_metadata,
            },
        })
    }
}

/// Repository for shipment rows
#[derive(Debug, Clone)]
pub struct ShipmentsRepository {
    pool: PgPool,
}

impl ShipmentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_natural_key(
        &self,
        key: &NaturalKey,
    ) -> Result<Option<StoredShipment>, DatabaseError> {
        let query = format!("{SELECT_COLUMNS} WHERE carrier = $1 AND tracking_number = $2");
        let row = sqlx::query_as::<_, ShipmentRow>(&query)
            .bind(key.carrier.as_str())
            .bind(&key.tracking_number)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ShipmentRow::into_domain).transpose()
    }

    pub async fn get_by_id(&self, id: ShipmentId) -> Result<StoredShipment, DatabaseError> {
        let query = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row = sqlx::query_as::<_, ShipmentRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Shipment", id))?;

        row.into_domain()
    }

    pub async fn insert(&self, record: &ShipmentRecord) -> Result<ShipmentId, DatabaseError> {
        let id = ShipmentId::new_v7();
        sqlx::query(
            r#"
            INSERT INTO shipments (
                id, carrier, tracking_number, service_type_raw, service_type,
                shipped_at, shipped_at_tz,
                promised_delivery, promised_delivery_tz,
                actual_delivery, actual_delivery_tz,
                total_charged, currency, weight_value, weight_unit, raw_metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(id.as_uuid())
        .bind(record.key.carrier.as_str())
        .bind(&record.key.tracking_number)
        .bind(&record.service_type_raw)
        .bind(&record.service_type)
        .bind(record.shipped_at.utc)
        .bind(record.shipped_at.assumption.as_str())
        .bind(record.promised_delivery.utc)
        .bind(record.promised_delivery.assumption.as_str())
        .bind(record.actual_delivery.utc)
        .bind(record.actual_delivery.assumption.as_str())
        .bind(record.total_charged.amount())
        .bind(record.total_charged.currency().code())
        .bind(record.weight_value)
        .bind(&record.weight_unit)
        .bind(&record.raw_metadata)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn update(
        &self,
        id: ShipmentId,
        record: &ShipmentRecord,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE shipments
            SET service_type_raw = $2,
                service_type = $3,
                shipped_at = $4, shipped_at_tz = $5,
                promised_delivery = $6, promised_delivery_tz = $7,
                actual_delivery = $8, actual_delivery_tz = $9,
                total_charged = $10, currency = $11,
                weight_value = $12, weight_unit = $13,
                raw_metadata = $14,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&record.service_type_raw)
        .bind(&record.service_type)
        .bind(record.shipped_at.utc)
        .bind(record.shipped_at.assumption.as_str())
        .bind(record.promised_delivery.utc)
        .bind(record.promised_delivery.assumption.as_str())
        .bind(record.actual_delivery.utc)
        .bind(record.actual_delivery.assumption.as_str())
        .bind(record.total_charged.amount())
        .bind(record.total_charged.currency().code())
        .bind(record.weight_value)
        .bind(&record.weight_unit)
        .bind(&record.raw_metadata)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Shipment", id));
        }
        Ok(())
    }
}
