//! Test Data Builders
//!
//! Builder patterns for constructing test payloads with sensible
//! defaults, so tests specify only the fields under test.

use core_kernel::{Currency, Money};
use domain_ledger::ShipmentIngest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Builder for ingestion payloads
///
/// Defaults to a FedEx Priority Overnight shipment delivered 3h45m after
/// its commitment, which is eligible under the standard fixtures.
pub struct ShipmentIngestBuilder {
    carrier: String,
    tracking_number: String,
    service_type: String,
    shipped_at: String,
    promised_delivery: String,
    actual_delivery: String,
    total_charged: Money,
    weight_value: Option<Decimal>,
    weight_unit: Option<String>,
    status_text: Option<String>,
    exception_code: Option<String>,
    raw_metadata: serde_json::Value,
}

impl Default for ShipmentIngestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShipmentIngestBuilder {
    pub fn new() -> Self {
        Self {
            carrier: "FedEx".to_string(),
            tracking_number: "794644790132".to_string(),
            service_type: "Priority Overnight".to_string(),
            shipped_at: "2024-01-08T09:00:00Z".to_string(),
            promised_delivery: "2024-01-11T10:30:00Z".to_string(),
            actual_delivery: "2024-01-11T14:15:00Z".to_string(),
            total_charged: Money::new(dec!(125.50), Currency::USD),
            weight_value: None,
            weight_unit: None,
            status_text: None,
            exception_code: None,
            raw_metadata: serde_json::Value::Null,
        }
    }

    /// An on-time UPS Ground shipment
    pub fn ups_ground_on_time() -> Self {
        Self::new()
            .with_carrier("UPS")
            .with_tracking_number("1Z999AA10123456784")
            .with_service_type("Ground")
            .with_promised_delivery("2024-01-12T23:59:00Z")
            .with_actual_delivery("2024-01-12T16:40:00Z")
            .with_total_charged(Money::new(dec!(18.75), Currency::USD))
    }

    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = carrier.into();
        self
    }

    pub fn with_tracking_number(mut self, tracking_number: impl Into<String>) -> Self {
        self.tracking_number = tracking_number.into();
        self
    }

    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = service_type.into();
        self
    }

    pub fn with_shipped_at(mut self, shipped_at: impl Into<String>) -> Self {
        self.shipped_at = shipped_at.into();
        self
    }

    pub fn with_promised_delivery(mut self, promised: impl Into<String>) -> Self {
        self.promised_delivery = promised.into();
        self
    }

    pub fn with_actual_delivery(mut self, actual: impl Into<String>) -> Self {
        self.actual_delivery = actual.into();
        self
    }

    pub fn with_total_charged(mut self, total_charged: Money) -> Self {
        self.total_charged = total_charged;
        self
    }

    pub fn with_weight(mut self, value: Decimal, unit: impl Into<String>) -> Self {
        self.weight_value = Some(value);
        self.weight_unit = Some(unit.into());
        self
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = Some(status_text.into());
        self
    }

    pub fn with_exception_code(mut self, code: impl Into<String>) -> Self {
        self.exception_code = Some(code.into());
        self
    }

    pub fn with_raw_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.raw_metadata = metadata;
        self
    }

    pub fn build(self) -> ShipmentIngest {
        ShipmentIngest {
            carrier: self.carrier,
            tracking_number: self.tracking_number,
            service_type: self.service_type,
            shipped_at: self.shipped_at,
            promised_delivery: self.promised_delivery,
            actual_delivery: self.actual_delivery,
            total_charged: self.total_charged,
            weight_value: self.weight_value,
            weight_unit: self.weight_unit,
            status_text: self.status_text,
            exception_code: self.exception_code,
            raw_metadata: self.raw_metadata,
        }
    }
}
