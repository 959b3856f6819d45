//! Ingestion pipeline
//!
//! One synchronous pass per shipment: validate the typed payload, enrich
//! from the optional live-tracking probe, normalize, resolve guarantee and
//! exception status, decide, and reconcile into the ledger. The decision
//! itself is pure computation; only the resolver reads and the ledger
//! write touch the outside world.

use chrono::Utc;
use core_kernel::{AuditResultId, Money, ShipmentId};
use domain_audit::{
    decide, normalize, resolve_exception, resolve_guarantee, AuditPolicy, Carrier,
    CommitmentStore, ExceptionRuleStore, RuleId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::ports::{LedgerStore, TrackingEvent, TrackingProbe};
use crate::records::{AuditRecord, NaturalKey, ShipmentRecord};
use crate::writer::{ClaimOutcome, LedgerReceipt, LedgerWriter};

/// Typed ingestion payload
///
/// Produced upstream by the extraction layer (PDF/LLM); validated here at
/// the boundary. Missing required fields abort ingestion before any
/// ledger write; nothing is defaulted silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentIngest {
    pub carrier: String,
    pub tracking_number: String,
    pub service_type: String,
    /// Raw timestamp strings; timezone handling happens in normalization
    pub shipped_at: String,
    pub promised_delivery: String,
    pub actual_delivery: String,
    pub total_charged: Money,
    #[serde(default)]
    pub weight_value: Option<Decimal>,
    #[serde(default)]
    pub weight_unit: Option<String>,
    /// Carrier status text, if the caller already has it
    #[serde(default)]
    pub status_text: Option<String>,
    /// Carrier exception code, if the caller already has it
    #[serde(default)]
    pub exception_code: Option<String>,
    /// Opaque passthrough stored on the shipment row
    #[serde(default)]
    pub raw_metadata: serde_json::Value,
}

impl ShipmentIngest {
    fn validate(&self) -> Result<(), LedgerError> {
        if self.carrier.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField("carrier"));
        }
        if self.tracking_number.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField("tracking_number"));
        }
        if self.service_type.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField("service_type"));
        }
        if self.shipped_at.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField("shipped_at"));
        }
        if self.promised_delivery.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField("promised_delivery"));
        }
        if self.actual_delivery.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField("actual_delivery"));
        }
        if !self.total_charged.is_positive() {
            return Err(LedgerError::NonPositiveCharge(self.total_charged.amount()));
        }
        Ok(())
    }
}

/// Summary returned to the caller for one ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub tracking_number: String,
    pub shipment_id: ShipmentId,
    pub audit_id: AuditResultId,
    pub is_eligible: bool,
    pub variance_amount: Money,
    pub rule_id: RuleId,
    pub claim: ClaimOutcome,
}

/// End-to-end ingestion service
///
/// All collaborators are injected; one instance per process, constructed
/// at startup by the caller.
pub struct IngestionService<S, R> {
    writer: LedgerWriter<S>,
    reference: Arc<R>,
    probe: Option<Arc<dyn TrackingProbe>>,
    probe_timeout: Duration,
    policy: AuditPolicy,
}

impl<S, R> IngestionService<S, R>
where
    S: LedgerStore,
    R: CommitmentStore + ExceptionRuleStore,
{
    pub fn new(store: S, reference: Arc<R>, policy: AuditPolicy) -> Self {
        Self {
            writer: LedgerWriter::new(store),
            reference,
            probe: None,
            probe_timeout: Duration::from_secs(5),
            policy,
        }
    }

    /// Enables live-tracking enrichment with a hard time bound
    pub fn with_probe(mut self, probe: Arc<dyn TrackingProbe>, timeout: Duration) -> Self {
        self.probe = Some(probe);
        self.probe_timeout = timeout;
        self
    }

    /// Ingests and audits one shipment
    pub async fn ingest(&self, payload: ShipmentIngest) -> Result<IngestOutcome, LedgerError> {
        payload.validate()?;
        let carrier = Carrier::from_raw(&payload.carrier)?;

        let live_event = self.poll_probe(carrier, &payload.tracking_number).await;

        // A verified live delivery time beats the invoice-provided one.
        let actual_delivery_raw = live_event
            .as_ref()
            .map(|event| event.timestamp.as_str())
            .unwrap_or(&payload.actual_delivery);

        let input = match normalize(
            &payload.carrier,
            &payload.service_type,
            &payload.shipped_at,
            &payload.promised_delivery,
            actual_delivery_raw,
        ) {
            Ok(input) => input,
            Err(err) if live_event.is_some() => {
                // Fail open to the caller-supplied timestamp when the live
                // one does not parse.
                warn!(
                    tracking_number = %payload.tracking_number,
                    error = %err,
                    "live timestamp unusable; falling back to provided data"
                );
                normalize(
                    &payload.carrier,
                    &payload.service_type,
                    &payload.shipped_at,
                    &payload.promised_delivery,
                    &payload.actual_delivery,
                )?
            }
            Err(err) => return Err(err.into()),
        };

        let guaranteed =
            resolve_guarantee(self.reference.as_ref(), input.carrier, &input.service_type).await?;

        let exception_code = live_event
            .as_ref()
            .and_then(|event| event.exception_code.as_deref())
            .or(payload.exception_code.as_deref());
        let status_text = exception_text(&payload, live_event.as_ref());
        let exception = resolve_exception(
            self.reference.as_ref(),
            input.carrier,
            exception_code,
            &status_text,
        )
        .await?;

        let decision = decide(&input, guaranteed, &exception, payload.total_charged, &self.policy);

        let shipment = ShipmentRecord {
            key: NaturalKey::new(input.carrier, payload.tracking_number.clone()),
            service_type_raw: payload.service_type.clone(),
            service_type: input.service_type.clone(),
            shipped_at: input.shipped_at,
            promised_delivery: input.promised_delivery,
            actual_delivery: input.actual_delivery,
            total_charged: payload.total_charged,
            weight_value: payload.weight_value,
            weight_unit: payload.weight_unit.clone(),
            raw_metadata: payload.raw_metadata.clone(),
        };
        let audit = AuditRecord::from_decision(&input, &decision, &exception, Utc::now());

        let receipt: LedgerReceipt = self.writer.write(&shipment, &audit).await?;

        info!(
            natural_key = %shipment.key,
            rule_id = %decision.rule_id,
            is_eligible = decision.is_eligible,
            variance = %decision.variance_amount,
            "ingestion complete"
        );

        Ok(IngestOutcome {
            tracking_number: payload.tracking_number,
            shipment_id: receipt.shipment_id,
            audit_id: receipt.audit_id,
            is_eligible: decision.is_eligible,
            variance_amount: decision.variance_amount,
            rule_id: decision.rule_id,
            claim: receipt.claim,
        })
    }

    /// Polls the tracking probe, bounded and fail-open
    async fn poll_probe(&self, carrier: Carrier, tracking_number: &str) -> Option<TrackingEvent> {
        let probe = self.probe.as_ref()?;

        match tokio::time::timeout(
            self.probe_timeout,
            probe.latest_event(carrier, tracking_number),
        )
        .await
        {
            Ok(Ok(event)) => event,
            Ok(Err(err)) => {
                warn!(%carrier, tracking_number, error = %err, "tracking probe failed; using provided data");
                None
            }
            Err(_) => {
                warn!(%carrier, tracking_number, "tracking probe timed out; using provided data");
                None
            }
        }
    }
}

/// Combines caller-supplied and live status text for exception matching
fn exception_text(payload: &ShipmentIngest, live: Option<&TrackingEvent>) -> String {
    match live {
        Some(event) => format!(
            "{} {} {}",
            payload.status_text.as_deref().unwrap_or(""),
            event.status,
            event.description
        ),
        None => payload.status_text.clone().unwrap_or_default(),
    }
}
