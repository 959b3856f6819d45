//! End-to-end ingestion and claim lifecycle tests over in-memory ports

use std::sync::Arc;
use std::time::Duration;

use core_kernel::{Currency, Money, ResolvedTimestamp};
use domain_audit::{AuditPolicy, Carrier, RuleId};
use domain_claims::{ClaimError, ClaimStatus, DISPUTE_TYPE_SERVICE_FAILURE};
use domain_ledger::{
    ClaimOutcome, ClaimsService, IngestionService, LedgerError, LedgerStore, NaturalKey,
    ShipmentRecord, TrackingEvent,
};
use rust_decimal_macros::dec;
use test_utils::{
    init_tracing, FailingProbe, MemoryLedger, MemoryReferenceData, ShipmentIngestBuilder,
    StaticProbe,
};

fn service(
    ledger: &MemoryLedger,
    reference: MemoryReferenceData,
) -> IngestionService<MemoryLedger, MemoryReferenceData> {
    init_tracing();
    IngestionService::new(ledger.clone(), Arc::new(reference), AuditPolicy::default())
}

fn standard_service(ledger: &MemoryLedger) -> IngestionService<MemoryLedger, MemoryReferenceData> {
    service(ledger, test_utils::standard_reference_data())
}

#[tokio::test]
async fn test_late_guaranteed_shipment_creates_draft_claim() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let outcome = service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();

    assert!(outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleLateDelivery);
    assert_eq!(outcome.variance_amount.amount(), dec!(125.50));
    let claim_id = match outcome.claim {
        ClaimOutcome::DraftCreated(id) => id,
        other => panic!("expected DraftCreated, got {other:?}"),
    };

    let claim = ledger.get_claim(claim_id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Draft);
    assert_eq!(claim.claim_amount.amount(), dec!(125.50));
    assert_eq!(claim.reason.as_deref(), Some("Late Delivery (GSR)"));
}

#[tokio::test]
async fn test_repeated_ingestion_converges_to_single_rows() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);
    let payload = ShipmentIngestBuilder::new().build();

    let first = service.ingest(payload.clone()).await.unwrap();
    let second = service.ingest(payload.clone()).await.unwrap();
    let third = service.ingest(payload).await.unwrap();

    assert_eq!(ledger.shipment_count(), 1);
    assert_eq!(ledger.audit_count(), 1);
    assert_eq!(ledger.claim_count(), 1);
    assert_eq!(first.shipment_id, second.shipment_id);
    assert_eq!(second.audit_id, third.audit_id);
    assert!(matches!(first.claim, ClaimOutcome::DraftCreated(_)));
    assert!(matches!(second.claim, ClaimOutcome::DraftRevised(_)));
}

#[tokio::test]
async fn test_naive_timestamp_with_thin_margin_fails_closed() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    // 25 minutes late, but the actual-delivery timestamp has no offset.
    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_actual_delivery("2024-01-11T10:55:00")
                .build(),
        )
        .await
        .unwrap();

    assert!(!outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleTzAmbiguousFailClosed);
    assert_eq!(outcome.variance_amount.amount(), dec!(0));
    assert_eq!(outcome.claim, ClaimOutcome::Skipped);
    assert_eq!(ledger.claim_count(), 0);
}

#[tokio::test]
async fn test_naive_timestamp_with_wide_margin_is_eligible() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    // 3h45m late dwarfs any plausible offset error.
    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_actual_delivery("2024-01-11T14:15:00")
                .build(),
        )
        .await
        .unwrap();

    assert!(outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleLateDelivery);
}

#[tokio::test]
async fn test_unknown_service_type_fails_closed() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_service_type("SameDay Freight")
                .build(),
        )
        .await
        .unwrap();

    assert!(!outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleServiceNotGuaranteed);
    assert_eq!(outcome.claim, ClaimOutcome::Skipped);
}

#[tokio::test]
async fn test_excusable_exception_code_blocks_claim() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_exception_code("DE.WX")
                .build(),
        )
        .await
        .unwrap();

    assert!(!outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleExceptionRules);
}

#[tokio::test]
async fn test_fallback_keyword_in_status_text_blocks_claim() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_status_text("Facility closed due to flooding")
                .build(),
        )
        .await
        .unwrap();

    assert!(!outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleExceptionRules);
}

#[tokio::test]
async fn test_on_time_delivery_records_audit_without_claim() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_actual_delivery("2024-01-11T09:55:00Z")
                .build(),
        )
        .await
        .unwrap();

    assert!(!outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleOnTime);
    assert_eq!(ledger.audit_count(), 1);
    assert_eq!(ledger.claim_count(), 0);
}

#[tokio::test]
async fn test_reaudit_overwrites_audit_but_keeps_claim() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let first = service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();
    assert!(first.is_eligible);

    // Corrected data shows the delivery was on time after all.
    let second = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_actual_delivery("2024-01-11T09:55:00Z")
                .build(),
        )
        .await
        .unwrap();

    assert!(!second.is_eligible);
    assert_eq!(second.rule_id, RuleId::RuleOnTime);
    assert_eq!(second.audit_id, first.audit_id);
    assert!(matches!(second.claim, ClaimOutcome::LeftUntouched(_)));
    assert_eq!(ledger.claim_count(), 1);
}

#[tokio::test]
async fn test_reingest_repairs_shipment_missing_audit() {
    let ledger = MemoryLedger::new();

    // The shape left by a crash after step 1 of a previous write: the
    // shipment row committed, the audit result never did.
    let orphan = ShipmentRecord {
        key: NaturalKey::new(Carrier::FedEx, "794644790132"),
        service_type_raw: "Priority Overnight".to_string(),
        service_type: "PRIORITY OVERNIGHT".to_string(),
        shipped_at: ResolvedTimestamp::parse("2024-01-08T09:00:00Z").unwrap(),
        promised_delivery: ResolvedTimestamp::parse("2024-01-11T10:30:00Z").unwrap(),
        actual_delivery: ResolvedTimestamp::parse("2024-01-11T14:15:00Z").unwrap(),
        total_charged: Money::new(dec!(125.50), Currency::USD),
        weight_value: None,
        weight_unit: None,
        raw_metadata: serde_json::Value::Null,
    };
    let seeded_id = ledger.insert_shipment(&orphan).await.unwrap();
    assert_eq!(ledger.audit_count(), 0);

    let service = standard_service(&ledger);
    let outcome = service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();

    assert_eq!(outcome.shipment_id, seeded_id);
    assert_eq!(ledger.shipment_count(), 1);
    assert_eq!(ledger.audit_count(), 1);
    assert!(matches!(outcome.claim, ClaimOutcome::DraftCreated(_)));
}

#[tokio::test]
async fn test_reaudit_revises_draft_claim_amount() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();
    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_total_charged(Money::new(dec!(210.00), Currency::USD))
                .build(),
        )
        .await
        .unwrap();

    let claim_id = match outcome.claim {
        ClaimOutcome::DraftRevised(id) => id,
        other => panic!("expected DraftRevised, got {other:?}"),
    };
    let claim = ledger.get_claim(claim_id).await.unwrap();
    assert_eq!(claim.claim_amount.amount(), dec!(210.00));
}

#[tokio::test]
async fn test_live_event_overrides_provided_delivery_time() {
    let ledger = MemoryLedger::new();
    let probe = StaticProbe::with_event(TrackingEvent {
        status: "Delivered".to_string(),
        description: "Left at front door".to_string(),
        exception_code: None,
        timestamp: "2024-01-11T18:00:00Z".to_string(),
    });
    let service = standard_service(&ledger).with_probe(Arc::new(probe), Duration::from_secs(1));

    // Invoice says on time; the live event says four hours late.
    let outcome = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_actual_delivery("2024-01-11T09:55:00Z")
                .build(),
        )
        .await
        .unwrap();

    assert!(outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleLateDelivery);
}

#[tokio::test]
async fn test_probe_failure_falls_back_to_provided_data() {
    let ledger = MemoryLedger::new();
    let service =
        standard_service(&ledger).with_probe(Arc::new(FailingProbe), Duration::from_secs(1));

    let outcome = service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();

    assert!(outcome.is_eligible);
    assert_eq!(outcome.rule_id, RuleId::RuleLateDelivery);
}

#[tokio::test]
async fn test_invalid_payload_leaves_ledger_untouched() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let err = service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_tracking_number("  ")
                .build(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::MissingRequiredField("tracking_number")));
    assert!(err.is_input_error());
    assert_eq!(ledger.shipment_count(), 0);
    assert_eq!(ledger.audit_count(), 0);
}

#[tokio::test]
async fn test_unknown_carrier_is_rejected_before_any_write() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    let err = service
        .ingest(ShipmentIngestBuilder::new().with_carrier("DHL").build())
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Audit(_)));
    assert_eq!(ledger.shipment_count(), 0);
}

#[tokio::test]
async fn test_submit_draft_batch_files_all_drafts() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);

    service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();
    service
        .ingest(
            ShipmentIngestBuilder::new()
                .with_carrier("UPS")
                .with_tracking_number("1Z999AA10123456784")
                .with_service_type("Next Day Air")
                .with_total_charged(Money::new(dec!(64.20), Currency::USD))
                .build(),
        )
        .await
        .unwrap();

    let claims = ClaimsService::new(ledger.clone());
    let batch = claims.submit_draft_batch().await.unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.total().unwrap().amount(), dec!(189.70));
    for line in &batch.lines {
        assert_eq!(line.dispute_type, DISPUTE_TYPE_SERVICE_FAILURE);
        assert!(line.notes.starts_with("Audit: Promised "));
    }
    let drafts = ledger.claims_with_status(ClaimStatus::Draft).await.unwrap();
    assert!(drafts.is_empty());
    let submitted = ledger.claims_with_status(ClaimStatus::Submitted).await.unwrap();
    assert_eq!(submitted.len(), 2);
    assert!(submitted.iter().all(|claim| claim.submitted_at.is_some()));
}

#[tokio::test]
async fn test_reconcile_recovered_requires_amount() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);
    service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();

    let claims = ClaimsService::new(ledger.clone());
    claims.submit_draft_batch().await.unwrap();
    let claim_id = ledger.claims_with_status(ClaimStatus::Submitted).await.unwrap()[0].id;

    let err = claims
        .reconcile(claim_id, ClaimStatus::Recovered, None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Claim(ClaimError::MissingRecoveryAmount)
    ));

    let claim = claims
        .reconcile(
            claim_id,
            ClaimStatus::Recovered,
            Some(Money::new(dec!(125.50), Currency::USD)),
            Some("FDX-CASE-001".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::Recovered);
    assert_eq!(claim.recovery_amount.unwrap().amount(), dec!(125.50));
    assert!(claim.settled_at.is_some());
}

#[tokio::test]
async fn test_disputed_claim_can_still_be_denied() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);
    service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();

    let claims = ClaimsService::new(ledger.clone());
    claims.submit_draft_batch().await.unwrap();
    let claim_id = ledger.claims_with_status(ClaimStatus::Submitted).await.unwrap()[0].id;

    let claim = claims
        .mark_disputed(claim_id, Some("FDX-CASE-002".to_string()))
        .await
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::Disputed);

    let claim = claims
        .reconcile(claim_id, ClaimStatus::Denied, None, None)
        .await
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::Denied);
    assert!(claim.status.is_terminal());
}

#[tokio::test]
async fn test_reconcile_rejects_non_terminal_target() {
    let ledger = MemoryLedger::new();
    let service = standard_service(&ledger);
    service
        .ingest(ShipmentIngestBuilder::new().build())
        .await
        .unwrap();

    let claims = ClaimsService::new(ledger.clone());
    claims.submit_draft_batch().await.unwrap();
    let claim_id = ledger.claims_with_status(ClaimStatus::Submitted).await.unwrap()[0].id;

    let err = claims
        .reconcile(claim_id, ClaimStatus::Draft, None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Claim(ClaimError::InvalidReconciliationStatus(_))
    ));
}
