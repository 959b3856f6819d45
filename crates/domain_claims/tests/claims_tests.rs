//! Claim lifecycle tests

use core_kernel::{AuditResultId, Currency, Money, ShipmentId};
use rust_decimal_macros::dec;

use domain_claims::{Claim, ClaimError, ClaimStatus};

fn draft_claim() -> Claim {
    Claim::draft(
        ShipmentId::new_v7(),
        AuditResultId::new_v7(),
        Money::new(dec!(125.50), Currency::USD),
        Some("Late Delivery (GSR)".to_string()),
    )
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_draft_initial_state() {
        let claim = draft_claim();
        assert_eq!(claim.status, ClaimStatus::Draft);
        assert_eq!(claim.claim_amount.amount(), dec!(125.50));
        assert!(claim.submitted_at.is_none());
        assert!(claim.settled_at.is_none());
        assert!(claim.recovery_amount.is_none());
    }

    #[test]
    fn test_submit_sets_submitted_at() {
        let mut claim = draft_claim();
        claim.submit().unwrap();
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert!(claim.submitted_at.is_some());
    }

    #[test]
    fn test_cannot_submit_twice() {
        let mut claim = draft_claim();
        claim.submit().unwrap();
        assert!(matches!(
            claim.submit(),
            Err(ClaimError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_disputed_is_reachable_from_submitted() {
        let mut claim = draft_claim();
        claim.submit().unwrap();
        claim.mark_disputed(Some("FX-CASE-8812".to_string())).unwrap();
        assert_eq!(claim.status, ClaimStatus::Disputed);
        assert_eq!(claim.carrier_case_number.as_deref(), Some("FX-CASE-8812"));
    }

    #[test]
    fn test_draft_cannot_be_disputed() {
        let mut claim = draft_claim();
        assert!(claim.mark_disputed(None).is_err());
    }

    #[test]
    fn test_revise_only_in_draft() {
        let mut claim = draft_claim();
        claim
            .revise(Money::new(dec!(99.00), Currency::USD), None)
            .unwrap();
        assert_eq!(claim.claim_amount.amount(), dec!(99.00));
        assert_eq!(claim.reason, None);

        claim.submit().unwrap();
        assert!(claim
            .revise(Money::new(dec!(10.00), Currency::USD), None)
            .is_err());
    }
}

mod reconciliation {
    use super::*;

    #[test]
    fn test_recovered_requires_amount() {
        let mut claim = draft_claim();
        claim.submit().unwrap();

        let err = claim.reconcile(ClaimStatus::Recovered, None, None).unwrap_err();
        assert_eq!(err, ClaimError::MissingRecoveryAmount);
        // No state change on rejection.
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert!(claim.settled_at.is_none());
    }

    #[test]
    fn test_recovered_with_amount() {
        let mut claim = draft_claim();
        claim.submit().unwrap();
        claim
            .reconcile(
                ClaimStatus::Recovered,
                Some(Money::new(dec!(125.50), Currency::USD)),
                Some("FX-CASE-8812".to_string()),
            )
            .unwrap();

        assert_eq!(claim.status, ClaimStatus::Recovered);
        assert_eq!(claim.recovery_amount.unwrap().amount(), dec!(125.50));
        assert!(claim.settled_at.is_some());
        assert_eq!(claim.carrier_case_number.as_deref(), Some("FX-CASE-8812"));
    }

    #[test]
    fn test_denied_leaves_recovery_unset() {
        let mut claim = draft_claim();
        claim.submit().unwrap();
        claim.reconcile(ClaimStatus::Denied, None, None).unwrap();

        assert_eq!(claim.status, ClaimStatus::Denied);
        assert!(claim.recovery_amount.is_none());
        assert!(claim.settled_at.is_some());
    }

    #[test]
    fn test_disputed_can_settle_both_ways() {
        let mut recovered = draft_claim();
        recovered.submit().unwrap();
        recovered.mark_disputed(None).unwrap();
        assert!(recovered
            .reconcile(
                ClaimStatus::Recovered,
                Some(Money::new(dec!(50.00), Currency::USD)),
                None
            )
            .is_ok());

        let mut denied = draft_claim();
        denied.submit().unwrap();
        denied.mark_disputed(None).unwrap();
        assert!(denied.reconcile(ClaimStatus::Denied, None, None).is_ok());
    }

    #[test]
    fn test_invalid_reconciliation_target() {
        let mut claim = draft_claim();
        claim.submit().unwrap();

        let err = claim.reconcile(ClaimStatus::Draft, None, None).unwrap_err();
        assert_eq!(
            err,
            ClaimError::InvalidReconciliationStatus("DRAFT".to_string())
        );
        assert_eq!(claim.status, ClaimStatus::Submitted);
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        let mut claim = draft_claim();
        claim.submit().unwrap();
        claim.reconcile(ClaimStatus::Denied, None, None).unwrap();

        assert!(claim.status.is_terminal());
        assert!(claim
            .reconcile(
                ClaimStatus::Recovered,
                Some(Money::new(dec!(1.00), Currency::USD)),
                None
            )
            .is_err());
    }
}

mod status_codec {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            ClaimStatus::Draft,
            ClaimStatus::Submitted,
            ClaimStatus::Disputed,
            ClaimStatus::Recovered,
            ClaimStatus::Denied,
        ] {
            let parsed: ClaimStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(matches!(
            "CANCELLED".parse::<ClaimStatus>(),
            Err(ClaimError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_serde_wire_format() {
        let json = serde_json::to_string(&ClaimStatus::Submitted).unwrap();
        assert_eq!(json, "\"SUBMITTED\"");
    }
}
