//! Integration tests for claim persistence and the optimistic status
//! transition, run against a real database.
//!
//! Verifies that:
//! - Claim creation stores the aggregate (claim + legs) atomically
//! - The status CAS applies exactly once and signals conflicts
//! - History is append-only and ordered
//! - Eligibility snapshots, overrides, and anonymization behave as the
//!   domain layer expects

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sqlx::PgPool;

use aeroclaim_db::models::claim::{CreateClaim, CreateFlightLeg, CreateHistoryEntry};
use aeroclaim_db::repositories::{
    ClaimRepo, FlightLegRepo, StatusHistoryRepo, TransitionOutcome,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fra_jfk_leg(delay_minutes: i64) -> CreateFlightLeg {
    let scheduled_arrival = Utc::now() - Duration::days(2);
    CreateFlightLeg {
        departure_airport: "FRA".to_string(),
        arrival_airport: "JFK".to_string(),
        scheduled_departure: scheduled_arrival - Duration::hours(9),
        scheduled_arrival,
        actual_departure: None,
        actual_arrival: Some(scheduled_arrival + Duration::minutes(delay_minutes)),
        flight_status: "delayed".to_string(),
    }
}

fn new_claim(reference: &str) -> CreateClaim {
    CreateClaim {
        customer_reference: reference.to_string(),
        incident_type: "delay".to_string(),
        regulation_basis: "eu261".to_string(),
        legs: vec![fra_jfk_leg(285)],
    }
}

fn history_entry(claim_id: i64, from: &str, to: &str, reason: Option<&str>) -> CreateHistoryEntry {
    CreateHistoryEntry {
        claim_id,
        from_status: from.to_string(),
        to_status: to.to_string(),
        actor: "admin-1".to_string(),
        reason: reason.map(str::to_string),
        reopened: false,
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_stores_claim_with_legs(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1001")).await.unwrap();

    assert_eq!(claim.status, "submitted");
    assert_eq!(claim.customer_reference, "CUST-1001");
    assert!(claim.compensation_amount.is_none());

    let legs = FlightLegRepo::list_current_for_claim(&pool, claim.id).await.unwrap();
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].departure_airport, "FRA");
    assert_eq!(legs[0].arrival_airport, "JFK");
    assert_eq!(legs[0].snapshot_seq, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_by_id_returns_none_for_missing(pool: PgPool) {
    assert!(ClaimRepo::find_by_id(&pool, 9999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status(pool: PgPool) {
    let a = ClaimRepo::create(&pool, &new_claim("CUST-A")).await.unwrap();
    let _b = ClaimRepo::create(&pool, &new_claim("CUST-B")).await.unwrap();

    let outcome = ClaimRepo::transition_status(
        &pool,
        a.id,
        "submitted",
        &history_entry(a.id, "submitted", "pending_review", None),
        None,
    )
    .await
    .unwrap();
    assert!(matches!(outcome, TransitionOutcome::Applied(_)));

    let pending = ClaimRepo::list(&pool, Some("pending_review")).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, a.id);

    let all = ClaimRepo::list(&pool, None).await.unwrap();
    assert_eq!(all.len(), 2);
}

// ---------------------------------------------------------------------------
// Optimistic transition
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn transition_applies_and_appends_history(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1002")).await.unwrap();

    let outcome = ClaimRepo::transition_status(
        &pool,
        claim.id,
        "submitted",
        &history_entry(claim.id, "submitted", "pending_review", None),
        None,
    )
    .await
    .unwrap();

    let TransitionOutcome::Applied(history) = outcome else {
        panic!("expected transition to apply");
    };
    assert_eq!(history.from_status, "submitted");
    assert_eq!(history.to_status, "pending_review");

    let row = ClaimRepo::find_by_id(&pool, claim.id).await.unwrap().unwrap();
    assert_eq!(row.status, "pending_review");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_expected_status_conflicts_without_history(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1003")).await.unwrap();

    let first = ClaimRepo::transition_status(
        &pool,
        claim.id,
        "submitted",
        &history_entry(claim.id, "submitted", "pending_review", None),
        None,
    )
    .await
    .unwrap();
    assert!(matches!(first, TransitionOutcome::Applied(_)));

    // Second writer still believes the claim is in `submitted`.
    let second = ClaimRepo::transition_status(
        &pool,
        claim.id,
        "submitted",
        &history_entry(claim.id, "submitted", "rejected", Some("duplicate claim")),
        None,
    )
    .await
    .unwrap();
    assert!(matches!(second, TransitionOutcome::Conflict));

    // The losing attempt must leave no trace: status unchanged, exactly
    // one history row.
    let row = ClaimRepo::find_by_id(&pool, claim.id).await.unwrap().unwrap();
    assert_eq!(row.status, "pending_review");
    let history = StatusHistoryRepo::list_for_claim(&pool, claim.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_transitions_have_exactly_one_winner(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1004")).await.unwrap();

    let pool_a = pool.clone();
    let pool_b = pool.clone();
    let id = claim.id;

    let a = tokio::spawn(async move {
        ClaimRepo::transition_status(
            &pool_a,
            id,
            "submitted",
            &history_entry(id, "submitted", "pending_review", None),
            None,
        )
        .await
        .unwrap()
    });
    let b = tokio::spawn(async move {
        ClaimRepo::transition_status(
            &pool_b,
            id,
            "submitted",
            &history_entry(id, "submitted", "cancelled", None),
            None,
        )
        .await
        .unwrap()
    });

    let (outcome_a, outcome_b) = (a.await.unwrap(), b.await.unwrap());

    let applied = [&outcome_a, &outcome_b]
        .iter()
        .filter(|o| matches!(o, TransitionOutcome::Applied(_)))
        .count();
    assert_eq!(applied, 1, "exactly one writer must win");

    let history = StatusHistoryRepo::list_for_claim(&pool, claim.id).await.unwrap();
    assert_eq!(history.len(), 1, "no double-apply, no lost update");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_transition_finalizes_amount_atomically(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1005")).await.unwrap();

    // Walk to under_review first.
    for (from, to) in [("submitted", "pending_review"), ("pending_review", "under_review")] {
        let outcome = ClaimRepo::transition_status(
            &pool,
            claim.id,
            from,
            &history_entry(claim.id, from, to, None),
            None,
        )
        .await
        .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Applied(_)));
    }

    let outcome = ClaimRepo::transition_status(
        &pool,
        claim.id,
        "under_review",
        &history_entry(claim.id, "under_review", "approved", None),
        Some((dec!(600), Some("EUR".to_string()))),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, TransitionOutcome::Applied(_)));

    let row = ClaimRepo::find_by_id(&pool, claim.id).await.unwrap().unwrap();
    assert_eq!(row.status, "approved");
    assert_eq!(row.compensation_amount, Some(dec!(600)));
    assert_eq!(row.currency.as_deref(), Some("EUR"));
}

// ---------------------------------------------------------------------------
// History ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_preserves_write_order(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1006")).await.unwrap();

    let chain = [
        ("submitted", "pending_review"),
        ("pending_review", "under_review"),
        ("under_review", "additional_info_required"),
        ("additional_info_required", "under_review"),
    ];
    for (from, to) in chain {
        let reason =
            (to == "additional_info_required").then_some("need the boarding pass");
        ClaimRepo::transition_status(
            &pool,
            claim.id,
            from,
            &history_entry(claim.id, from, to, reason),
            None,
        )
        .await
        .unwrap();
    }

    let history = StatusHistoryRepo::list_for_claim(&pool, claim.id).await.unwrap();
    assert_eq!(history.len(), 4);
    for (row, (from, to)) in history.iter().zip(chain) {
        assert_eq!(row.from_status, from);
        assert_eq!(row.to_status, to);
    }
}

// ---------------------------------------------------------------------------
// Eligibility snapshot, snapshots, anonymization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn eligibility_snapshot_round_trips(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1007")).await.unwrap();

    let snapshot = serde_json::json!({
        "eligible": true,
        "compensation_amount": "600",
        "currency": "EUR",
        "regulation_basis": "eu261",
        "reason": "arrival delay of 285 minutes meets the EU261 threshold",
        "requires_manual_review": false,
        "reducible": false,
    });
    assert!(ClaimRepo::set_eligibility(&pool, claim.id, &snapshot).await.unwrap());

    let row = ClaimRepo::find_by_id(&pool, claim.id).await.unwrap().unwrap();
    assert_eq!(row.eligibility, Some(snapshot));
    // Snapshot alone finalizes nothing.
    assert!(row.compensation_amount.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn leg_refresh_creates_new_snapshot(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1008")).await.unwrap();

    let refreshed =
        FlightLegRepo::insert_snapshot(&pool, claim.id, &[fra_jfk_leg(300)]).await.unwrap();
    assert_eq!(refreshed[0].snapshot_seq, 2);

    // Current view returns only the newest snapshot; the old rows remain.
    let current = FlightLegRepo::list_current_for_claim(&pool, claim.id).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].snapshot_seq, 2);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flight_legs WHERE claim_id = $1")
        .bind(claim.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymize_blanks_reference_and_is_idempotent(pool: PgPool) {
    let claim = ClaimRepo::create(&pool, &new_claim("CUST-1009")).await.unwrap();

    assert!(ClaimRepo::anonymize(&pool, claim.id, "anonymized").await.unwrap());
    // Second call finds nothing left to anonymize.
    assert!(!ClaimRepo::anonymize(&pool, claim.id, "anonymized").await.unwrap());

    let row = ClaimRepo::find_by_id(&pool, claim.id).await.unwrap().unwrap();
    assert_eq!(row.customer_reference, "anonymized");
    assert!(row.anonymized_at.is_some());
}
