//! Integration tests for the event persistence loop against a real
//! database: events published on the bus must land in the `events` table.

use std::time::Duration;

use sqlx::PgPool;

use aeroclaim_db::repositories::EventRepo;
use aeroclaim_events::{event_types, ClaimEvent, EventBus, EventPersistence};

/// Poll the events table until `count` rows exist for the claim, or panic.
async fn wait_for_events(pool: &PgPool, claim_id: i64, count: usize) -> Vec<String> {
    for _ in 0..50 {
        let rows = EventRepo::list_for_entity(pool, "claim", claim_id)
            .await
            .unwrap();
        if rows.len() >= count {
            return rows.into_iter().map(|r| r.event_type).collect();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("events for claim {claim_id} never reached count {count}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn published_events_are_persisted_in_order(pool: PgPool) {
    let bus = EventBus::default();
    let handle = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(ClaimEvent::new(event_types::CLAIM_SUBMITTED, 42));
    bus.publish(ClaimEvent::status_changed(42, "submitted", "pending_review", "admin-1"));
    bus.publish(
        ClaimEvent::new(event_types::CLAIM_REOPENED, 42)
            .with_actor("admin-2")
            .with_payload(serde_json::json!({ "reason": "new evidence" })),
    );

    let types = wait_for_events(&pool, 42, 3).await;
    assert_eq!(
        types,
        vec![
            event_types::CLAIM_SUBMITTED,
            event_types::CLAIM_STATUS_CHANGED,
            event_types::CLAIM_REOPENED,
        ]
    );

    // Actor and payload survive the round trip.
    let rows = EventRepo::list_for_entity(&pool, "claim", 42).await.unwrap();
    assert_eq!(rows[2].actor.as_deref(), Some("admin-2"));
    assert_eq!(rows[2].payload["reason"], "new evidence");
    assert_eq!(rows[1].payload["to_status"], "pending_review");

    // Dropping the bus closes the channel and ends the loop.
    drop(bus);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("persistence loop should exit when the bus is dropped")
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recent_events_are_listed_newest_first(pool: PgPool) {
    for claim_id in [1, 2, 3] {
        EventRepo::insert(
            &pool,
            event_types::CLAIM_SUBMITTED,
            Some("claim"),
            Some(claim_id),
            None,
            &serde_json::json!({}),
        )
        .await
        .unwrap();
    }

    let recent = EventRepo::list_recent(&pool, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].source_entity_id, Some(3));
    assert_eq!(recent[1].source_entity_id, Some(2));
}
