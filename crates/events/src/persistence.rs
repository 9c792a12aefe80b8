//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`ClaimEvent`] to the
//! `events` table. It runs as a long-lived background task and shuts
//! down when the bus sender is dropped.

use tokio::sync::broadcast;

use aeroclaim_core::types::DbId;
use aeroclaim_db::repositories::EventRepo;
use aeroclaim_db::DbPool;

use crate::bus::ClaimEvent;

/// Background service that persists claim events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop.
    ///
    /// Persists every event received on `receiver`. A failed write is
    /// logged and skipped rather than stopping the loop; the loop exits
    /// when the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ClaimEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            claim_id = event.claim_id,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `events` table.
    async fn persist(pool: &DbPool, event: &ClaimEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &event.event_type,
            Some("claim"),
            Some(event.claim_id),
            event.actor.as_deref(),
            &event.payload,
        )
        .await
    }
}
