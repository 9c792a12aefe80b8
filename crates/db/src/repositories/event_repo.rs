//! Repository for the `events` table.

use sqlx::PgPool;

use aeroclaim_core::types::DbId;

use crate::models::event::EventRow;

/// Column list for events queries.
const EVENT_COLUMNS: &str =
    "id, event_type, source_entity_type, source_entity_id, actor, payload, created_at";

/// Insert/read operations for persisted domain events.
pub struct EventRepo;

impl EventRepo {
    /// Write one event row.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO events (event_type, source_entity_type, source_entity_id, actor, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor)
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// List the most recent events, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List events for one entity, oldest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE source_entity_type = $1 AND source_entity_id = $2
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
