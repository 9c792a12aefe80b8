//! Repository for the append-only `claim_status_history` table.
//!
//! Only INSERT and SELECT exist here; the audit trail is never updated
//! or deleted.

use sqlx::{PgPool, Postgres, Transaction};

use aeroclaim_core::types::DbId;

use crate::models::claim::{CreateHistoryEntry, StatusHistoryRow};

/// Column list for claim_status_history queries.
const HISTORY_COLUMNS: &str =
    "id, claim_id, from_status, to_status, actor, reason, reopened, created_at";

/// Read/append operations for the status audit trail.
pub struct StatusHistoryRepo;

impl StatusHistoryRepo {
    /// List a claim's history in the order it was written.
    pub async fn list_for_claim(
        pool: &PgPool,
        claim_id: DbId,
    ) -> Result<Vec<StatusHistoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM claim_status_history
             WHERE claim_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, StatusHistoryRow>(&query)
            .bind(claim_id)
            .fetch_all(pool)
            .await
    }

    /// Append a history entry outside of a transition transaction
    /// (used for the anonymization audit marker).
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateHistoryEntry,
    ) -> Result<StatusHistoryRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = insert_history_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(row)
    }
}

/// Append one history row inside an existing transaction.
pub(crate) async fn insert_history_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry: &CreateHistoryEntry,
) -> Result<StatusHistoryRow, sqlx::Error> {
    let query = format!(
        "INSERT INTO claim_status_history
            (claim_id, from_status, to_status, actor, reason, reopened)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {HISTORY_COLUMNS}"
    );
    sqlx::query_as::<_, StatusHistoryRow>(&query)
        .bind(entry.claim_id)
        .bind(&entry.from_status)
        .bind(&entry.to_status)
        .bind(&entry.actor)
        .bind(&entry.reason)
        .bind(entry.reopened)
        .fetch_one(&mut **tx)
        .await
}
