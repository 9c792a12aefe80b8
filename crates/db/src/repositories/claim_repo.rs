//! Repository for the `claims` table and the status transition CAS.

use rust_decimal::Decimal;
use sqlx::PgPool;

use aeroclaim_core::types::DbId;

use crate::models::claim::{ClaimRow, CreateClaim, CreateHistoryEntry, StatusHistoryRow};
use crate::repositories::flight_leg_repo::insert_leg_tx;
use crate::repositories::status_history_repo::insert_history_tx;

/// Column list for claims queries.
const CLAIM_COLUMNS: &str = "id, customer_reference, incident_type, regulation_basis, status, \
    eligibility, compensation_amount, currency, anonymized_at, created_at, updated_at";

/// Result of an optimistic status transition attempt.
///
/// A conflict is a normal outcome, not an infrastructure error: it means
/// the claim's status changed between the caller's read and this write,
/// and the caller should re-fetch and retry.
#[derive(Debug)]
pub enum TransitionOutcome {
    Applied(StatusHistoryRow),
    Conflict,
}

/// CRUD and workflow operations for claims.
pub struct ClaimRepo;

impl ClaimRepo {
    /// Insert a new claim with its flight leg snapshots, in one
    /// transaction. The claim starts in `submitted`.
    pub async fn create(pool: &PgPool, input: &CreateClaim) -> Result<ClaimRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO claims (customer_reference, incident_type, regulation_basis)
             VALUES ($1, $2, $3)
             RETURNING {CLAIM_COLUMNS}"
        );
        let claim = sqlx::query_as::<_, ClaimRow>(&query)
            .bind(&input.customer_reference)
            .bind(&input.incident_type)
            .bind(&input.regulation_basis)
            .fetch_one(&mut *tx)
            .await?;

        for leg in &input.legs {
            insert_leg_tx(&mut tx, claim.id, 1, leg).await?;
        }

        tx.commit().await?;
        Ok(claim)
    }

    /// Find a claim by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClaimRow>, sqlx::Error> {
        let query = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE id = $1");
        sqlx::query_as::<_, ClaimRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List claims, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
    ) -> Result<Vec<ClaimRow>, sqlx::Error> {
        match status {
            Some(status) => {
                let query = format!(
                    "SELECT {CLAIM_COLUMNS} FROM claims WHERE status = $1
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, ClaimRow>(&query)
                    .bind(status)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query =
                    format!("SELECT {CLAIM_COLUMNS} FROM claims ORDER BY created_at DESC");
                sqlx::query_as::<_, ClaimRow>(&query).fetch_all(pool).await
            }
        }
    }

    /// Store the latest eligibility result snapshot for a claim.
    pub async fn set_eligibility(
        pool: &PgPool,
        id: DbId,
        eligibility: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE claims SET eligibility = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(eligibility)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a validated status transition with an optimistic
    /// compare-and-swap on the current status.
    ///
    /// The UPDATE only matches while the row still holds
    /// `expected_status`; zero rows affected means another writer moved
    /// the claim first and the caller must retry with fresh state. The
    /// status update and the history append commit atomically.
    ///
    /// `finalized_amount` is `Some` only for transitions into `approved`,
    /// carrying the compensation amount (and currency) being finalized.
    pub async fn transition_status(
        pool: &PgPool,
        claim_id: DbId,
        expected_status: &str,
        entry: &CreateHistoryEntry,
        finalized_amount: Option<(Decimal, Option<String>)>,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = match &finalized_amount {
            Some((amount, currency)) => {
                sqlx::query(
                    "UPDATE claims
                     SET status = $3, compensation_amount = $4, currency = $5, updated_at = NOW()
                     WHERE id = $1 AND status = $2",
                )
                .bind(claim_id)
                .bind(expected_status)
                .bind(&entry.to_status)
                .bind(amount)
                .bind(currency.as_deref())
                .execute(&mut *tx)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE claims SET status = $3, updated_at = NOW()
                     WHERE id = $1 AND status = $2",
                )
                .bind(claim_id)
                .bind(expected_status)
                .bind(&entry.to_status)
                .execute(&mut *tx)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(TransitionOutcome::Conflict);
        }

        let history = insert_history_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(TransitionOutcome::Applied(history))
    }

    /// Overwrite a finalized compensation amount, appending the audit
    /// entry in the same transaction.
    pub async fn override_compensation(
        pool: &PgPool,
        claim_id: DbId,
        amount: Decimal,
        entry: &CreateHistoryEntry,
    ) -> Result<StatusHistoryRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE claims SET compensation_amount = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(claim_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        let history = insert_history_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(history)
    }

    /// GDPR erasure: overwrite the customer reference in place, keeping
    /// the row and its history.
    pub async fn anonymize(
        pool: &PgPool,
        claim_id: DbId,
        placeholder: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE claims
             SET customer_reference = $2, anonymized_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND anonymized_at IS NULL",
        )
        .bind(claim_id)
        .bind(placeholder)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
