//! Repository for the append-only `flight_legs` snapshot table.

use sqlx::{PgPool, Postgres, Transaction};

use aeroclaim_core::types::DbId;

use crate::models::claim::{CreateFlightLeg, FlightLegRow};

/// Column list for flight_legs queries.
const LEG_COLUMNS: &str = "id, claim_id, snapshot_seq, departure_airport, arrival_airport, \
    scheduled_departure, scheduled_arrival, actual_departure, actual_arrival, flight_status, \
    created_at";

/// Read and snapshot-insert operations for flight legs.
pub struct FlightLegRepo;

impl FlightLegRepo {
    /// List the latest snapshot's legs for a claim, in insertion order.
    pub async fn list_current_for_claim(
        pool: &PgPool,
        claim_id: DbId,
    ) -> Result<Vec<FlightLegRow>, sqlx::Error> {
        let query = format!(
            "SELECT {LEG_COLUMNS} FROM flight_legs
             WHERE claim_id = $1
               AND snapshot_seq = (
                   SELECT COALESCE(MAX(snapshot_seq), 1) FROM flight_legs WHERE claim_id = $1
               )
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, FlightLegRow>(&query)
            .bind(claim_id)
            .fetch_all(pool)
            .await
    }

    /// Record a refreshed set of legs as a new snapshot.
    ///
    /// Existing rows are never touched; the new rows get the next
    /// `snapshot_seq` for the claim.
    pub async fn insert_snapshot(
        pool: &PgPool,
        claim_id: DbId,
        legs: &[CreateFlightLeg],
    ) -> Result<Vec<FlightLegRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let next_seq: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(snapshot_seq), 0) + 1 FROM flight_legs WHERE claim_id = $1",
        )
        .bind(claim_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(legs.len());
        for leg in legs {
            rows.push(insert_leg_tx(&mut tx, claim_id, next_seq, leg).await?);
        }

        tx.commit().await?;
        Ok(rows)
    }
}

/// Insert one leg row inside an existing transaction.
pub(crate) async fn insert_leg_tx(
    tx: &mut Transaction<'_, Postgres>,
    claim_id: DbId,
    snapshot_seq: i32,
    leg: &CreateFlightLeg,
) -> Result<FlightLegRow, sqlx::Error> {
    let query = format!(
        "INSERT INTO flight_legs
            (claim_id, snapshot_seq, departure_airport, arrival_airport,
             scheduled_departure, scheduled_arrival, actual_departure, actual_arrival,
             flight_status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {LEG_COLUMNS}"
    );
    sqlx::query_as::<_, FlightLegRow>(&query)
        .bind(claim_id)
        .bind(snapshot_seq)
        .bind(&leg.departure_airport)
        .bind(&leg.arrival_airport)
        .bind(leg.scheduled_departure)
        .bind(leg.scheduled_arrival)
        .bind(leg.actual_departure)
        .bind(leg.actual_arrival)
        .bind(&leg.flight_status)
        .fetch_one(&mut **tx)
        .await
}
