//! Repository for the `airports` reference table.

use sqlx::PgPool;

use crate::models::airport::{AirportRow, UpsertAirport};

/// Column list for airports queries.
const AIRPORT_COLUMNS: &str = "iata, name, country, latitude, longitude, created_at, updated_at";

/// Read/upsert operations for airport reference data.
pub struct AirportRepo;

impl AirportRepo {
    /// Find an airport by its IATA code (expects uppercase).
    pub async fn find_by_iata(
        pool: &PgPool,
        iata: &str,
    ) -> Result<Option<AirportRow>, sqlx::Error> {
        let query = format!("SELECT {AIRPORT_COLUMNS} FROM airports WHERE iata = $1");
        sqlx::query_as::<_, AirportRow>(&query)
            .bind(iata)
            .fetch_optional(pool)
            .await
    }

    /// Insert or refresh one airport from the external reference feed.
    pub async fn upsert(pool: &PgPool, input: &UpsertAirport) -> Result<AirportRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO airports (iata, name, country, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (iata) DO UPDATE SET
                name = EXCLUDED.name,
                country = EXCLUDED.country,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                updated_at = NOW()
             RETURNING {AIRPORT_COLUMNS}"
        );
        sqlx::query_as::<_, AirportRow>(&query)
            .bind(&input.iata)
            .bind(&input.name)
            .bind(&input.country)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_one(pool)
            .await
    }

    /// List all airports, ordered by IATA code.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AirportRow>, sqlx::Error> {
        let query = format!("SELECT {AIRPORT_COLUMNS} FROM airports ORDER BY iata ASC");
        sqlx::query_as::<_, AirportRow>(&query).fetch_all(pool).await
    }
}
