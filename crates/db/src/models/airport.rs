//! Airport reference data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use aeroclaim_core::airport::{validate_coordinates, Airport, IataCode};
use aeroclaim_core::error::CoreError;
use aeroclaim_core::types::Timestamp;

/// A row from the `airports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AirportRow {
    pub iata: String,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AirportRow {
    /// Convert into the core domain type, re-validating the IATA code
    /// and coordinate ranges.
    pub fn into_domain(self) -> Result<Airport, CoreError> {
        validate_coordinates(self.latitude, self.longitude)?;
        Ok(Airport {
            iata: IataCode::parse(&self.iata)?,
            name: self.name,
            country: self.country,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// DTO for upserting airport reference data.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertAirport {
    pub iata: String,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}
