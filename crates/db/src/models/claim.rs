//! Claim, flight leg, and status history models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use aeroclaim_core::types::{DbId, Timestamp};

/// A row from the `claims` table.
///
/// Enum-typed fields are stored as TEXT; parsing into the core enums
/// happens at the repository/handler boundary so a bad row fails loudly
/// instead of being silently misclassified.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClaimRow {
    pub id: DbId,
    pub customer_reference: String,
    pub incident_type: String,
    pub regulation_basis: String,
    pub status: String,
    /// Latest `EligibilityResult` snapshot, serialized as JSON.
    pub eligibility: Option<serde_json::Value>,
    pub compensation_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub anonymized_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `flight_legs` table. Append-only snapshots.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FlightLegRow {
    pub id: DbId,
    pub claim_id: DbId,
    pub snapshot_seq: i32,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: Timestamp,
    pub scheduled_arrival: Timestamp,
    pub actual_departure: Option<Timestamp>,
    pub actual_arrival: Option<Timestamp>,
    pub flight_status: String,
    pub created_at: Timestamp,
}

/// A row from the `claim_status_history` table. Never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusHistoryRow {
    pub id: DbId,
    pub claim_id: DbId,
    pub from_status: String,
    pub to_status: String,
    pub actor: String,
    pub reason: Option<String>,
    pub reopened: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a claim with its initial flight legs.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClaim {
    pub customer_reference: String,
    pub incident_type: String,
    pub regulation_basis: String,
    pub legs: Vec<CreateFlightLeg>,
}

/// DTO for one flight leg snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFlightLeg {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: Timestamp,
    pub scheduled_arrival: Timestamp,
    pub actual_departure: Option<Timestamp>,
    pub actual_arrival: Option<Timestamp>,
    pub flight_status: String,
}

/// DTO for appending a status history entry.
#[derive(Debug, Clone)]
pub struct CreateHistoryEntry {
    pub claim_id: DbId,
    pub from_status: String,
    pub to_status: String,
    pub actor: String,
    pub reason: Option<String>,
    pub reopened: bool,
}
