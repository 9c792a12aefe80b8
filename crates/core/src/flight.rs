//! Flight leg snapshots.
//!
//! A [`FlightLeg`] records one scheduled segment as it stood when the
//! claim referenced it. Legs are immutable once captured: refreshing
//! flight data creates a new snapshot row rather than editing in place,
//! so the evidence a decision was based on is preserved.

use serde::{Deserialize, Serialize};

use crate::airport::IataCode;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// FlightStatus
// ---------------------------------------------------------------------------

/// Operational status of a flight segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Scheduled,
    Delayed,
    Cancelled,
    Diverted,
}

impl FlightStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Delayed => "delayed",
            Self::Cancelled => "cancelled",
            Self::Diverted => "diverted",
        }
    }
}

impl std::str::FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "delayed" => Ok(Self::Delayed),
            "cancelled" => Ok(Self::Cancelled),
            "diverted" => Ok(Self::Diverted),
            other => Err(format!("Unknown flight status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// FlightLeg
// ---------------------------------------------------------------------------

/// One scheduled flight segment as captured into a claim.
///
/// Actual timestamps are `None` until observed (the flight may not have
/// operated yet when the claim is submitted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightLeg {
    pub departure_airport: IataCode,
    pub arrival_airport: IataCode,
    pub scheduled_departure: Timestamp,
    pub scheduled_arrival: Timestamp,
    pub actual_departure: Option<Timestamp>,
    pub actual_arrival: Option<Timestamp>,
    pub status: FlightStatus,
}

impl FlightLeg {
    /// Arrival delay in whole minutes, or `None` if the actual arrival
    /// has not been observed yet.
    ///
    /// Negative values mean an early arrival; EU261 only counts arrival
    /// delay, so departure times play no part here.
    pub fn arrival_delay_minutes(&self) -> Option<i64> {
        self.actual_arrival
            .map(|actual| (actual - self.scheduled_arrival).num_minutes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
