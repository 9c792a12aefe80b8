//! Pure domain logic for the aeroclaim compensation platform.
//!
//! This crate holds the three pieces of the system with real business
//! rules, free of any I/O so they can be exercised directly in tests:
//!
//! - [`distance`] — great-circle distance between airports.
//! - [`eligibility`] — the EU261 eligibility and compensation engine.
//! - [`claim_status`] / [`claim`] — the claim lifecycle state machine
//!   and the claim aggregate with its append-only status history.
//!
//! Persistence, HTTP, and event delivery live in the sibling crates and
//! call into this one.

pub mod airport;
pub mod claim;
pub mod claim_status;
pub mod distance;
pub mod eligibility;
pub mod error;
pub mod flight;
pub mod types;

pub use claim::{Claim, StatusHistoryEntry};
pub use claim_status::ClaimStatus;
pub use eligibility::{evaluate, EligibilityResult, EvaluationInput, IncidentType, RegulationBasis};
pub use error::CoreError;
