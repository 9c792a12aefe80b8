//! Repository structs, one per table group.

mod airport_repo;
mod claim_repo;
mod event_repo;
mod flight_leg_repo;
mod status_history_repo;

pub use airport_repo::AirportRepo;
pub use claim_repo::{ClaimRepo, TransitionOutcome};
pub use event_repo::EventRepo;
pub use flight_leg_repo::FlightLegRepo;
pub use status_history_repo::StatusHistoryRepo;
