//! Aeroclaim event bus and durable event log.
//!
//! Status transitions and eligibility decisions are published as
//! [`ClaimEvent`]s on an in-process [`EventBus`]; the out-of-scope
//! notification layer subscribes to the bus, while [`EventPersistence`]
//! writes every event to the `events` table as the replayable record.

pub mod bus;
pub mod persistence;

pub use bus::{event_types, ClaimEvent, EventBus};
pub use persistence::EventPersistence;
