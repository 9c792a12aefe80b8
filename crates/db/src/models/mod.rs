//! Row structs and create DTOs for each table.

pub mod airport;
pub mod claim;
pub mod event;
