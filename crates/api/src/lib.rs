//! HTTP surface for the aeroclaim platform.
//!
//! Exposed as a library so integration tests can build the same router
//! (with the same middleware stack) the binary serves.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
