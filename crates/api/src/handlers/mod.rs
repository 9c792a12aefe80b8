//! HTTP handler implementations, grouped by resource.

pub mod airports;
pub mod claims;
pub mod health;
