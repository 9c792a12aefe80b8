//! Health check route.

use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// ```text
/// GET    /health    health
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}
