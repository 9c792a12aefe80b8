//! Route definitions for airport reference data.

use axum::routing::get;
use axum::Router;

use crate::handlers::airports;
use crate::state::AppState;

/// Airport routes, nested under `/airports`.
///
/// ```text
/// GET    /          list_airports
/// GET    /{iata}    get_airport
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(airports::list_airports))
        .route("/{iata}", get(airports::get_airport))
}
