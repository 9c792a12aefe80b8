pub mod airports;
pub mod claims;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                          liveness + db ping
///
/// /airports                                        list reference airports
/// /airports/{iata}                                 get one airport
///
/// /claims                                          list, submit
/// /claims/{claim_id}                               get claim + current legs
/// /claims/{claim_id}/history                       full status audit trail
/// /claims/{claim_id}/next-states                   legal transition targets
/// /claims/{claim_id}/evaluate                      run eligibility engine (POST)
/// /claims/{claim_id}/transition                    apply a status change (POST)
/// /claims/{claim_id}/reopen                        reopen rejected claim (POST)
/// /claims/{claim_id}/compensation-override         override amount (POST)
/// /claims/{claim_id}/anonymize                     GDPR erasure (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/airports", airports::router())
        .nest("/claims", claims::router())
}
