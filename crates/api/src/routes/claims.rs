//! Route definitions for the claim lifecycle.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::claims;
use crate::state::AppState;

/// Claim routes, nested under `/claims`.
///
/// ```text
/// GET    /                                  list_claims (?status=)
/// POST   /                                  submit_claim
/// GET    /{claim_id}                        get_claim
/// GET    /{claim_id}/history                get_history
/// GET    /{claim_id}/next-states            get_next_states
/// POST   /{claim_id}/evaluate               evaluate_claim
/// POST   /{claim_id}/transition             transition_claim
/// POST   /{claim_id}/reopen                 reopen_claim
/// POST   /{claim_id}/compensation-override  override_compensation
/// POST   /{claim_id}/anonymize              anonymize_claim
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(claims::list_claims).post(claims::submit_claim))
        .route("/{claim_id}", get(claims::get_claim))
        .route("/{claim_id}/history", get(claims::get_history))
        .route("/{claim_id}/next-states", get(claims::get_next_states))
        .route("/{claim_id}/evaluate", post(claims::evaluate_claim))
        .route("/{claim_id}/transition", post(claims::transition_claim))
        .route("/{claim_id}/reopen", post(claims::reopen_claim))
        .route(
            "/{claim_id}/compensation-override",
            post(claims::override_compensation),
        )
        .route("/{claim_id}/anonymize", post(claims::anonymize_claim))
}
