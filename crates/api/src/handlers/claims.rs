//! Handlers for the claim lifecycle.
//!
//! Submission, eligibility evaluation, status transitions, the rejected
//! reopen override, compensation overrides, and GDPR anonymization.
//! Actor identity arrives as an explicit request field; there is no
//! ambient admin context.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aeroclaim_core::airport::IataCode;
use aeroclaim_core::claim::{Claim, ANONYMIZED_REFERENCE, SYSTEM_ACTOR};
use aeroclaim_core::claim_status::ClaimStatus;
use aeroclaim_core::eligibility::{
    evaluate, EligibilityResult, EvaluationInput, IncidentType, RegulationBasis,
};
use aeroclaim_core::error::CoreError;
use aeroclaim_core::flight::{FlightLeg, FlightStatus};
use aeroclaim_core::types::{DbId, Timestamp};
use aeroclaim_db::models::claim::{
    ClaimRow, CreateClaim, CreateFlightLeg, CreateHistoryEntry, FlightLegRow, StatusHistoryRow,
};
use aeroclaim_db::repositories::{
    AirportRepo, ClaimRepo, FlightLegRepo, StatusHistoryRepo, TransitionOutcome,
};
use aeroclaim_events::{event_types, ClaimEvent};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Request body for claim submission.
///
/// Enum fields deserialize straight into the core types, so an unknown
/// incident type or flight status is rejected at parse time.
#[derive(Debug, Deserialize)]
pub struct SubmitClaimRequest {
    pub customer_reference: String,
    pub incident_type: IncidentType,
    pub regulation_basis: RegulationBasis,
    pub legs: Vec<SubmitFlightLeg>,
}

/// One flight leg in a submission.
#[derive(Debug, Deserialize)]
pub struct SubmitFlightLeg {
    pub departure_airport: IataCode,
    pub arrival_airport: IataCode,
    pub scheduled_departure: Timestamp,
    pub scheduled_arrival: Timestamp,
    pub actual_departure: Option<Timestamp>,
    pub actual_arrival: Option<Timestamp>,
    pub status: FlightStatus,
}

/// Query parameters for claim listing.
#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    pub status: Option<ClaimStatus>,
}

/// Request body for eligibility evaluation.
///
/// The two flags are facts the engine cannot determine itself; the
/// admin (or submission flow) supplies them explicitly.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub extraordinary_circumstance: bool,
    #[serde(default)]
    pub gate_compensation_offered: bool,
}

/// Request body for a status transition.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub new_status: ClaimStatus,
    pub reason: Option<String>,
    pub actor_id: String,
    /// The status the caller last saw. If the claim has moved on since,
    /// the request fails with 409 before any write is attempted.
    pub expected_status: Option<ClaimStatus>,
}

/// Request body for reopening a rejected claim.
#[derive(Debug, Deserialize)]
pub struct ReopenRequest {
    pub reason: String,
    pub actor_id: String,
}

/// Request body for an admin compensation override.
#[derive(Debug, Deserialize)]
pub struct OverrideCompensationRequest {
    pub amount: Decimal,
    pub reason: String,
    pub actor_id: String,
}

/// Claim detail: the row plus its current flight leg snapshot.
#[derive(Debug, Serialize)]
pub struct ClaimDetail {
    #[serde(flatten)]
    pub claim: ClaimRow,
    pub legs: Vec<FlightLegRow>,
}

/// Valid next states for a claim, for UIs that only offer legal moves.
#[derive(Debug, Serialize)]
pub struct NextStates {
    pub current_status: ClaimStatus,
    pub next_states: Vec<ClaimStatus>,
}

// ---------------------------------------------------------------------------
// Submission & reads
// ---------------------------------------------------------------------------

/// POST /api/v1/claims
///
/// Submit a new claim. It starts in `submitted` with its flight legs
/// captured as the first snapshot.
pub async fn submit_claim(
    State(state): State<AppState>,
    Json(input): Json<SubmitClaimRequest>,
) -> AppResult<impl IntoResponse> {
    if input.customer_reference.trim().is_empty() {
        return Err(AppError::BadRequest("customer_reference must not be empty".into()));
    }
    if input.legs.is_empty() {
        return Err(AppError::BadRequest("a claim needs at least one flight leg".into()));
    }

    let create = CreateClaim {
        customer_reference: input.customer_reference.clone(),
        incident_type: input.incident_type.as_str().to_string(),
        regulation_basis: input.regulation_basis.as_str().to_string(),
        legs: input
            .legs
            .iter()
            .map(|leg| CreateFlightLeg {
                departure_airport: leg.departure_airport.as_str().to_string(),
                arrival_airport: leg.arrival_airport.as_str().to_string(),
                scheduled_departure: leg.scheduled_departure,
                scheduled_arrival: leg.scheduled_arrival,
                actual_departure: leg.actual_departure,
                actual_arrival: leg.actual_arrival,
                flight_status: leg.status.as_str().to_string(),
            })
            .collect(),
    };

    let claim = ClaimRepo::create(&state.pool, &create).await?;

    tracing::info!(
        claim_id = claim.id,
        incident_type = %claim.incident_type,
        "Claim submitted"
    );
    state.event_bus.publish(
        ClaimEvent::new(event_types::CLAIM_SUBMITTED, claim.id).with_payload(
            serde_json::json!({ "incident_type": claim.incident_type }),
        ),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: claim })))
}

/// GET /api/v1/claims
///
/// List claims, optionally filtered by status.
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ListClaimsQuery>,
) -> AppResult<Json<DataResponse<Vec<ClaimRow>>>> {
    let status = query.status.map(ClaimStatus::as_str);
    let claims = ClaimRepo::list(&state.pool, status).await?;
    Ok(Json(DataResponse { data: claims }))
}

/// GET /api/v1/claims/{claim_id}
pub async fn get_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClaimDetail>>> {
    let claim = find_claim(&state, claim_id).await?;
    let legs = FlightLegRepo::list_current_for_claim(&state.pool, claim_id).await?;
    Ok(Json(DataResponse {
        data: ClaimDetail { claim, legs },
    }))
}

/// GET /api/v1/claims/{claim_id}/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StatusHistoryRow>>>> {
    find_claim(&state, claim_id).await?;
    let history = StatusHistoryRepo::list_for_claim(&state.pool, claim_id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/claims/{claim_id}/next-states
///
/// The legal transition targets from the claim's current status, so
/// admin UIs only offer valid moves (the error path stays as a second
/// line of defence).
pub async fn get_next_states(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
) -> AppResult<Json<DataResponse<NextStates>>> {
    let claim = find_claim(&state, claim_id).await?;
    let status = parse_status(&claim.status)?;
    Ok(Json(DataResponse {
        data: NextStates {
            current_status: status,
            next_states: status.valid_next_states().to_vec(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Eligibility evaluation
// ---------------------------------------------------------------------------

/// POST /api/v1/claims/{claim_id}/evaluate
///
/// Run the eligibility engine over the claim's current flight legs and
/// store the result as the claim's latest eligibility snapshot.
/// Unresolvable airports yield a "distance unknown" manual-review
/// result, not an error.
pub async fn evaluate_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
    Json(input): Json<EvaluateRequest>,
) -> AppResult<Json<DataResponse<EligibilityResult>>> {
    let claim = find_claim(&state, claim_id).await?;
    let legs = FlightLegRepo::list_current_for_claim(&state.pool, claim_id).await?;
    if legs.is_empty() {
        return Err(AppError::BadRequest("claim has no flight legs to evaluate".into()));
    }

    // EU261 measures the whole journey: origin of the first leg to
    // final destination of the last, with the delay observed at the
    // final destination.
    let first = &legs[0];
    let last = &legs[legs.len() - 1];
    let distance_km = journey_distance_km(&state, first, last).await?;
    let arrival_delay_minutes = row_to_leg(last)?.arrival_delay_minutes();

    let engine_input = EvaluationInput {
        incident_type: parse_incident(&claim.incident_type)?,
        distance_km,
        arrival_delay_minutes,
        extraordinary_circumstance: input.extraordinary_circumstance,
        gate_compensation_offered: input.gate_compensation_offered,
        regulation_basis: parse_basis(&claim.regulation_basis)?,
    };
    let result = evaluate(&engine_input);

    let snapshot = serde_json::to_value(&result)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize eligibility: {e}")))?;
    ClaimRepo::set_eligibility(&state.pool, claim_id, &snapshot).await?;

    tracing::info!(
        claim_id,
        eligible = result.eligible,
        requires_manual_review = result.requires_manual_review,
        "Claim evaluated"
    );
    state.event_bus.publish(
        ClaimEvent::new(event_types::CLAIM_EVALUATED, claim_id).with_payload(snapshot),
    );

    Ok(Json(DataResponse { data: result }))
}

/// Resolve both endpoint airports and compute the journey distance.
///
/// `None` when either airport is not in the reference table — the
/// engine turns that into a manual-review result.
async fn journey_distance_km(
    state: &AppState,
    first: &FlightLegRow,
    last: &FlightLegRow,
) -> Result<Option<f64>, AppError> {
    let origin = AirportRepo::find_by_iata(&state.pool, &first.departure_airport).await?;
    let destination = AirportRepo::find_by_iata(&state.pool, &last.arrival_airport).await?;
    match (origin, destination) {
        (Some(a), Some(b)) => {
            let a = a.into_domain()?;
            let b = b.into_domain()?;
            Ok(Some(a.distance_km_to(&b)))
        }
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/claims/{claim_id}/transition
///
/// Drive the claim workflow. The domain layer validates the edge and
/// the mandatory-reason rule; the persistence layer applies it as a
/// compare-and-swap on the current status, so two admins acting on the
/// same claim cannot both win.
pub async fn transition_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<Json<DataResponse<StatusHistoryRow>>> {
    let row = find_claim(&state, claim_id).await?;
    let current = parse_status(&row.status)?;

    // The decision must be made against the state the caller saw.
    if let Some(expected) = input.expected_status {
        if expected != current {
            return Err(CoreError::ConcurrentModification { expected }.into());
        }
    }

    let mut claim = row_to_domain(&row)?;
    let entry = claim.transition(input.new_status, input.reason, &input.actor_id, Utc::now())?;

    // Approval is the only transition that finalizes money.
    let finalized = (input.new_status == ClaimStatus::Approved)
        .then(|| claim.compensation_amount.map(|amount| (amount, claim.currency.clone())))
        .flatten();

    let create = CreateHistoryEntry {
        claim_id,
        from_status: entry.from_status.as_str().to_string(),
        to_status: entry.to_status.as_str().to_string(),
        actor: entry.actor.clone(),
        reason: entry.reason.clone(),
        reopened: false,
    };
    let outcome =
        ClaimRepo::transition_status(&state.pool, claim_id, current.as_str(), &create, finalized)
            .await?;

    let history = match outcome {
        TransitionOutcome::Applied(history) => history,
        TransitionOutcome::Conflict => {
            return Err(CoreError::ConcurrentModification { expected: current }.into());
        }
    };

    tracing::info!(
        claim_id,
        actor = %input.actor_id,
        from = %history.from_status,
        to = %history.to_status,
        "Claim status changed"
    );
    state.event_bus.publish(ClaimEvent::status_changed(
        claim_id,
        &history.from_status,
        &history.to_status,
        &input.actor_id,
    ));

    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/claims/{claim_id}/reopen
///
/// Admin override: move a rejected claim back into review. Logged with
/// the `reopened` marker and its own event type.
pub async fn reopen_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
    Json(input): Json<ReopenRequest>,
) -> AppResult<Json<DataResponse<StatusHistoryRow>>> {
    let row = find_claim(&state, claim_id).await?;
    let current = parse_status(&row.status)?;

    let mut claim = row_to_domain(&row)?;
    let entry = claim.reopen(input.reason, &input.actor_id, Utc::now())?;

    let create = CreateHistoryEntry {
        claim_id,
        from_status: entry.from_status.as_str().to_string(),
        to_status: entry.to_status.as_str().to_string(),
        actor: entry.actor.clone(),
        reason: entry.reason.clone(),
        reopened: true,
    };
    let outcome =
        ClaimRepo::transition_status(&state.pool, claim_id, current.as_str(), &create, None)
            .await?;

    let history = match outcome {
        TransitionOutcome::Applied(history) => history,
        TransitionOutcome::Conflict => {
            return Err(CoreError::ConcurrentModification { expected: current }.into());
        }
    };

    tracing::info!(claim_id, actor = %input.actor_id, "Rejected claim reopened");
    state.event_bus.publish(
        ClaimEvent::new(event_types::CLAIM_REOPENED, claim_id)
            .with_actor(&input.actor_id)
            .with_payload(serde_json::json!({ "reason": history.reason })),
    );

    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/claims/{claim_id}/compensation-override
///
/// Admin override of a finalized compensation amount, e.g. applying the
/// Art. 7(2) reduction the engine only flags. Requires a reason; the
/// change lands in the audit history.
pub async fn override_compensation(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
    Json(input): Json<OverrideCompensationRequest>,
) -> AppResult<Json<DataResponse<StatusHistoryRow>>> {
    let row = find_claim(&state, claim_id).await?;

    let mut claim = row_to_domain(&row)?;
    let entry =
        claim.override_compensation(input.amount, input.reason, &input.actor_id, Utc::now())?;

    let create = CreateHistoryEntry {
        claim_id,
        from_status: entry.from_status.as_str().to_string(),
        to_status: entry.to_status.as_str().to_string(),
        actor: entry.actor.clone(),
        reason: entry.reason.clone(),
        reopened: false,
    };
    let history = ClaimRepo::override_compensation(&state.pool, claim_id, input.amount, &create)
        .await?;

    tracing::info!(
        claim_id,
        actor = %input.actor_id,
        amount = %input.amount,
        "Compensation amount overridden"
    );
    state.event_bus.publish(
        ClaimEvent::new(event_types::CLAIM_COMPENSATION_OVERRIDDEN, claim_id)
            .with_actor(&input.actor_id)
            .with_payload(serde_json::json!({
                "amount": input.amount,
                "reason": history.reason,
            })),
    );

    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/claims/{claim_id}/anonymize
///
/// GDPR erasure: blank the customer reference in place. The claim row,
/// its legs, and its history remain for audit purposes.
pub async fn anonymize_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClaimRow>>> {
    let row = find_claim(&state, claim_id).await?;

    let erased = ClaimRepo::anonymize(&state.pool, claim_id, ANONYMIZED_REFERENCE).await?;
    if erased {
        // Audit marker: same status on both sides, system actor.
        StatusHistoryRepo::insert(
            &state.pool,
            &CreateHistoryEntry {
                claim_id,
                from_status: row.status.clone(),
                to_status: row.status,
                actor: SYSTEM_ACTOR.to_string(),
                reason: Some("personal data erased".to_string()),
                reopened: false,
            },
        )
        .await?;

        tracing::info!(claim_id, "Claim anonymized");
        state.event_bus.publish(
            ClaimEvent::new(event_types::CLAIM_ANONYMIZED, claim_id).with_actor(SYSTEM_ACTOR),
        );
    }

    let claim = find_claim(&state, claim_id).await?;
    Ok(Json(DataResponse { data: claim }))
}

// ---------------------------------------------------------------------------
// Row <-> domain conversion helpers
// ---------------------------------------------------------------------------

/// Fetch a claim row or fail with 404.
async fn find_claim(state: &AppState, claim_id: DbId) -> Result<ClaimRow, AppError> {
    ClaimRepo::find_by_id(&state.pool, claim_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Claim",
                id: claim_id,
            })
        })
}

/// Reconstruct the core aggregate from a row, enough for the workflow
/// operations (legs and history are not needed for edge validation).
fn row_to_domain(row: &ClaimRow) -> Result<Claim, AppError> {
    let eligibility: Option<EligibilityResult> = row
        .eligibility
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Corrupt eligibility snapshot: {e}")))?;

    Ok(Claim {
        id: row.id,
        customer_reference: row.customer_reference.clone(),
        incident_type: parse_incident(&row.incident_type)?,
        regulation_basis: parse_basis(&row.regulation_basis)?,
        status: parse_status(&row.status)?,
        legs: Vec::new(),
        eligibility,
        compensation_amount: row.compensation_amount,
        currency: row.currency.clone(),
        history: Vec::new(),
    })
}

/// Reconstruct one core flight leg from its snapshot row.
fn row_to_leg(row: &FlightLegRow) -> Result<FlightLeg, AppError> {
    Ok(FlightLeg {
        departure_airport: IataCode::parse(&row.departure_airport)?,
        arrival_airport: IataCode::parse(&row.arrival_airport)?,
        scheduled_departure: row.scheduled_departure,
        scheduled_arrival: row.scheduled_arrival,
        actual_departure: row.actual_departure,
        actual_arrival: row.actual_arrival,
        status: row
            .flight_status
            .parse()
            .map_err(|e: String| AppError::InternalError(e))?,
    })
}

// The columns are CHECK-constrained, so a parse failure here means the
// row predates a vocabulary change; fail loudly as an internal error.

fn parse_status(raw: &str) -> Result<ClaimStatus, AppError> {
    raw.parse()
        .map_err(|e: String| AppError::InternalError(e))
}

fn parse_incident(raw: &str) -> Result<IncidentType, AppError> {
    raw.parse()
        .map_err(|e: String| AppError::InternalError(e))
}

fn parse_basis(raw: &str) -> Result<RegulationBasis, AppError> {
    raw.parse()
        .map_err(|e: String| AppError::InternalError(e))
}
