//! Handlers for airport reference data lookups.

use axum::extract::{Path, State};
use axum::Json;

use aeroclaim_core::airport::IataCode;
use aeroclaim_db::models::airport::AirportRow;
use aeroclaim_db::repositories::AirportRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/airports/{iata}
///
/// Look up one airport by IATA code (case-insensitive).
pub async fn get_airport(
    State(state): State<AppState>,
    Path(iata): Path<String>,
) -> AppResult<Json<DataResponse<AirportRow>>> {
    let code = IataCode::parse(&iata)?;
    let airport = AirportRepo::find_by_iata(&state.pool, code.as_str())
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    Ok(Json(DataResponse { data: airport }))
}

/// GET /api/v1/airports
///
/// List all known airports.
pub async fn list_airports(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AirportRow>>>> {
    let airports = AirportRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: airports }))
}
