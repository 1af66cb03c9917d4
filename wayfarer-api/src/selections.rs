//! Child rows of a trip: transportation legs, stays and attractions.
//!
//! Every change re-prices the trip and publishes a `TRIP_UPDATED` event.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use wayfarer_shared::models::events::TripEventKind;
use wayfarer_trip::{
    AccommodationRequest, NewTripAttraction, NewTripTransportation, TripAccommodation,
    TripAttraction, TripTransportation,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangeTransportationRequest {
    pub transportation_option_id: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/trips/{id}/transportation",
            get(list_transportation).post(add_transportation),
        )
        .route(
            "/v1/trips/{id}/transportation/{child_id}",
            patch(update_transportation),
        )
        .route(
            "/v1/trips/{id}/accommodations",
            get(list_accommodations).post(add_accommodation),
        )
        .route(
            "/v1/trips/{id}/accommodations/{child_id}",
            delete(remove_accommodation),
        )
        .route(
            "/v1/trips/{id}/attractions",
            get(list_attractions).post(add_attraction),
        )
        .route(
            "/v1/trips/{id}/attractions/{child_id}",
            delete(remove_attraction),
        )
}

async fn publish_update(state: &AppState, trip_id: i64) -> AppResult<()> {
    let trip = state.trips().require_trip(trip_id).await?;
    state.events.trip_changed(&trip, TripEventKind::TripUpdated);
    Ok(())
}

// ============================================================================
// Transportation
// ============================================================================

/// GET /v1/trips/{id}/transportation
pub async fn list_transportation(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Vec<TripTransportation>>> {
    Ok(Json(state.trips().list_transportation(id).await?))
}

/// POST /v1/trips/{id}/transportation
pub async fn add_transportation(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<NewTripTransportation>, AppError>,
) -> AppResult<(StatusCode, Json<TripTransportation>)> {
    let row = state.planner.add_transportation(id, req).await?;
    publish_update(&state, id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /v1/trips/{id}/transportation/{child_id}
/// Swap the option on an existing leg
pub async fn update_transportation(
    State(state): State<AppState>,
    WithRejection(Path((id, child_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<ChangeTransportationRequest>, AppError>,
) -> AppResult<Json<TripTransportation>> {
    let row = state
        .planner
        .update_transportation(id, child_id, req.transportation_option_id)
        .await?;
    publish_update(&state, id).await?;
    Ok(Json(row))
}

// ============================================================================
// Accommodations
// ============================================================================

/// GET /v1/trips/{id}/accommodations
pub async fn list_accommodations(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Vec<TripAccommodation>>> {
    Ok(Json(state.trips().list_accommodations(id).await?))
}

/// POST /v1/trips/{id}/accommodations
/// Without `rooms`, the fewest rooms that fit the party are booked
pub async fn add_accommodation(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<AccommodationRequest>, AppError>,
) -> AppResult<(StatusCode, Json<TripAccommodation>)> {
    let row = state.planner.add_accommodation(id, req).await?;
    publish_update(&state, id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /v1/trips/{id}/accommodations/{child_id}
pub async fn remove_accommodation(
    State(state): State<AppState>,
    WithRejection(Path((id, child_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
) -> AppResult<StatusCode> {
    state.planner.remove_accommodation(id, child_id).await?;
    publish_update(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Attractions
// ============================================================================

/// GET /v1/trips/{id}/attractions
pub async fn list_attractions(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Vec<TripAttraction>>> {
    Ok(Json(state.trips().list_attractions(id).await?))
}

/// POST /v1/trips/{id}/attractions
pub async fn add_attraction(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<NewTripAttraction>, AppError>,
) -> AppResult<(StatusCode, Json<TripAttraction>)> {
    let row = state.planner.add_attraction(id, req).await?;
    publish_update(&state, id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /v1/trips/{id}/attractions/{child_id}
pub async fn remove_attraction(
    State(state): State<AppState>,
    WithRejection(Path((id, child_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
) -> AppResult<StatusCode> {
    state.planner.remove_attraction(id, child_id).await?;
    publish_update(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
