use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use wayfarer_catalog::{
    Accommodation, AccommodationType, Attraction, Location, RouteFilter, TransportationOption,
    TransportationType,
};
use wayfarer_core::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub origin_id: Option<i64>,
    pub destination_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location_id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/locations", get(list_locations))
        .route("/v1/locations/{id}", get(get_location))
        .route("/v1/locations/{id}/accommodations", get(location_accommodations))
        .route("/v1/locations/{id}/attractions", get(location_attractions))
        .route("/v1/transportation-types", get(list_transportation_types))
        .route("/v1/transportation-types/{id}", get(get_transportation_type))
        .route("/v1/transportation", get(list_transportation_options))
        .route("/v1/transportation/{id}", get(get_transportation_option))
        .route("/v1/accommodation-types", get(list_accommodation_types))
        .route("/v1/accommodation-types/{id}", get(get_accommodation_type))
        .route("/v1/accommodations", get(list_accommodations))
        .route("/v1/accommodations/{id}", get(get_accommodation))
        .route("/v1/attractions", get(list_attractions))
        .route("/v1/attractions/{id}", get(get_attraction))
}

// ============================================================================
// Locations
// ============================================================================

/// GET /v1/locations
pub async fn list_locations(State(state): State<AppState>) -> AppResult<Json<Vec<Location>>> {
    Ok(Json(state.catalog().list_locations().await?))
}

/// GET /v1/locations/{id}
pub async fn get_location(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Location>> {
    Ok(Json(state.catalog().require_location(id).await?))
}

/// GET /v1/locations/{id}/accommodations
pub async fn location_accommodations(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Vec<Accommodation>>> {
    state.catalog().require_location(id).await?;
    Ok(Json(state.catalog().list_accommodations(Some(id)).await?))
}

/// GET /v1/locations/{id}/attractions
pub async fn location_attractions(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Vec<Attraction>>> {
    state.catalog().require_location(id).await?;
    Ok(Json(state.catalog().list_attractions(Some(id)).await?))
}

// ============================================================================
// Transportation
// ============================================================================

/// GET /v1/transportation-types
pub async fn list_transportation_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TransportationType>>> {
    Ok(Json(state.catalog().list_transportation_types().await?))
}

/// GET /v1/transportation-types/{id}
pub async fn get_transportation_type(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<TransportationType>> {
    let kind = state
        .catalog()
        .get_transportation_type(id)
        .await?
        .ok_or_else(|| CoreError::not_found("transportation type", id))?;
    Ok(Json(kind))
}

/// GET /v1/transportation?origin_id=&destination_id=
/// Scheduled options, earliest departure first
pub async fn list_transportation_options(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<RouteQuery>, AppError>,
) -> AppResult<Json<Vec<TransportationOption>>> {
    let filter = RouteFilter {
        origin_id: query.origin_id,
        destination_id: query.destination_id,
    };
    Ok(Json(state.catalog().list_transportation_options(&filter).await?))
}

/// GET /v1/transportation/{id}
pub async fn get_transportation_option(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<TransportationOption>> {
    Ok(Json(state.catalog().require_transportation_option(id).await?))
}

// ============================================================================
// Lodging and attractions
// ============================================================================

/// GET /v1/accommodation-types
pub async fn list_accommodation_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AccommodationType>>> {
    Ok(Json(state.catalog().list_accommodation_types().await?))
}

/// GET /v1/accommodation-types/{id}
pub async fn get_accommodation_type(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<AccommodationType>> {
    let kind = state
        .catalog()
        .get_accommodation_type(id)
        .await?
        .ok_or_else(|| CoreError::not_found("accommodation type", id))?;
    Ok(Json(kind))
}

/// GET /v1/accommodations?location_id=
pub async fn list_accommodations(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<LocationQuery>, AppError>,
) -> AppResult<Json<Vec<Accommodation>>> {
    Ok(Json(state.catalog().list_accommodations(query.location_id).await?))
}

/// GET /v1/accommodations/{id}
pub async fn get_accommodation(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Accommodation>> {
    Ok(Json(state.catalog().require_accommodation(id).await?))
}

/// GET /v1/attractions?location_id=
pub async fn list_attractions(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<LocationQuery>, AppError>,
) -> AppResult<Json<Vec<Attraction>>> {
    Ok(Json(state.catalog().list_attractions(query.location_id).await?))
}

/// GET /v1/attractions/{id}
pub async fn get_attraction(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Attraction>> {
    Ok(Json(state.catalog().require_attraction(id).await?))
}
