use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use wayfarer_core::payment::PaymentCard;
use wayfarer_shared::models::events::TripEventKind;
use wayfarer_trip::{CheckoutReceipt, Trip, TripDetails, TripStatus, TripSummary, TripUpdate};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TripQuery {
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment: PaymentCard,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips", post(create_trip).get(list_trips))
        .route("/v1/trips/{id}", get(get_trip).patch(update_trip))
        .route("/v1/trips/{id}/summary", get(trip_summary))
        .route("/v1/trips/{id}/checkout", post(checkout))
        .route("/v1/trips/{id}/cancel", post(cancel_trip))
        .route("/v1/trips/{id}/events", get(trip_events))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/trips
/// Start a draft trip from the destination step
pub async fn create_trip(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<TripDetails>, AppError>,
) -> AppResult<(StatusCode, Json<Trip>)> {
    let trip = state.planner.create_trip(req).await?;
    state.events.trip_changed(&trip, TripEventKind::TripCreated);
    Ok((StatusCode::CREATED, Json(trip)))
}

/// GET /v1/trips?user_id=
pub async fn list_trips(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<TripQuery>, AppError>,
) -> AppResult<Json<Vec<Trip>>> {
    Ok(Json(state.trips().list_trips(query.user_id).await?))
}

/// GET /v1/trips/{id}
pub async fn get_trip(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Trip>> {
    Ok(Json(state.trips().require_trip(id).await?))
}

/// PATCH /v1/trips/{id}
/// Change party size or status. The total is derived and cannot be patched
pub async fn update_trip(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<TripUpdate>, AppError>,
) -> AppResult<Json<Trip>> {
    let before = state.trips().require_trip(id).await?;
    let trip = state.planner.update_trip(id, req).await?;

    if trip.updated_at != before.updated_at {
        let kind = if trip.status == TripStatus::Cancelled {
            TripEventKind::TripCancelled
        } else {
            TripEventKind::TripUpdated
        };
        state.events.trip_changed(&trip, kind);
    }
    Ok(Json(trip))
}

/// GET /v1/trips/{id}/summary
/// Trip, selections and the price breakdown
pub async fn trip_summary(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<TripSummary>> {
    Ok(Json(state.planner.summary(id).await?))
}

/// POST /v1/trips/{id}/checkout
/// Authorize payment for the current total and confirm the trip
pub async fn checkout(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<CheckoutRequest>, AppError>,
) -> AppResult<Json<CheckoutReceipt>> {
    let today = chrono::Utc::now().date_naive();
    let (trip, authorization) = state
        .planner
        .checkout(id, &state.payments, &req.payment, today)
        .await?;
    state.events.trip_changed(&trip, TripEventKind::TripConfirmed);

    Ok(Json(CheckoutReceipt::new(trip.id, trip.status, authorization)))
}

/// POST /v1/trips/{id}/cancel
pub async fn cancel_trip(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Trip>> {
    let trip = state.planner.cancel_trip(id).await?;
    state.events.trip_changed(&trip, TripEventKind::TripCancelled);
    Ok(Json(trip))
}

/// GET /v1/trips/{id}/events
/// Server-sent stream of this trip's lifecycle events
pub async fn trip_events(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    state.trips().require_trip(id).await?;

    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |result| async move {
        match result {
            Ok(event) if event.trip_id == id => Event::default()
                .event(event.kind.as_str())
                .json_data(&event)
                .ok()
                .map(Ok::<_, Infallible>),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(trip_id = id, "Event stream lagged: {}", err);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
