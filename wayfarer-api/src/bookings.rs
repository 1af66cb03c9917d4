use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use wayfarer_shared::models::events::TripEventKind;
use wayfarer_trip::{BookingSubmission, CheckoutReceipt, TripSummary};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookingConfirmation {
    pub summary: TripSummary,
    pub payment: CheckoutReceipt,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking))
}

/// POST /v1/bookings
/// Finish the wizard: price the submission, take payment, then store the confirmed trip
pub async fn create_booking(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<BookingSubmission>, AppError>,
) -> AppResult<(StatusCode, Json<BookingConfirmation>)> {
    // Price check, payment and commit run together; a failed commit voids the payment
    let today = chrono::Utc::now().date_naive();
    let (summary, authorization) = state.planner.book(&req, &state.payments, today).await?;

    state
        .events
        .trip_changed(&summary.trip, TripEventKind::TripConfirmed);
    tracing::info!(
        trip_id = summary.trip.id,
        reference = %authorization.reference,
        "Booking confirmed"
    );

    let payment = CheckoutReceipt::new(summary.trip.id, summary.trip.status, authorization);
    Ok((StatusCode::CREATED, Json(BookingConfirmation { summary, payment })))
}
