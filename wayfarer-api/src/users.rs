use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use wayfarer_trip::{NewUser, Trip, User};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(create_user))
        .route("/v1/users/{id}", get(get_user))
        .route("/v1/users/{id}/trips", get(user_trips))
}

/// POST /v1/users
/// Register a traveler; emails are unique regardless of case
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<NewUser>, AppError>,
) -> AppResult<(StatusCode, Json<User>)> {
    req.validate()?;
    let user = state.trips().create_user(req).await?;
    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<User>> {
    Ok(Json(state.trips().require_user(id).await?))
}

/// GET /v1/users/{id}/trips
pub async fn user_trips(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Vec<Trip>>> {
    state.trips().require_user(id).await?;
    Ok(Json(state.trips().list_trips(Some(id)).await?))
}
