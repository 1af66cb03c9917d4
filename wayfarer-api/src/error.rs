use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wayfarer_core::payment::PaymentError;
use wayfarer_core::CoreError;
use wayfarer_trip::CheckoutError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    PaymentRequired(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", error_message);
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(_) => AppError::ValidationError(err.to_string()),
            CoreError::NotFound { .. } => AppError::NotFoundError(err.to_string()),
            CoreError::Conflict(_) => AppError::ConflictError(err.to_string()),
            CoreError::InternalError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidCard(_) => AppError::ValidationError(err.to_string()),
            PaymentError::Declined(_) => AppError::PaymentRequired(err.to_string()),
            PaymentError::Gateway(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Trip(err) => err.into(),
            CheckoutError::Payment(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}
