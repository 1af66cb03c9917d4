use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripEventKind {
    TripCreated,
    TripUpdated,
    TripConfirmed,
    TripCancelled,
}

impl TripEventKind {
    /// Name used for the SSE `event:` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TripEventKind::TripCreated => "trip_created",
            TripEventKind::TripUpdated => "trip_updated",
            TripEventKind::TripConfirmed => "trip_confirmed",
            TripEventKind::TripCancelled => "trip_cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TripEvent {
    pub trip_id: i64,
    pub kind: TripEventKind,
    pub status: String,
    pub total_price_cents: i64,
    pub timestamp: i64,
}

impl TripEvent {
    pub fn new(trip_id: i64, kind: TripEventKind, status: impl Into<String>, total_price_cents: i64) -> Self {
        Self {
            trip_id,
            kind,
            status: status.into(),
            total_price_cents,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
