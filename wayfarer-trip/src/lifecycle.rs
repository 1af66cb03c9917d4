use wayfarer_core::CoreError;

use crate::models::{Trip, TripStatus};

impl TripStatus {
    /// Draft -> Confirmed -> Cancelled, or Draft -> Cancelled. Cancelled is terminal.
    pub fn can_transition_to(&self, next: TripStatus) -> bool {
        matches!(
            (self, next),
            (TripStatus::Draft, TripStatus::Confirmed)
                | (TripStatus::Draft, TripStatus::Cancelled)
                | (TripStatus::Confirmed, TripStatus::Cancelled)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Trip {id} is {status} and can no longer be changed")]
    NotEditable { id: i64, status: &'static str },

    #[error("Trip {id} is not ready for checkout: {reason}")]
    Incomplete { id: i64, reason: String },
}

impl From<TripError> for CoreError {
    fn from(err: TripError) -> Self {
        CoreError::Conflict(err.to_string())
    }
}

pub fn ensure_transition(trip: &Trip, next: TripStatus) -> Result<(), TripError> {
    if !trip.status.can_transition_to(next) {
        return Err(TripError::InvalidTransition {
            from: trip.status.as_str(),
            to: next.as_str(),
        });
    }
    Ok(())
}

/// Children and party size only change while the trip is a draft.
pub fn ensure_editable(trip: &Trip) -> Result<(), TripError> {
    if trip.status != TripStatus::Draft {
        return Err(TripError::NotEditable {
            id: trip.id,
            status: trip.status.as_str(),
        });
    }
    Ok(())
}
