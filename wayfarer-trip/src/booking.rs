use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wayfarer_core::payment::PaymentCard;

use crate::models::{
    NewTripAccommodation, NewTripAttraction, NewTripTransportation, NewUser, TripDetails,
    TripStatus,
};

/// Lodging selection as the client sends it. Without `rooms` the fewest rooms that fit the party are booked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccommodationRequest {
    pub accommodation_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub rooms: Option<u32>,
}

/// The finished wizard aggregate, posted at the payment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSubmission {
    pub trip: TripDetails,
    /// Traveler contact collected at checkout; used when `trip.user_id` is unset
    #[serde(default)]
    pub contact: Option<NewUser>,
    pub transportation: Vec<NewTripTransportation>,
    pub accommodations: Vec<AccommodationRequest>,
    #[serde(default)]
    pub attractions: Vec<NewTripAttraction>,
    pub payment: PaymentCard,
    /// Total the client showed the traveler; must match the server price
    pub quoted_total_cents: i64,
}

/// A fully validated booking ready for the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub details: TripDetails,
    pub status: TripStatus,
    pub total_price_cents: i64,
    /// Found or registered by email when `details.user_id` is unset
    pub contact: Option<NewUser>,
    pub transportation: Vec<NewTripTransportation>,
    pub accommodations: Vec<NewTripAccommodation>,
    pub attractions: Vec<NewTripAttraction>,
}
