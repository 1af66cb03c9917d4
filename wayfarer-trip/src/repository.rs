use async_trait::async_trait;
use wayfarer_core::{CoreError, CoreResult};

use crate::booking::NewBooking;
use crate::models::{
    NewTripAccommodation, NewTripAttraction, NewTripTransportation, NewUser, Trip,
    TripAccommodation, TripAttraction, TripBundle, TripDetails, TripPatch, TripTransportation,
    User,
};

/// Storage for users, trips and trip child rows.
///
/// Child operations answer [`CoreError::NotFound`] when the trip is unknown or
/// the child row belongs to a different trip. The store also enforces one
/// transportation row per direction and one attraction per day/time slot,
/// answering [`CoreError::Conflict`].
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Fails with a conflict when the email is already registered.
    async fn create_user(&self, user: NewUser) -> CoreResult<User>;

    async fn get_user(&self, id: i64) -> CoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn create_trip(&self, details: TripDetails) -> CoreResult<Trip>;

    async fn get_trip(&self, id: i64) -> CoreResult<Option<Trip>>;

    async fn list_trips(&self, user_id: Option<i64>) -> CoreResult<Vec<Trip>>;

    async fn update_trip(&self, id: i64, patch: TripPatch) -> CoreResult<Trip>;

    /// Move a draft trip to `CONFIRMED`, provided its stored total is still `expected_total_cents`.
    /// Any other status or a changed total is a conflict.
    async fn confirm_trip(&self, id: i64, expected_total_cents: i64) -> CoreResult<Trip>;

    async fn add_transportation(
        &self,
        trip_id: i64,
        selection: NewTripTransportation,
    ) -> CoreResult<TripTransportation>;

    async fn list_transportation(&self, trip_id: i64) -> CoreResult<Vec<TripTransportation>>;

    async fn update_transportation(
        &self,
        trip_id: i64,
        child_id: i64,
        transportation_option_id: i64,
    ) -> CoreResult<TripTransportation>;

    async fn add_accommodation(
        &self,
        trip_id: i64,
        selection: NewTripAccommodation,
    ) -> CoreResult<TripAccommodation>;

    async fn list_accommodations(&self, trip_id: i64) -> CoreResult<Vec<TripAccommodation>>;

    async fn remove_accommodation(&self, trip_id: i64, child_id: i64) -> CoreResult<()>;

    async fn add_attraction(&self, trip_id: i64, selection: NewTripAttraction) -> CoreResult<TripAttraction>;

    async fn list_attractions(&self, trip_id: i64) -> CoreResult<Vec<TripAttraction>>;

    async fn remove_attraction(&self, trip_id: i64, child_id: i64) -> CoreResult<()>;

    /// Insert a trip with all of its children at once, attaching the contact's user when
    /// the trip names none. Nothing is written if any part fails.
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<TripBundle>;

    async fn require_trip(&self, id: i64) -> CoreResult<Trip> {
        self.get_trip(id)
            .await?
            .ok_or_else(|| CoreError::not_found("trip", id))
    }

    async fn require_user(&self, id: i64) -> CoreResult<User> {
        self.get_user(id)
            .await?
            .ok_or_else(|| CoreError::not_found("user", id))
    }

    async fn load_bundle(&self, trip_id: i64) -> CoreResult<TripBundle> {
        let trip = self.require_trip(trip_id).await?;
        Ok(TripBundle {
            trip,
            transportation: self.list_transportation(trip_id).await?,
            accommodations: self.list_accommodations(trip_id).await?,
            attractions: self.list_attractions(trip_id).await?,
        })
    }
}
