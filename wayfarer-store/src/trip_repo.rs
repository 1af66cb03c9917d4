use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use wayfarer_core::{CoreError, CoreResult};
use wayfarer_shared::Masked;
use wayfarer_trip::{
    NewBooking, NewTripAccommodation, NewTripAttraction, NewTripTransportation, NewUser, Trip,
    TripAccommodation, TripAttraction, TripBundle, TripDetails, TripPatch, TripRepository,
    TripStatus, TripTransportation, User,
};

use crate::memory::Table;

#[derive(Default)]
struct TripTables {
    users: Table<User>,
    trips: Table<Trip>,
    transportation: Table<TripTransportation>,
    accommodations: Table<TripAccommodation>,
    attractions: Table<TripAttraction>,
}

impl TripTables {
    fn require_trip(&self, id: i64) -> CoreResult<()> {
        if !self.trips.contains(id) {
            return Err(CoreError::not_found("trip", id));
        }
        Ok(())
    }

    fn require_user(&self, id: i64) -> CoreResult<()> {
        if !self.users.contains(id) {
            return Err(CoreError::not_found("user", id));
        }
        Ok(())
    }

    fn check_direction_free(&self, trip_id: i64, selection: &NewTripTransportation) -> CoreResult<()> {
        if self
            .transportation
            .values()
            .any(|row| row.trip_id == trip_id && row.direction == selection.direction)
        {
            return Err(CoreError::conflict(format!(
                "trip {} already has {:?} transportation",
                trip_id, selection.direction
            )));
        }
        Ok(())
    }

    fn check_slot_free(&self, trip_id: i64, selection: &NewTripAttraction) -> CoreResult<()> {
        if self.attractions.values().any(|row| {
            row.trip_id == trip_id && row.day == selection.day && row.time_slot == selection.time_slot
        }) {
            return Err(CoreError::conflict(format!(
                "trip {} already has an attraction on {} {:?}",
                trip_id, selection.day, selection.time_slot
            )));
        }
        Ok(())
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.values().find(|u| u.email.expose() == email).cloned()
    }

    fn insert_user(&mut self, user: NewUser) -> CoreResult<User> {
        let email = user.normalized_email();
        if self.find_user_by_email(&email).is_some() {
            return Err(CoreError::conflict("a user with this email already exists"));
        }

        Ok(self.users.insert_with(|id| User {
            id,
            name: user.name.trim().to_string(),
            email: Masked::new(email),
            created_at: Utc::now(),
        }))
    }

    fn insert_trip(&mut self, details: TripDetails) -> CoreResult<Trip> {
        if let Some(user_id) = details.user_id {
            self.require_user(user_id)?;
        }
        Ok(self.trips.insert_with(|id| Trip::new(id, details)))
    }

    fn insert_transportation(&mut self, trip_id: i64, selection: NewTripTransportation) -> TripTransportation {
        self.transportation.insert_with(|id| TripTransportation {
            id,
            trip_id,
            transportation_option_id: selection.transportation_option_id,
            direction: selection.direction,
        })
    }

    fn insert_accommodation(&mut self, trip_id: i64, selection: NewTripAccommodation) -> TripAccommodation {
        self.accommodations.insert_with(|id| TripAccommodation {
            id,
            trip_id,
            accommodation_id: selection.accommodation_id,
            check_in: selection.check_in,
            check_out: selection.check_out,
            rooms: selection.rooms,
        })
    }

    fn insert_attraction(&mut self, trip_id: i64, selection: NewTripAttraction) -> TripAttraction {
        self.attractions.insert_with(|id| TripAttraction {
            id,
            trip_id,
            attraction_id: selection.attraction_id,
            day: selection.day,
            time_slot: selection.time_slot,
        })
    }
}

/// Users, trips and trip children behind a single lock, so multi-row writes are atomic.
#[derive(Default)]
pub struct MemoryTripRepository {
    tables: RwLock<TripTables>,
}

impl MemoryTripRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripRepository for MemoryTripRepository {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        self.tables.write().await.insert_user(user)
    }

    async fn get_user(&self, id: i64) -> CoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.read().await;
        let user = tables.find_user_by_email(&email);
        Ok(user)
    }

    async fn create_trip(&self, details: TripDetails) -> CoreResult<Trip> {
        self.tables.write().await.insert_trip(details)
    }

    async fn get_trip(&self, id: i64) -> CoreResult<Option<Trip>> {
        Ok(self.tables.read().await.trips.get(id).cloned())
    }

    async fn list_trips(&self, user_id: Option<i64>) -> CoreResult<Vec<Trip>> {
        let tables = self.tables.read().await;
        Ok(tables
            .trips
            .cloned_where(|trip| user_id.map_or(true, |id| trip.user_id == Some(id))))
    }

    async fn update_trip(&self, id: i64, patch: TripPatch) -> CoreResult<Trip> {
        let mut tables = self.tables.write().await;
        let trip = tables
            .trips
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("trip", id))?;
        trip.apply(&patch);
        Ok(trip.clone())
    }

    async fn confirm_trip(&self, id: i64, expected_total_cents: i64) -> CoreResult<Trip> {
        let mut tables = self.tables.write().await;
        let trip = tables
            .trips
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("trip", id))?;
        if trip.status != TripStatus::Draft {
            return Err(CoreError::conflict(format!(
                "trip {} is {} and cannot be confirmed",
                id,
                trip.status.as_str()
            )));
        }
        if trip.total_price_cents != expected_total_cents {
            return Err(CoreError::conflict(format!(
                "trip {} now costs {}, not {}",
                id, trip.total_price_cents, expected_total_cents
            )));
        }

        trip.apply(&TripPatch {
            status: Some(TripStatus::Confirmed),
            ..Default::default()
        });
        Ok(trip.clone())
    }

    async fn add_transportation(
        &self,
        trip_id: i64,
        selection: NewTripTransportation,
    ) -> CoreResult<TripTransportation> {
        let mut tables = self.tables.write().await;
        tables.require_trip(trip_id)?;
        tables.check_direction_free(trip_id, &selection)?;
        Ok(tables.insert_transportation(trip_id, selection))
    }

    async fn list_transportation(&self, trip_id: i64) -> CoreResult<Vec<TripTransportation>> {
        let tables = self.tables.read().await;
        tables.require_trip(trip_id)?;
        Ok(tables.transportation.cloned_where(|row| row.trip_id == trip_id))
    }

    async fn update_transportation(
        &self,
        trip_id: i64,
        child_id: i64,
        transportation_option_id: i64,
    ) -> CoreResult<TripTransportation> {
        let mut tables = self.tables.write().await;
        tables.require_trip(trip_id)?;
        match tables.transportation.get_mut(child_id) {
            Some(row) if row.trip_id == trip_id => {
                row.transportation_option_id = transportation_option_id;
                Ok(row.clone())
            }
            _ => Err(CoreError::not_found("trip transportation", child_id)),
        }
    }

    async fn add_accommodation(
        &self,
        trip_id: i64,
        selection: NewTripAccommodation,
    ) -> CoreResult<TripAccommodation> {
        let mut tables = self.tables.write().await;
        tables.require_trip(trip_id)?;
        Ok(tables.insert_accommodation(trip_id, selection))
    }

    async fn list_accommodations(&self, trip_id: i64) -> CoreResult<Vec<TripAccommodation>> {
        let tables = self.tables.read().await;
        tables.require_trip(trip_id)?;
        Ok(tables.accommodations.cloned_where(|row| row.trip_id == trip_id))
    }

    async fn remove_accommodation(&self, trip_id: i64, child_id: i64) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_trip(trip_id)?;
        if !tables.accommodations.get(child_id).is_some_and(|row| row.trip_id == trip_id) {
            return Err(CoreError::not_found("trip accommodation", child_id));
        }
        tables.accommodations.remove(child_id);
        Ok(())
    }

    async fn add_attraction(&self, trip_id: i64, selection: NewTripAttraction) -> CoreResult<TripAttraction> {
        let mut tables = self.tables.write().await;
        tables.require_trip(trip_id)?;
        tables.check_slot_free(trip_id, &selection)?;
        Ok(tables.insert_attraction(trip_id, selection))
    }

    async fn list_attractions(&self, trip_id: i64) -> CoreResult<Vec<TripAttraction>> {
        let tables = self.tables.read().await;
        tables.require_trip(trip_id)?;
        let mut rows = tables.attractions.cloned_where(|row| row.trip_id == trip_id);
        rows.sort_by_key(|row| (row.day, row.time_slot, row.id));
        Ok(rows)
    }

    async fn remove_attraction(&self, trip_id: i64, child_id: i64) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_trip(trip_id)?;
        if !tables.attractions.get(child_id).is_some_and(|row| row.trip_id == trip_id) {
            return Err(CoreError::not_found("trip attraction", child_id));
        }
        tables.attractions.remove(child_id);
        Ok(())
    }

    async fn create_booking(&self, booking: NewBooking) -> CoreResult<TripBundle> {
        let mut tables = self.tables.write().await;
        let mut details = booking.details;

        // Everything is checked before the first insert
        if let Some(user_id) = details.user_id {
            tables.require_user(user_id)?;
        }
        let mut directions = HashSet::new();
        if !booking.transportation.iter().all(|s| directions.insert(s.direction)) {
            return Err(CoreError::conflict("a booking may hold one transportation per direction"));
        }
        let mut slots = HashSet::new();
        if !booking.attractions.iter().all(|s| slots.insert((s.day, s.time_slot))) {
            return Err(CoreError::conflict("a booking may hold one attraction per day and time slot"));
        }

        if details.user_id.is_none() {
            if let Some(contact) = booking.contact {
                contact.validate()?;
                let user = match tables.find_user_by_email(&contact.normalized_email()) {
                    Some(user) => user,
                    None => tables.insert_user(contact)?,
                };
                details.user_id = Some(user.id);
            }
        }

        let mut trip = tables.insert_trip(details)?;
        let patch = TripPatch {
            status: Some(booking.status),
            total_price_cents: Some(booking.total_price_cents),
            ..Default::default()
        };
        if let Some(stored) = tables.trips.get_mut(trip.id) {
            stored.apply(&patch);
            trip = stored.clone();
        }

        let transportation = booking
            .transportation
            .into_iter()
            .map(|s| tables.insert_transportation(trip.id, s))
            .collect();
        let accommodations = booking
            .accommodations
            .into_iter()
            .map(|s| tables.insert_accommodation(trip.id, s))
            .collect();
        let attractions = booking
            .attractions
            .into_iter()
            .map(|s| tables.insert_attraction(trip.id, s))
            .collect();

        Ok(TripBundle {
            trip,
            transportation,
            accommodations,
            attractions,
        })
    }
}
