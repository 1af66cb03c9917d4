use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub description: Option<String>,
}

/// Flight, train, bus, ferry, ...
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportationType {
    pub id: i64,
    pub name: String,
}

/// A scheduled connection between two locations. `price_cents` is per traveler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportationOption {
    pub id: i64,
    pub transportation_type_id: i64,
    pub origin_location_id: i64,
    pub destination_location_id: i64,
    pub carrier: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub price_cents: i64,
}

impl TransportationOption {
    pub fn connects(&self, origin_id: i64, destination_id: i64) -> bool {
        self.origin_location_id == origin_id && self.destination_location_id == destination_id
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.arrival_time - self.departure_time).num_minutes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccommodationType {
    pub id: i64,
    pub name: String,
}

/// Lodging at a location. `nightly_rate_cents` is per room per night.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accommodation {
    pub id: i64,
    pub accommodation_type_id: i64,
    pub location_id: i64,
    pub name: String,
    pub address: String,
    pub nightly_rate_cents: i64,
    pub max_guests_per_room: u32,
    pub rating: f32,
}

impl Accommodation {
    /// Fewest rooms that fit `party_size` guests.
    pub fn rooms_needed(&self, party_size: u32) -> u32 {
        if self.max_guests_per_room == 0 {
            return u32::MAX;
        }
        party_size.div_ceil(self.max_guests_per_room).max(1)
    }
}

/// `price_cents` is per person.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attraction {
    pub id: i64,
    pub location_id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: u32,
}

/// Filter for transportation option listings. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteFilter {
    pub origin_id: Option<i64>,
    pub destination_id: Option<i64>,
}

impl RouteFilter {
    pub fn between(origin_id: i64, destination_id: i64) -> Self {
        Self {
            origin_id: Some(origin_id),
            destination_id: Some(destination_id),
        }
    }

    pub fn matches(&self, option: &TransportationOption) -> bool {
        self.origin_id.map_or(true, |id| option.origin_location_id == id)
            && self.destination_id.map_or(true, |id| option.destination_location_id == id)
    }
}
