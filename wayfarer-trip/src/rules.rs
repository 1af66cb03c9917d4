use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wayfarer_catalog::{Accommodation, Attraction, TransportationOption};
use wayfarer_core::{CoreError, CoreResult, DateRange};

use crate::models::{Direction, TripDetails};

/// Limits applied to every trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRules {
    pub max_party_size: u32,
    pub max_trip_nights: i64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            max_party_size: 10,
            max_trip_nights: 30,
        }
    }
}

impl BookingRules {
    /// Shape checks that need no catalog lookups. Returns the trip's date range.
    pub fn check_details(&self, details: &TripDetails) -> CoreResult<DateRange> {
        if details.origin_location_id == details.destination_location_id {
            return Err(CoreError::validation("origin and destination must differ"));
        }
        if details.party_size == 0 || details.party_size > self.max_party_size {
            return Err(CoreError::validation(format!(
                "party size must be between 1 and {}",
                self.max_party_size
            )));
        }
        let range = details.range()?;
        if range.nights() > self.max_trip_nights {
            return Err(CoreError::validation(format!(
                "trips are limited to {} nights",
                self.max_trip_nights
            )));
        }
        Ok(range)
    }
}

/// Outbound legs run origin -> destination, return legs the other way.
pub fn check_transportation(
    details: &TripDetails,
    option: &TransportationOption,
    direction: Direction,
) -> CoreResult<()> {
    let (from, to) = match direction {
        Direction::Outbound => (details.origin_location_id, details.destination_location_id),
        Direction::Return => (details.destination_location_id, details.origin_location_id),
    };
    if !option.connects(from, to) {
        return Err(CoreError::validation(format!(
            "transportation option {} does not run from location {} to location {}",
            option.id, from, to
        )));
    }
    Ok(())
}

pub fn check_accommodation(
    details: &TripDetails,
    accommodation: &Accommodation,
    stay: &DateRange,
) -> CoreResult<()> {
    if accommodation.location_id != details.destination_location_id {
        return Err(CoreError::validation(format!(
            "accommodation {} is not at the trip destination",
            accommodation.id
        )));
    }
    let trip_range = details.range()?;
    if !trip_range.contains_range(stay) {
        return Err(CoreError::validation(format!(
            "stay {} to {} falls outside the trip dates",
            stay.start, stay.end
        )));
    }
    Ok(())
}

pub fn check_attraction(details: &TripDetails, attraction: &Attraction, day: NaiveDate) -> CoreResult<()> {
    if attraction.location_id != details.destination_location_id {
        return Err(CoreError::validation(format!(
            "attraction {} is not at the trip destination",
            attraction.id
        )));
    }
    if !details.range()?.contains(day) {
        return Err(CoreError::validation(format!("{} falls outside the trip dates", day)));
    }
    Ok(())
}
