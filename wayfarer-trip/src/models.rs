use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use wayfarer_core::{CoreError, CoreResult, DateRange};
use wayfarer_shared::Masked;

/// Trip status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Draft,
    Confirmed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Draft => "DRAFT",
            TripStatus::Confirmed => "CONFIRMED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Outbound,
    Return,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Masked<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: Masked<String>,
}

impl NewUser {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name is required"));
        }
        let email = self.email.expose();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => Ok(()),
            _ => Err(CoreError::validation("email address is not valid")),
        }
    }

    /// Emails compare case-insensitively.
    pub fn normalized_email(&self) -> String {
        self.email.expose().trim().to_lowercase()
    }
}

/// What the traveler asks for at the first wizard step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripDetails {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub origin_location_id: i64,
    pub destination_location_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub party_size: u32,
}

impl TripDetails {
    pub fn range(&self) -> CoreResult<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// A user's booking aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub user_id: Option<i64>,
    pub origin_location_id: i64,
    pub destination_location_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub party_size: u32,
    pub status: TripStatus,
    pub total_price_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(id: i64, details: TripDetails) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: details.user_id,
            origin_location_id: details.origin_location_id,
            destination_location_id: details.destination_location_id,
            start_date: details.start_date,
            end_date: details.end_date,
            party_size: details.party_size,
            status: TripStatus::Draft,
            total_price_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn details(&self) -> TripDetails {
        TripDetails {
            user_id: self.user_id,
            origin_location_id: self.origin_location_id,
            destination_location_id: self.destination_location_id,
            start_date: self.start_date,
            end_date: self.end_date,
            party_size: self.party_size,
        }
    }

    /// Apply a store-level patch
    pub fn apply(&mut self, patch: &TripPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(party_size) = patch.party_size {
            self.party_size = party_size;
        }
        if let Some(total) = patch.total_price_cents {
            self.total_price_cents = total;
        }
        self.updated_at = Utc::now();
    }
}

/// Fields of a trip the store may change after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripPatch {
    pub status: Option<TripStatus>,
    pub party_size: Option<u32>,
    pub total_price_cents: Option<i64>,
}

/// Client-facing trip changes. The price is always derived and cannot be set directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TripUpdate {
    #[serde(default)]
    pub status: Option<TripStatus>,
    #[serde(default)]
    pub party_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripTransportation {
    pub id: i64,
    pub trip_id: i64,
    pub transportation_option_id: i64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTripTransportation {
    pub transportation_option_id: i64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripAccommodation {
    pub id: i64,
    pub trip_id: i64,
    pub accommodation_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTripAccommodation {
    pub accommodation_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripAttraction {
    pub id: i64,
    pub trip_id: i64,
    pub attraction_id: i64,
    pub day: NaiveDate,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTripAttraction {
    pub attraction_id: i64,
    pub day: NaiveDate,
    pub time_slot: TimeSlot,
}

/// A trip together with all of its child rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripBundle {
    pub trip: Trip,
    pub transportation: Vec<TripTransportation>,
    pub accommodations: Vec<TripAccommodation>,
    pub attractions: Vec<TripAttraction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> TripDetails {
        TripDetails {
            user_id: None,
            origin_location_id: 1,
            destination_location_id: 2,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            party_size: 2,
        }
    }

    #[test]
    fn test_new_trip_is_draft() {
        let trip = Trip::new(7, details());
        assert_eq!(trip.id, 7);
        assert_eq!(trip.status, TripStatus::Draft);
        assert_eq!(trip.total_price_cents, 0);
        assert_eq!(trip.details(), details());
    }

    #[test]
    fn test_apply_patch() {
        let mut trip = Trip::new(1, details());
        trip.apply(&TripPatch {
            total_price_cents: Some(4_200),
            ..Default::default()
        });
        assert_eq!(trip.total_price_cents, 4_200);
        assert_eq!(trip.status, TripStatus::Draft);
        assert_eq!(trip.party_size, 2);
    }

    #[test]
    fn test_user_validation() {
        let ok = NewUser { name: "Ada".to_string(), email: Masked::from("Ada@Example.com") };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.normalized_email(), "ada@example.com");

        let bad = NewUser { name: "Ada".to_string(), email: Masked::from("ada.example.com") };
        assert!(bad.validate().is_err());

        let nameless = NewUser { name: " ".to_string(), email: Masked::from("a@b.io") };
        assert!(nameless.validate().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&TripStatus::Confirmed).unwrap(), "\"CONFIRMED\"");
        let slot: TimeSlot = serde_json::from_str("\"AFTERNOON\"").unwrap();
        assert_eq!(slot, TimeSlot::Afternoon);
    }
}
