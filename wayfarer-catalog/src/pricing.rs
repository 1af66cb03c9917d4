use serde::{Deserialize, Serialize};
use wayfarer_core::{CoreError, DateRange};

use crate::models::{Accommodation, Attraction, TransportationOption};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO currency code every `*_cents` amount is expressed in
    pub currency: String,

    /// Applied to the subtotal, e.g. 0.1 for 10%
    pub tax_rate: f64,

    /// Flat fee added to any non-empty trip
    pub booking_fee_cents: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            tax_rate: 0.10,
            booking_fee_cents: 1_500,
        }
    }
}

/// Running per-category totals before taxes and fees.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineTotals {
    pub transportation_cents: i64,
    pub accommodation_cents: i64,
    pub attractions_cents: i64,
}

impl LineTotals {
    pub fn subtotal(&self) -> i64 {
        self.transportation_cents + self.accommodation_cents + self.attractions_cents
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub currency: String,
    pub transportation_cents: i64,
    pub accommodation_cents: i64,
    pub attractions_cents: i64,
    pub subtotal_cents: i64,
    pub taxes_cents: i64,
    pub booking_fee_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid stay: {0}")]
    InvalidStay(String),

    #[error("{rooms} room(s) at {name} cannot sleep {party_size} guests")]
    InsufficientCapacity {
        name: String,
        rooms: u32,
        party_size: u32,
    },

    #[error("Party size must be at least 1")]
    EmptyParty,
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

/// Derives trip prices from catalog items.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Fare for every traveler in the party.
    pub fn transportation_line(
        &self,
        option: &TransportationOption,
        party_size: u32,
    ) -> Result<i64, CatalogError> {
        if party_size == 0 {
            return Err(CatalogError::EmptyParty);
        }
        Ok(option.price_cents * i64::from(party_size))
    }

    /// Nightly rate for every room and night of the stay.
    pub fn accommodation_line(
        &self,
        accommodation: &Accommodation,
        stay: &DateRange,
        rooms: u32,
        party_size: u32,
    ) -> Result<i64, CatalogError> {
        let nights = stay.nights();
        if nights < 1 {
            return Err(CatalogError::InvalidStay(format!(
                "check-out {} must be after check-in {}",
                stay.end, stay.start
            )));
        }
        if rooms == 0 {
            return Err(CatalogError::InvalidStay("at least one room is required".to_string()));
        }
        if u64::from(rooms) * u64::from(accommodation.max_guests_per_room) < u64::from(party_size) {
            return Err(CatalogError::InsufficientCapacity {
                name: accommodation.name.clone(),
                rooms,
                party_size,
            });
        }
        Ok(accommodation.nightly_rate_cents * nights * i64::from(rooms))
    }

    /// Ticket price for every traveler in the party.
    pub fn attraction_line(&self, attraction: &Attraction, party_size: u32) -> Result<i64, CatalogError> {
        if party_size == 0 {
            return Err(CatalogError::EmptyParty);
        }
        Ok(attraction.price_cents * i64::from(party_size))
    }

    pub fn taxes(&self, subtotal_cents: i64) -> i64 {
        // f64::round rounds half away from zero
        (subtotal_cents as f64 * self.config.tax_rate).round() as i64
    }

    pub fn quote(&self, lines: &LineTotals) -> PriceBreakdown {
        let subtotal_cents = lines.subtotal();
        let taxes_cents = self.taxes(subtotal_cents);
        let booking_fee_cents = if subtotal_cents > 0 {
            self.config.booking_fee_cents
        } else {
            0
        };

        PriceBreakdown {
            currency: self.config.currency.clone(),
            transportation_cents: lines.transportation_cents,
            accommodation_cents: lines.accommodation_cents,
            attractions_cents: lines.attractions_cents,
            subtotal_cents,
            taxes_cents,
            booking_fee_cents,
            total_cents: subtotal_cents + taxes_cents + booking_fee_cents,
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}
