use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wayfarer_catalog::{Accommodation, CatalogRepository, LineTotals, PriceBreakdown, PricingEngine};
use wayfarer_core::payment::{PaymentAuthorization, PaymentCard};
use wayfarer_core::{CoreError, CoreResult, DateRange};

use crate::booking::{AccommodationRequest, BookingSubmission, NewBooking};
use crate::checkout::{CheckoutError, PaymentOrchestrator};
use crate::lifecycle::{self, TripError};
use crate::locks::TripLocks;
use crate::models::{
    Direction, NewTripAccommodation, NewTripAttraction, NewTripTransportation, Trip,
    TripAccommodation, TripAttraction, TripBundle, TripDetails, TripPatch, TripStatus,
    TripTransportation, TripUpdate,
};
use crate::repository::TripRepository;
use crate::rules::{self, BookingRules};

/// A trip, its child rows and the derived price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSummary {
    pub trip: Trip,
    pub transportation: Vec<TripTransportation>,
    pub accommodations: Vec<TripAccommodation>,
    pub attractions: Vec<TripAttraction>,
    pub price: PriceBreakdown,
}

impl TripSummary {
    fn new(bundle: TripBundle, price: PriceBreakdown) -> Self {
        Self {
            trip: bundle.trip,
            transportation: bundle.transportation,
            accommodations: bundle.accommodations,
            attractions: bundle.attractions,
            price,
        }
    }
}

/// Validates trip changes against the catalog and keeps every trip's total in step with its selections.
///
/// Every change to an existing trip runs under that trip's lock, from the
/// editable check through the write to the re-priced total.
#[derive(Clone)]
pub struct TripPlanner {
    catalog: Arc<dyn CatalogRepository>,
    trips: Arc<dyn TripRepository>,
    pricing: PricingEngine,
    rules: BookingRules,
    locks: Arc<TripLocks>,
}

impl TripPlanner {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        trips: Arc<dyn TripRepository>,
        pricing: PricingEngine,
        rules: BookingRules,
    ) -> Self {
        Self {
            catalog,
            trips,
            pricing,
            rules,
            locks: Arc::new(TripLocks::new()),
        }
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogRepository> {
        &self.catalog
    }

    pub fn trips(&self) -> &Arc<dyn TripRepository> {
        &self.trips
    }

    // ========================================================================
    // Trips
    // ========================================================================

    async fn check_trip_details(&self, details: &TripDetails) -> CoreResult<DateRange> {
        let range = self.rules.check_details(details)?;
        self.catalog.require_location(details.origin_location_id).await?;
        self.catalog.require_location(details.destination_location_id).await?;
        if let Some(user_id) = details.user_id {
            self.trips.require_user(user_id).await?;
        }
        Ok(range)
    }

    pub async fn create_trip(&self, details: TripDetails) -> CoreResult<Trip> {
        self.check_trip_details(&details).await?;
        let trip = self.trips.create_trip(details).await?;
        info!(trip_id = trip.id, "Trip created");
        Ok(trip)
    }

    /// Apply a client PATCH. Confirmation only happens through checkout.
    pub async fn update_trip(&self, id: i64, update: TripUpdate) -> CoreResult<Trip> {
        let _guard = self.locks.acquire(id).await;
        let mut bundle = self.trips.load_bundle(id).await?;
        let mut patch = TripPatch::default();

        if let Some(party_size) = update.party_size {
            lifecycle::ensure_editable(&bundle.trip)?;
            let mut details = bundle.trip.details();
            details.party_size = party_size;
            self.rules.check_details(&details)?;

            // Re-price with the new party; fails if booked rooms can no longer sleep everyone
            bundle.trip.party_size = party_size;
            let price = self.price_bundle(&bundle).await?;
            patch.party_size = Some(party_size);
            patch.total_price_cents = Some(price.total_cents);
        }

        if let Some(status) = update.status {
            if status != bundle.trip.status {
                if status == TripStatus::Confirmed {
                    return Err(CoreError::conflict("trips are confirmed through checkout"));
                }
                lifecycle::ensure_transition(&bundle.trip, status)?;
                patch.status = Some(status);
            }
        }

        if patch == TripPatch::default() {
            return Ok(bundle.trip);
        }

        let trip = self.trips.update_trip(id, patch).await?;
        info!(trip_id = id, status = trip.status.as_str(), "Trip updated");
        Ok(trip)
    }

    pub async fn cancel_trip(&self, id: i64) -> CoreResult<Trip> {
        let _guard = self.locks.acquire(id).await;
        let trip = self.trips.require_trip(id).await?;
        lifecycle::ensure_transition(&trip, TripStatus::Cancelled)?;

        let trip = self
            .trips
            .update_trip(
                id,
                TripPatch {
                    status: Some(TripStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;
        info!(trip_id = id, "Trip cancelled");
        Ok(trip)
    }

    async fn editable_trip(&self, id: i64) -> CoreResult<Trip> {
        let trip = self.trips.require_trip(id).await?;
        lifecycle::ensure_editable(&trip)?;
        Ok(trip)
    }

    // ========================================================================
    // Trip children
    // ========================================================================

    pub async fn add_transportation(
        &self,
        trip_id: i64,
        selection: NewTripTransportation,
    ) -> CoreResult<TripTransportation> {
        let _guard = self.locks.acquire(trip_id).await;
        let trip = self.editable_trip(trip_id).await?;
        let option = self
            .catalog
            .require_transportation_option(selection.transportation_option_id)
            .await?;
        rules::check_transportation(&trip.details(), &option, selection.direction)?;

        let row = self.trips.add_transportation(trip_id, selection).await?;
        self.refresh_total(trip_id).await?;
        Ok(row)
    }

    /// Swap the option of an existing transportation row. The direction stays fixed.
    pub async fn update_transportation(
        &self,
        trip_id: i64,
        child_id: i64,
        transportation_option_id: i64,
    ) -> CoreResult<TripTransportation> {
        let _guard = self.locks.acquire(trip_id).await;
        let trip = self.editable_trip(trip_id).await?;
        let current = self
            .trips
            .list_transportation(trip_id)
            .await?
            .into_iter()
            .find(|row| row.id == child_id)
            .ok_or_else(|| CoreError::not_found("trip transportation", child_id))?;

        let option = self
            .catalog
            .require_transportation_option(transportation_option_id)
            .await?;
        rules::check_transportation(&trip.details(), &option, current.direction)?;

        let row = self
            .trips
            .update_transportation(trip_id, child_id, transportation_option_id)
            .await?;
        self.refresh_total(trip_id).await?;
        Ok(row)
    }

    pub async fn add_accommodation(
        &self,
        trip_id: i64,
        request: AccommodationRequest,
    ) -> CoreResult<TripAccommodation> {
        let _guard = self.locks.acquire(trip_id).await;
        let trip = self.editable_trip(trip_id).await?;
        let accommodation = self.catalog.require_accommodation(request.accommodation_id).await?;
        let selection = self.resolve_accommodation(&trip.details(), &accommodation, &request)?;

        let row = self.trips.add_accommodation(trip_id, selection).await?;
        self.refresh_total(trip_id).await?;
        Ok(row)
    }

    pub async fn remove_accommodation(&self, trip_id: i64, child_id: i64) -> CoreResult<()> {
        let _guard = self.locks.acquire(trip_id).await;
        self.editable_trip(trip_id).await?;
        self.trips.remove_accommodation(trip_id, child_id).await?;
        self.refresh_total(trip_id).await?;
        Ok(())
    }

    pub async fn add_attraction(
        &self,
        trip_id: i64,
        selection: NewTripAttraction,
    ) -> CoreResult<TripAttraction> {
        let _guard = self.locks.acquire(trip_id).await;
        let trip = self.editable_trip(trip_id).await?;
        let attraction = self.catalog.require_attraction(selection.attraction_id).await?;
        rules::check_attraction(&trip.details(), &attraction, selection.day)?;

        let row = self.trips.add_attraction(trip_id, selection).await?;
        self.refresh_total(trip_id).await?;
        Ok(row)
    }

    pub async fn remove_attraction(&self, trip_id: i64, child_id: i64) -> CoreResult<()> {
        let _guard = self.locks.acquire(trip_id).await;
        self.editable_trip(trip_id).await?;
        self.trips.remove_attraction(trip_id, child_id).await?;
        self.refresh_total(trip_id).await?;
        Ok(())
    }

    fn resolve_accommodation(
        &self,
        details: &TripDetails,
        accommodation: &Accommodation,
        request: &AccommodationRequest,
    ) -> CoreResult<NewTripAccommodation> {
        let stay = DateRange::new(request.check_in, request.check_out)?;
        rules::check_accommodation(details, accommodation, &stay)?;

        let rooms = request
            .rooms
            .unwrap_or_else(|| accommodation.rooms_needed(details.party_size));
        self.pricing
            .accommodation_line(accommodation, &stay, rooms, details.party_size)?;

        Ok(NewTripAccommodation {
            accommodation_id: accommodation.id,
            check_in: request.check_in,
            check_out: request.check_out,
            rooms,
        })
    }

    // ========================================================================
    // Pricing
    // ========================================================================

    /// Price every child row of a bundle against the catalog.
    pub async fn price_bundle(&self, bundle: &TripBundle) -> CoreResult<PriceBreakdown> {
        let party_size = bundle.trip.party_size;
        let mut lines = LineTotals::default();

        for row in &bundle.transportation {
            let option = self
                .catalog
                .require_transportation_option(row.transportation_option_id)
                .await?;
            lines.transportation_cents += self.pricing.transportation_line(&option, party_size)?;
        }

        for row in &bundle.accommodations {
            let accommodation = self.catalog.require_accommodation(row.accommodation_id).await?;
            let stay = DateRange::new(row.check_in, row.check_out)?;
            lines.accommodation_cents +=
                self.pricing
                    .accommodation_line(&accommodation, &stay, row.rooms, party_size)?;
        }

        for row in &bundle.attractions {
            let attraction = self.catalog.require_attraction(row.attraction_id).await?;
            lines.attractions_cents += self.pricing.attraction_line(&attraction, party_size)?;
        }

        Ok(self.pricing.quote(&lines))
    }

    /// Recompute and store a trip's total from its current selections. Callers hold the trip lock.
    async fn refresh_total(&self, trip_id: i64) -> CoreResult<Trip> {
        let bundle = self.trips.load_bundle(trip_id).await?;
        let price = self.price_bundle(&bundle).await?;
        if price.total_cents == bundle.trip.total_price_cents {
            return Ok(bundle.trip);
        }

        self.trips
            .update_trip(
                trip_id,
                TripPatch {
                    total_price_cents: Some(price.total_cents),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn summary(&self, trip_id: i64) -> CoreResult<TripSummary> {
        let bundle = self.trips.load_bundle(trip_id).await?;
        let price = self.price_bundle(&bundle).await?;
        Ok(TripSummary::new(bundle, price))
    }

    // ========================================================================
    // Checkout
    // ========================================================================

    /// Check that a draft trip can be paid for and return its current price.
    pub async fn prepare_checkout(&self, trip_id: i64) -> CoreResult<TripSummary> {
        let summary = self.summary(trip_id).await?;
        lifecycle::ensure_transition(&summary.trip, TripStatus::Confirmed)?;

        if !summary
            .transportation
            .iter()
            .any(|row| row.direction == Direction::Outbound)
        {
            return Err(TripError::Incomplete {
                id: trip_id,
                reason: "no outbound transportation selected".to_string(),
            }
            .into());
        }
        if summary.accommodations.is_empty() {
            return Err(TripError::Incomplete {
                id: trip_id,
                reason: "no accommodation selected".to_string(),
            }
            .into());
        }

        Ok(summary)
    }

    /// Confirm a draft trip that still costs `total_price_cents`.
    pub async fn confirm(&self, trip_id: i64, total_price_cents: i64) -> CoreResult<Trip> {
        let _guard = self.locks.acquire(trip_id).await;
        self.confirm_locked(trip_id, total_price_cents).await
    }

    async fn confirm_locked(&self, trip_id: i64, total_price_cents: i64) -> CoreResult<Trip> {
        let trip = self.trips.confirm_trip(trip_id, total_price_cents).await?;
        info!(trip_id, total_price_cents, "Trip confirmed");
        Ok(trip)
    }

    /// Charge the current total and confirm the trip.
    ///
    /// The trip lock is held from the completeness check to the confirmation,
    /// so a second checkout waits and then finds the trip no longer a draft.
    /// If the trip cannot be confirmed after payment, the authorization is voided.
    pub async fn checkout(
        &self,
        trip_id: i64,
        payments: &PaymentOrchestrator,
        card: &PaymentCard,
        today: NaiveDate,
    ) -> Result<(Trip, PaymentAuthorization), CheckoutError> {
        let _guard = self.locks.acquire(trip_id).await;
        let summary = self.prepare_checkout(trip_id).await?;
        let amount_cents = summary.price.total_cents;

        let authorization = payments
            .authorize(card, amount_cents, &summary.price.currency, today)
            .await
            .inspect_err(|e| warn!(trip_id, "Checkout payment failed: {}", e))?;

        match self.confirm_locked(trip_id, amount_cents).await {
            Ok(trip) => Ok((trip, authorization)),
            Err(err) => {
                warn!(trip_id, "Trip not confirmed after payment: {}", err);
                payments.void(&authorization).await;
                Err(err.into())
            }
        }
    }

    /// Validate a wizard submission against the catalog and price it. Nothing is written.
    pub async fn plan_booking(
        &self,
        submission: &BookingSubmission,
    ) -> CoreResult<(NewBooking, PriceBreakdown)> {
        let details = submission.trip.clone();
        self.check_trip_details(&details).await?;

        if let Some(contact) = &submission.contact {
            contact.validate()?;
        }

        let mut directions = HashSet::new();
        for selection in &submission.transportation {
            if !directions.insert(selection.direction) {
                return Err(CoreError::validation(format!(
                    "more than one {:?} transportation selected",
                    selection.direction
                )));
            }
        }
        if !directions.contains(&Direction::Outbound) {
            return Err(CoreError::validation("an outbound transportation is required"));
        }
        if submission.accommodations.is_empty() {
            return Err(CoreError::validation("at least one accommodation is required"));
        }

        let mut slots = HashSet::new();
        for selection in &submission.attractions {
            if !slots.insert((selection.day, selection.time_slot)) {
                return Err(CoreError::validation(format!(
                    "two attractions booked for {} {:?}",
                    selection.day, selection.time_slot
                )));
            }
        }

        let party_size = details.party_size;
        let mut lines = LineTotals::default();

        for selection in &submission.transportation {
            let option = self
                .catalog
                .require_transportation_option(selection.transportation_option_id)
                .await?;
            rules::check_transportation(&details, &option, selection.direction)?;
            lines.transportation_cents += self.pricing.transportation_line(&option, party_size)?;
        }

        let mut accommodations = Vec::with_capacity(submission.accommodations.len());
        for request in &submission.accommodations {
            let accommodation = self.catalog.require_accommodation(request.accommodation_id).await?;
            let selection = self.resolve_accommodation(&details, &accommodation, request)?;
            let stay = DateRange::new(selection.check_in, selection.check_out)?;
            lines.accommodation_cents +=
                self.pricing
                    .accommodation_line(&accommodation, &stay, selection.rooms, party_size)?;
            accommodations.push(selection);
        }

        for selection in &submission.attractions {
            let attraction = self.catalog.require_attraction(selection.attraction_id).await?;
            rules::check_attraction(&details, &attraction, selection.day)?;
            lines.attractions_cents += self.pricing.attraction_line(&attraction, party_size)?;
        }

        let price = self.pricing.quote(&lines);
        let contact = match details.user_id {
            Some(_) => None,
            None => submission.contact.clone(),
        };
        let booking = NewBooking {
            details,
            status: TripStatus::Confirmed,
            total_price_cents: price.total_cents,
            contact,
            transportation: submission.transportation.clone(),
            accommodations,
            attractions: submission.attractions.clone(),
        };
        Ok((booking, price))
    }

    pub async fn commit_booking(&self, booking: NewBooking) -> CoreResult<TripSummary> {
        let bundle = self.trips.create_booking(booking).await?;
        let price = self.price_bundle(&bundle).await?;
        info!(trip_id = bundle.trip.id, total_cents = price.total_cents, "Booking committed");
        Ok(TripSummary::new(bundle, price))
    }

    /// Finish a wizard submission: price it, reject a stale quote, take payment,
    /// then store the confirmed trip. A failed write voids the authorization.
    pub async fn book(
        &self,
        submission: &BookingSubmission,
        payments: &PaymentOrchestrator,
        today: NaiveDate,
    ) -> Result<(TripSummary, PaymentAuthorization), CheckoutError> {
        let (booking, price) = self.plan_booking(submission).await?;

        // The traveler must have seen the price we are about to charge
        if submission.quoted_total_cents != price.total_cents {
            return Err(CoreError::conflict(format!(
                "quoted total {} does not match current price {}",
                submission.quoted_total_cents, price.total_cents
            ))
            .into());
        }

        let authorization = payments
            .authorize(&submission.payment, price.total_cents, &price.currency, today)
            .await
            .inspect_err(|e| warn!("Booking payment failed: {}", e))?;

        match self.commit_booking(booking).await {
            Ok(summary) => Ok((summary, authorization)),
            Err(err) => {
                warn!("Booking not stored after payment: {}", err);
                payments.void(&authorization).await;
                Err(err.into())
            }
        }
    }
}
