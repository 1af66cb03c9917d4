//! Client-side booking wizard.
//!
//! The wizard walks a traveler through five steps and keeps everything chosen so
//! far in one record. Each selection carries a snapshot of the catalog item it
//! refers to, so the running total is computed locally with the same
//! [`PricingEngine`] the server uses. At the payment step the record becomes a
//! [`BookingSubmission`] for `POST /v1/bookings`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wayfarer_catalog::{
    Accommodation, Attraction, CatalogError, LineTotals, PriceBreakdown, PricingEngine,
    TransportationOption,
};
use wayfarer_core::payment::{PaymentCard, PaymentError};
use wayfarer_core::{CoreError, DateRange};

use crate::booking::{AccommodationRequest, BookingSubmission};
use crate::models::{Direction, NewTripAttraction, NewTripTransportation, NewUser, TimeSlot, TripDetails};
use crate::rules::{self, BookingRules};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    Destination,
    Transportation,
    Lodging,
    Attractions,
    Payment,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Destination,
        WizardStep::Transportation,
        WizardStep::Lodging,
        WizardStep::Attractions,
        WizardStep::Payment,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{action} belongs to the {expected:?} step, the wizard is on {actual:?}")]
    WrongStep {
        action: &'static str,
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("{step:?} step is incomplete: {reason}")]
    Incomplete { step: WizardStep, reason: String },

    #[error("Already at the final step")]
    AtFinalStep,

    #[error("No {kind} selection at position {index}")]
    NoSuchSelection { kind: &'static str, index: usize },

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl From<CatalogError> for WizardError {
    fn from(err: CatalogError) -> Self {
        WizardError::Invalid(err.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportationPick {
    pub direction: Direction,
    pub option: TransportationOption,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodgingPick {
    pub accommodation: Accommodation,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms: u32,
}

impl LodgingPick {
    fn stay(&self) -> Result<DateRange, CoreError> {
        DateRange::new(self.check_in, self.check_out)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttractionPick {
    pub attraction: Attraction,
    pub day: NaiveDate,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Clone)]
pub struct TripWizard {
    step: WizardStep,
    pricing: PricingEngine,
    rules: BookingRules,
    details: Option<TripDetails>,
    transportation: Vec<TransportationPick>,
    lodging: Vec<LodgingPick>,
    attractions: Vec<AttractionPick>,
    contact: Option<NewUser>,
    payment: Option<PaymentCard>,
}

impl TripWizard {
    pub fn new(pricing: PricingEngine, rules: BookingRules) -> Self {
        Self {
            step: WizardStep::Destination,
            pricing,
            rules,
            details: None,
            transportation: Vec::new(),
            lodging: Vec::new(),
            attractions: Vec::new(),
            contact: None,
            payment: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn details(&self) -> Option<&TripDetails> {
        self.details.as_ref()
    }

    pub fn transportation(&self) -> &[TransportationPick] {
        &self.transportation
    }

    pub fn lodging(&self) -> &[LodgingPick] {
        &self.lodging
    }

    pub fn attractions(&self) -> &[AttractionPick] {
        &self.attractions
    }

    fn require_step(&self, action: &'static str, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                action,
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn require_details(&self) -> Result<&TripDetails, WizardError> {
        self.details.as_ref().ok_or(WizardError::Incomplete {
            step: WizardStep::Destination,
            reason: "trip details are not set".to_string(),
        })
    }

    // ========================================================================
    // Step 1: destination
    // ========================================================================

    /// Set origin, destination, dates and party size. Later selections that no longer fit are dropped.
    pub fn set_trip_details(&mut self, details: TripDetails) -> Result<(), WizardError> {
        self.require_step("setting trip details", WizardStep::Destination)?;
        self.rules.check_details(&details)?;
        self.details = Some(details);
        self.prune();
        Ok(())
    }

    fn prune(&mut self) {
        let Some(details) = self.details.clone() else {
            return;
        };

        self.transportation
            .retain(|pick| rules::check_transportation(&details, &pick.option, pick.direction).is_ok());

        let pricing = &self.pricing;
        self.lodging.retain(|pick| {
            pick.stay().is_ok_and(|stay| {
                rules::check_accommodation(&details, &pick.accommodation, &stay).is_ok()
                    && pricing
                        .accommodation_line(&pick.accommodation, &stay, pick.rooms, details.party_size)
                        .is_ok()
            })
        });

        self.attractions
            .retain(|pick| rules::check_attraction(&details, &pick.attraction, pick.day).is_ok());
    }

    // ========================================================================
    // Step 2: transportation
    // ========================================================================

    /// Choose the option for a direction, replacing any earlier choice for it.
    pub fn select_transportation(
        &mut self,
        option: TransportationOption,
        direction: Direction,
    ) -> Result<(), WizardError> {
        self.require_step("selecting transportation", WizardStep::Transportation)?;
        let details = self.require_details()?;
        rules::check_transportation(details, &option, direction)?;

        self.transportation.retain(|pick| pick.direction != direction);
        self.transportation.push(TransportationPick { direction, option });
        self.transportation.sort_by_key(|pick| pick.direction == Direction::Return);
        Ok(())
    }

    pub fn clear_transportation(&mut self, direction: Direction) -> Result<(), WizardError> {
        self.require_step("clearing transportation", WizardStep::Transportation)?;
        self.transportation.retain(|pick| pick.direction != direction);
        Ok(())
    }

    // ========================================================================
    // Step 3: lodging
    // ========================================================================

    pub fn add_lodging(
        &mut self,
        accommodation: Accommodation,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rooms: Option<u32>,
    ) -> Result<(), WizardError> {
        self.require_step("adding lodging", WizardStep::Lodging)?;
        let details = self.require_details()?;
        let stay = DateRange::new(check_in, check_out)?;
        rules::check_accommodation(details, &accommodation, &stay)?;

        let rooms = rooms.unwrap_or_else(|| accommodation.rooms_needed(details.party_size));
        self.pricing
            .accommodation_line(&accommodation, &stay, rooms, details.party_size)?;

        self.lodging.push(LodgingPick {
            accommodation,
            check_in,
            check_out,
            rooms,
        });
        Ok(())
    }

    pub fn remove_lodging(&mut self, index: usize) -> Result<LodgingPick, WizardError> {
        self.require_step("removing lodging", WizardStep::Lodging)?;
        if index >= self.lodging.len() {
            return Err(WizardError::NoSuchSelection { kind: "lodging", index });
        }
        Ok(self.lodging.remove(index))
    }

    // ========================================================================
    // Step 4: attractions
    // ========================================================================

    pub fn add_attraction(
        &mut self,
        attraction: Attraction,
        day: NaiveDate,
        time_slot: TimeSlot,
    ) -> Result<(), WizardError> {
        self.require_step("adding an attraction", WizardStep::Attractions)?;
        let details = self.require_details()?;
        rules::check_attraction(details, &attraction, day)?;

        if self
            .attractions
            .iter()
            .any(|pick| pick.day == day && pick.time_slot == time_slot)
        {
            return Err(CoreError::validation(format!("{} {:?} is already taken", day, time_slot)).into());
        }

        self.attractions.push(AttractionPick {
            attraction,
            day,
            time_slot,
        });
        self.attractions.sort_by_key(|pick| (pick.day, pick.time_slot));
        Ok(())
    }

    pub fn remove_attraction(&mut self, index: usize) -> Result<AttractionPick, WizardError> {
        self.require_step("removing an attraction", WizardStep::Attractions)?;
        if index >= self.attractions.len() {
            return Err(WizardError::NoSuchSelection { kind: "attraction", index });
        }
        Ok(self.attractions.remove(index))
    }

    // ========================================================================
    // Step 5: payment
    // ========================================================================

    pub fn set_payment(
        &mut self,
        card: PaymentCard,
        contact: Option<NewUser>,
        today: NaiveDate,
    ) -> Result<(), WizardError> {
        self.require_step("entering payment details", WizardStep::Payment)?;
        card.validate(today)?;
        if let Some(contact) = &contact {
            contact.validate()?;
        }
        self.payment = Some(card);
        self.contact = contact;
        Ok(())
    }

    // ========================================================================
    // Totals and navigation
    // ========================================================================

    pub fn line_totals(&self) -> LineTotals {
        let Some(details) = &self.details else {
            return LineTotals::default();
        };
        let party_size = details.party_size;
        let mut lines = LineTotals::default();

        for pick in &self.transportation {
            lines.transportation_cents += self
                .pricing
                .transportation_line(&pick.option, party_size)
                .unwrap_or(0);
        }
        for pick in &self.lodging {
            if let Ok(stay) = pick.stay() {
                lines.accommodation_cents += self
                    .pricing
                    .accommodation_line(&pick.accommodation, &stay, pick.rooms, party_size)
                    .unwrap_or(0);
            }
        }
        for pick in &self.attractions {
            lines.attractions_cents += self
                .pricing
                .attraction_line(&pick.attraction, party_size)
                .unwrap_or(0);
        }
        lines
    }

    /// What the traveler owes for everything picked so far.
    pub fn running_total(&self) -> PriceBreakdown {
        self.pricing.quote(&self.line_totals())
    }

    fn check_step(&self, step: WizardStep) -> Result<(), WizardError> {
        let incomplete = |reason: &str| {
            Err(WizardError::Incomplete {
                step,
                reason: reason.to_string(),
            })
        };

        match step {
            WizardStep::Destination if self.details.is_none() => incomplete("trip details are not set"),
            WizardStep::Transportation
                if !self
                    .transportation
                    .iter()
                    .any(|pick| pick.direction == Direction::Outbound) =>
            {
                incomplete("choose an outbound transportation")
            }
            WizardStep::Lodging if self.lodging.is_empty() => incomplete("choose at least one place to stay"),
            WizardStep::Payment if self.payment.is_none() => incomplete("payment details are missing"),
            _ => Ok(()),
        }
    }

    pub fn is_step_complete(&self, step: WizardStep) -> bool {
        self.check_step(step).is_ok()
    }

    /// Move to the next step once the current one is complete.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        self.check_step(self.step)?;
        let next = self.step.next().ok_or(WizardError::AtFinalStep)?;
        self.step = next;
        Ok(next)
    }

    /// Step back. Going back never loses selections.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Produce the booking submission. Only possible from the payment step with every step complete.
    pub fn submit(&self) -> Result<BookingSubmission, WizardError> {
        self.require_step("submitting the booking", WizardStep::Payment)?;
        for step in WizardStep::ALL {
            self.check_step(step)?;
        }

        let details = self.require_details()?.clone();
        let payment = self.payment.clone().ok_or(WizardError::Incomplete {
            step: WizardStep::Payment,
            reason: "payment details are missing".to_string(),
        })?;

        Ok(BookingSubmission {
            trip: details,
            contact: self.contact.clone(),
            transportation: self
                .transportation
                .iter()
                .map(|pick| NewTripTransportation {
                    transportation_option_id: pick.option.id,
                    direction: pick.direction,
                })
                .collect(),
            accommodations: self
                .lodging
                .iter()
                .map(|pick| AccommodationRequest {
                    accommodation_id: pick.accommodation.id,
                    check_in: pick.check_in,
                    check_out: pick.check_out,
                    rooms: Some(pick.rooms),
                })
                .collect(),
            attractions: self
                .attractions
                .iter()
                .map(|pick| NewTripAttraction {
                    attraction_id: pick.attraction.id,
                    day: pick.day,
                    time_slot: pick.time_slot,
                })
                .collect(),
            payment,
            quoted_total_cents: self.running_total().total_cents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_catalog::PricingConfig;
    use wayfarer_shared::Masked;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn wizard() -> TripWizard {
        TripWizard::new(
            PricingEngine::new(PricingConfig {
                currency: "USD".to_string(),
                tax_rate: 0.10,
                booking_fee_cents: 1_000,
            }),
            BookingRules::default(),
        )
    }

    fn details(destination: i64, party_size: u32) -> TripDetails {
        TripDetails {
            user_id: None,
            origin_location_id: 1,
            destination_location_id: destination,
            start_date: d(1),
            end_date: d(4),
            party_size,
        }
    }

    fn leg(id: i64, origin: i64, destination: i64) -> TransportationOption {
        TransportationOption {
            id,
            transportation_type_id: 1,
            origin_location_id: origin,
            destination_location_id: destination,
            carrier: "Aurora Air".to_string(),
            departure_time: d(1).and_hms_opt(7, 0, 0).unwrap(),
            arrival_time: d(1).and_hms_opt(9, 0, 0).unwrap(),
            price_cents: 10_000,
        }
    }

    fn hotel(location_id: i64) -> Accommodation {
        Accommodation {
            id: 5,
            accommodation_type_id: 1,
            location_id,
            name: "Harbor Inn".to_string(),
            address: "1 Quay St".to_string(),
            nightly_rate_cents: 8_000,
            max_guests_per_room: 2,
            rating: 4.3,
        }
    }

    fn museum(location_id: i64) -> Attraction {
        Attraction {
            id: 8,
            location_id,
            name: "Maritime Museum".to_string(),
            category: "Museum".to_string(),
            description: None,
            price_cents: 1_500,
            duration_minutes: 90,
        }
    }

    fn card() -> PaymentCard {
        PaymentCard {
            cardholder_name: "Ada Lovelace".to_string(),
            card_number: Masked::from("4242424242424242"),
            expiry_month: 12,
            expiry_year: 2030,
            cvc: Masked::from("123"),
        }
    }

    #[test]
    fn test_full_flow_produces_submission() {
        let mut w = wizard();
        w.set_trip_details(details(2, 2)).unwrap();
        assert_eq!(w.advance().unwrap(), WizardStep::Transportation);

        w.select_transportation(leg(1, 1, 2), Direction::Outbound).unwrap();
        w.select_transportation(leg(2, 2, 1), Direction::Return).unwrap();
        assert_eq!(w.advance().unwrap(), WizardStep::Lodging);

        w.add_lodging(hotel(2), d(1), d(4), None).unwrap();
        assert_eq!(w.lodging()[0].rooms, 1);
        assert_eq!(w.advance().unwrap(), WizardStep::Attractions);

        w.add_attraction(museum(2), d(2), TimeSlot::Morning).unwrap();
        assert_eq!(w.advance().unwrap(), WizardStep::Payment);

        w.set_payment(card(), None, today()).unwrap();

        // 2 legs x 2 travelers x 100.00 + 3 nights x 80.00 + 2 x 15.00
        let total = w.running_total();
        assert_eq!(total.transportation_cents, 40_000);
        assert_eq!(total.accommodation_cents, 24_000);
        assert_eq!(total.attractions_cents, 3_000);
        assert_eq!(total.subtotal_cents, 67_000);
        assert_eq!(total.taxes_cents, 6_700);
        assert_eq!(total.total_cents, 67_000 + 6_700 + 1_000);

        let submission = w.submit().unwrap();
        assert_eq!(submission.quoted_total_cents, total.total_cents);
        assert_eq!(submission.transportation.len(), 2);
        assert_eq!(submission.transportation[0].direction, Direction::Outbound);
        assert_eq!(submission.accommodations[0].rooms, Some(1));
        assert_eq!(submission.attractions[0].attraction_id, 8);
        assert!(matches!(w.advance(), Err(WizardError::AtFinalStep)));
    }

    #[test]
    fn test_cannot_advance_past_incomplete_step() {
        let mut w = wizard();
        assert!(matches!(w.advance(), Err(WizardError::Incomplete { step: WizardStep::Destination, .. })));

        w.set_trip_details(details(2, 1)).unwrap();
        w.advance().unwrap();

        // Return leg alone does not complete the step
        w.select_transportation(leg(2, 2, 1), Direction::Return).unwrap();
        assert!(!w.is_step_complete(WizardStep::Transportation));
        assert!(w.advance().is_err());
        assert_eq!(w.step(), WizardStep::Transportation);
    }

    #[test]
    fn test_actions_are_bound_to_their_step() {
        let mut w = wizard();
        let result = w.add_lodging(hotel(2), d(1), d(2), None);
        assert!(matches!(
            result,
            Err(WizardError::WrongStep { expected: WizardStep::Lodging, actual: WizardStep::Destination, .. })
        ));
        assert!(w.submit().is_err());
    }

    #[test]
    fn test_reselecting_a_direction_replaces_it() {
        let mut w = wizard();
        w.set_trip_details(details(2, 1)).unwrap();
        w.advance().unwrap();

        w.select_transportation(leg(1, 1, 2), Direction::Outbound).unwrap();
        let mut pricier = leg(3, 1, 2);
        pricier.price_cents = 25_000;
        w.select_transportation(pricier, Direction::Outbound).unwrap();

        assert_eq!(w.transportation().len(), 1);
        assert_eq!(w.transportation()[0].option.id, 3);
        assert_eq!(w.running_total().transportation_cents, 25_000);

        assert!(w.select_transportation(leg(4, 1, 2), Direction::Return).is_err());
    }

    #[test]
    fn test_changing_destination_drops_stale_selections() {
        let mut w = wizard();
        w.set_trip_details(details(2, 2)).unwrap();
        w.advance().unwrap();
        w.select_transportation(leg(1, 1, 2), Direction::Outbound).unwrap();
        w.advance().unwrap();
        w.add_lodging(hotel(2), d(1), d(3), None).unwrap();
        w.advance().unwrap();
        w.add_attraction(museum(2), d(2), TimeSlot::Evening).unwrap();
        assert!(w.running_total().total_cents > 0);

        w.back();
        w.back();
        w.back();
        assert_eq!(w.step(), WizardStep::Destination);
        assert_eq!(w.back(), WizardStep::Destination);

        w.set_trip_details(details(3, 2)).unwrap();
        assert!(w.transportation().is_empty());
        assert!(w.lodging().is_empty());
        assert!(w.attractions().is_empty());
        assert_eq!(w.running_total().total_cents, 0);
    }

    #[test]
    fn test_growing_party_drops_lodging_that_no_longer_fits() {
        let mut w = wizard();
        w.set_trip_details(details(2, 2)).unwrap();
        w.advance().unwrap();
        w.select_transportation(leg(1, 1, 2), Direction::Outbound).unwrap();
        w.advance().unwrap();
        w.add_lodging(hotel(2), d(1), d(3), Some(1)).unwrap();
        w.back();
        w.back();

        w.set_trip_details(details(2, 3)).unwrap();
        assert_eq!(w.transportation().len(), 1);
        assert!(w.lodging().is_empty());
    }

    #[test]
    fn test_shortening_trip_drops_late_stays_and_attractions() {
        let mut w = wizard();
        w.set_trip_details(details(2, 2)).unwrap();
        w.advance().unwrap();
        w.select_transportation(leg(1, 1, 2), Direction::Outbound).unwrap();
        w.select_transportation(leg(2, 2, 1), Direction::Return).unwrap();
        w.advance().unwrap();
        w.add_lodging(hotel(2), d(1), d(2), None).unwrap();
        w.add_lodging(hotel(2), d(2), d(4), None).unwrap();
        w.advance().unwrap();
        w.add_attraction(museum(2), d(2), TimeSlot::Morning).unwrap();
        w.add_attraction(museum(2), d(4), TimeSlot::Evening).unwrap();
        while w.step() != WizardStep::Destination {
            w.back();
        }

        let shorter = TripDetails {
            end_date: d(2),
            ..details(2, 2)
        };
        w.set_trip_details(shorter).unwrap();

        assert_eq!(w.transportation().len(), 2);
        assert_eq!(w.lodging().len(), 1);
        assert_eq!(w.lodging()[0].check_out, d(2));
        assert_eq!(w.attractions().len(), 1);
        assert_eq!(w.attractions()[0].day, d(2));

        // 2 legs x 2 travelers x 100.00 + 1 night x 80.00 + 2 x 15.00
        assert_eq!(w.running_total().subtotal_cents, 40_000 + 8_000 + 3_000);
    }

    #[test]
    fn test_attraction_slot_conflict() {
        let mut w = wizard();
        w.set_trip_details(details(2, 1)).unwrap();
        w.advance().unwrap();
        w.select_transportation(leg(1, 1, 2), Direction::Outbound).unwrap();
        w.advance().unwrap();
        w.add_lodging(hotel(2), d(1), d(4), None).unwrap();
        w.advance().unwrap();

        w.add_attraction(museum(2), d(2), TimeSlot::Afternoon).unwrap();
        assert!(matches!(
            w.add_attraction(museum(2), d(2), TimeSlot::Afternoon),
            Err(WizardError::Invalid(CoreError::ValidationError(_)))
        ));
        assert!(w.add_attraction(museum(3), d(2), TimeSlot::Morning).is_err());

        let removed = w.remove_attraction(0).unwrap();
        assert_eq!(removed.time_slot, TimeSlot::Afternoon);
        assert!(matches!(w.remove_attraction(0), Err(WizardError::NoSuchSelection { .. })));
    }

    #[test]
    fn test_payment_requires_valid_card() {
        let mut w = wizard();
        w.set_trip_details(details(2, 1)).unwrap();
        w.advance().unwrap();
        w.select_transportation(leg(1, 1, 2), Direction::Outbound).unwrap();
        w.advance().unwrap();
        w.add_lodging(hotel(2), d(1), d(2), None).unwrap();
        w.advance().unwrap();
        w.advance().unwrap();

        let mut expired = card();
        expired.expiry_year = 2024;
        assert!(matches!(w.set_payment(expired, None, today()), Err(WizardError::Payment(_))));
        assert!(matches!(w.submit(), Err(WizardError::Incomplete { step: WizardStep::Payment, .. })));

        let contact = NewUser {
            name: "Ada".to_string(),
            email: Masked::from("ada@example.com"),
        };
        w.set_payment(card(), Some(contact), today()).unwrap();
        let submission = w.submit().unwrap();
        assert!(submission.contact.is_some());
        assert!(submission.attractions.is_empty());
    }
}
