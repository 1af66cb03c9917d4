pub mod models;
pub mod lifecycle;
pub mod rules;
pub mod repository;
pub mod booking;
pub mod locks;
pub mod planner;
pub mod checkout;
pub mod wizard;

pub use models::{
    Direction, NewTripAccommodation, NewTripAttraction, NewTripTransportation, NewUser, TimeSlot,
    Trip, TripAccommodation, TripAttraction, TripBundle, TripDetails, TripPatch, TripStatus,
    TripTransportation, TripUpdate, User,
};
pub use lifecycle::TripError;
pub use rules::BookingRules;
pub use repository::TripRepository;
pub use booking::{AccommodationRequest, BookingSubmission, NewBooking};
pub use planner::{TripPlanner, TripSummary};
pub use checkout::{CheckoutError, CheckoutReceipt, PaymentOrchestrator, SimulatedPaymentAdapter};
pub use locks::TripLocks;
pub use wizard::{TripWizard, WizardError, WizardStep};
