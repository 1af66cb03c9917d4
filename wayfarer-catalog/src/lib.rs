pub mod models;
pub mod pricing;
pub mod repository;

pub use models::{
    Accommodation, AccommodationType, Attraction, Location, RouteFilter, TransportationOption,
    TransportationType,
};
pub use pricing::{CatalogError, LineTotals, PriceBreakdown, PricingConfig, PricingEngine};
pub use repository::CatalogRepository;
