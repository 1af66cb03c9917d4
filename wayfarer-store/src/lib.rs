pub mod app_config;
pub mod memory;
pub mod catalog_repo;
pub mod trip_repo;
pub mod events;
pub mod seed;

pub use app_config::Config;
pub use catalog_repo::MemoryCatalogRepository;
pub use trip_repo::MemoryTripRepository;
pub use events::EventBus;
