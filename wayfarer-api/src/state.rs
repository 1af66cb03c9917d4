use std::sync::Arc;

use wayfarer_catalog::{CatalogRepository, PricingEngine};
use wayfarer_store::seed::seed_catalog;
use wayfarer_store::{Config, EventBus, MemoryCatalogRepository, MemoryTripRepository};
use wayfarer_trip::{PaymentOrchestrator, SimulatedPaymentAdapter, TripPlanner, TripRepository};

#[derive(Clone)]
pub struct AppState {
    pub planner: TripPlanner,
    pub payments: Arc<PaymentOrchestrator>,
    pub events: EventBus,
}

impl AppState {
    /// Wire the in-memory store, seeding the catalog when enabled.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let catalog = MemoryCatalogRepository::new();
        if config.seed.enabled {
            seed_catalog(&catalog).await?;
        }

        let rules = &config.business_rules;
        let planner = TripPlanner::new(
            Arc::new(catalog),
            Arc::new(MemoryTripRepository::new()),
            PricingEngine::new(rules.pricing()),
            rules.booking_rules(),
        );

        Ok(Self {
            planner,
            payments: Arc::new(PaymentOrchestrator::new(Arc::new(SimulatedPaymentAdapter))),
            events: EventBus::new(config.events.channel_capacity),
        })
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogRepository> {
        self.planner.catalog()
    }

    pub fn trips(&self) -> &Arc<dyn TripRepository> {
        self.planner.trips()
    }
}
