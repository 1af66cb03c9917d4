use async_trait::async_trait;
use wayfarer_core::{CoreError, CoreResult};

use crate::models::{
    Accommodation, AccommodationType, Attraction, Location, RouteFilter, TransportationOption,
    TransportationType,
};

/// Read access to the reference catalog.
///
/// Listings are ordered by id, except transportation options, which come back
/// by departure time and then id. `get_*` returns `Ok(None)` for unknown ids;
/// the `require_*` helpers turn that into [`CoreError::NotFound`].
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_locations(&self) -> CoreResult<Vec<Location>>;

    async fn get_location(&self, id: i64) -> CoreResult<Option<Location>>;

    async fn list_transportation_types(&self) -> CoreResult<Vec<TransportationType>>;

    async fn get_transportation_type(&self, id: i64) -> CoreResult<Option<TransportationType>>;

    async fn list_transportation_options(
        &self,
        filter: &RouteFilter,
    ) -> CoreResult<Vec<TransportationOption>>;

    async fn get_transportation_option(&self, id: i64) -> CoreResult<Option<TransportationOption>>;

    async fn list_accommodation_types(&self) -> CoreResult<Vec<AccommodationType>>;

    async fn get_accommodation_type(&self, id: i64) -> CoreResult<Option<AccommodationType>>;

    async fn list_accommodations(&self, location_id: Option<i64>) -> CoreResult<Vec<Accommodation>>;

    async fn get_accommodation(&self, id: i64) -> CoreResult<Option<Accommodation>>;

    async fn list_attractions(&self, location_id: Option<i64>) -> CoreResult<Vec<Attraction>>;

    async fn get_attraction(&self, id: i64) -> CoreResult<Option<Attraction>>;

    async fn require_location(&self, id: i64) -> CoreResult<Location> {
        self.get_location(id)
            .await?
            .ok_or_else(|| CoreError::not_found("location", id))
    }

    async fn require_transportation_option(&self, id: i64) -> CoreResult<TransportationOption> {
        self.get_transportation_option(id)
            .await?
            .ok_or_else(|| CoreError::not_found("transportation option", id))
    }

    async fn require_accommodation(&self, id: i64) -> CoreResult<Accommodation> {
        self.get_accommodation(id)
            .await?
            .ok_or_else(|| CoreError::not_found("accommodation", id))
    }

    async fn require_attraction(&self, id: i64) -> CoreResult<Attraction> {
        self.get_attraction(id)
            .await?
            .ok_or_else(|| CoreError::not_found("attraction", id))
    }
}
