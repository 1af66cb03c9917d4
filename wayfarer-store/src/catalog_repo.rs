use async_trait::async_trait;
use tokio::sync::RwLock;
use wayfarer_catalog::{
    Accommodation, AccommodationType, Attraction, CatalogRepository, Location, RouteFilter,
    TransportationOption, TransportationType,
};
use wayfarer_core::{CoreError, CoreResult};

use crate::memory::Table;

#[derive(Default)]
struct CatalogTables {
    locations: Table<Location>,
    transportation_types: Table<TransportationType>,
    transportation_options: Table<TransportationOption>,
    accommodation_types: Table<AccommodationType>,
    accommodations: Table<Accommodation>,
    attractions: Table<Attraction>,
}

impl CatalogTables {
    fn require_location(&self, id: i64) -> CoreResult<()> {
        if !self.locations.contains(id) {
            return Err(CoreError::not_found("location", id));
        }
        Ok(())
    }
}

/// Reference data held in memory. Read-only through [`CatalogRepository`];
/// the `add_*` methods exist for seeding and assign ids, ignoring any id on the input.
#[derive(Default)]
pub struct MemoryCatalogRepository {
    tables: RwLock<CatalogTables>,
}

impl MemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_location(
        &self,
        name: &str,
        country: &str,
        description: Option<&str>,
    ) -> Location {
        let mut tables = self.tables.write().await;
        tables.locations.insert_with(|id| Location {
            id,
            name: name.to_string(),
            country: country.to_string(),
            description: description.map(str::to_string),
        })
    }

    pub async fn add_transportation_type(&self, name: &str) -> TransportationType {
        let mut tables = self.tables.write().await;
        tables.transportation_types.insert_with(|id| TransportationType {
            id,
            name: name.to_string(),
        })
    }

    pub async fn add_accommodation_type(&self, name: &str) -> AccommodationType {
        let mut tables = self.tables.write().await;
        tables.accommodation_types.insert_with(|id| AccommodationType {
            id,
            name: name.to_string(),
        })
    }

    pub async fn add_transportation_option(
        &self,
        option: TransportationOption,
    ) -> CoreResult<TransportationOption> {
        let mut tables = self.tables.write().await;
        if !tables.transportation_types.contains(option.transportation_type_id) {
            return Err(CoreError::not_found(
                "transportation type",
                option.transportation_type_id,
            ));
        }
        tables.require_location(option.origin_location_id)?;
        tables.require_location(option.destination_location_id)?;
        if option.origin_location_id == option.destination_location_id {
            return Err(CoreError::validation("a route must join two different locations"));
        }
        if option.arrival_time <= option.departure_time {
            return Err(CoreError::validation("arrival must come after departure"));
        }

        Ok(tables
            .transportation_options
            .insert_with(|id| TransportationOption { id, ..option }))
    }

    pub async fn add_accommodation(&self, accommodation: Accommodation) -> CoreResult<Accommodation> {
        let mut tables = self.tables.write().await;
        if !tables.accommodation_types.contains(accommodation.accommodation_type_id) {
            return Err(CoreError::not_found(
                "accommodation type",
                accommodation.accommodation_type_id,
            ));
        }
        tables.require_location(accommodation.location_id)?;
        if accommodation.max_guests_per_room == 0 {
            return Err(CoreError::validation("rooms must sleep at least one guest"));
        }

        Ok(tables
            .accommodations
            .insert_with(|id| Accommodation { id, ..accommodation }))
    }

    pub async fn add_attraction(&self, attraction: Attraction) -> CoreResult<Attraction> {
        let mut tables = self.tables.write().await;
        tables.require_location(attraction.location_id)?;

        Ok(tables
            .attractions
            .insert_with(|id| Attraction { id, ..attraction }))
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn list_locations(&self) -> CoreResult<Vec<Location>> {
        Ok(self.tables.read().await.locations.values().cloned().collect())
    }

    async fn get_location(&self, id: i64) -> CoreResult<Option<Location>> {
        Ok(self.tables.read().await.locations.get(id).cloned())
    }

    async fn list_transportation_types(&self) -> CoreResult<Vec<TransportationType>> {
        Ok(self
            .tables
            .read()
            .await
            .transportation_types
            .values()
            .cloned()
            .collect())
    }

    async fn get_transportation_type(&self, id: i64) -> CoreResult<Option<TransportationType>> {
        Ok(self.tables.read().await.transportation_types.get(id).cloned())
    }

    async fn list_transportation_options(
        &self,
        filter: &RouteFilter,
    ) -> CoreResult<Vec<TransportationOption>> {
        let tables = self.tables.read().await;
        let mut options = tables
            .transportation_options
            .cloned_where(|option| filter.matches(option));
        options.sort_by_key(|option| (option.departure_time, option.id));
        Ok(options)
    }

    async fn get_transportation_option(&self, id: i64) -> CoreResult<Option<TransportationOption>> {
        Ok(self.tables.read().await.transportation_options.get(id).cloned())
    }

    async fn list_accommodation_types(&self) -> CoreResult<Vec<AccommodationType>> {
        Ok(self
            .tables
            .read()
            .await
            .accommodation_types
            .values()
            .cloned()
            .collect())
    }

    async fn get_accommodation_type(&self, id: i64) -> CoreResult<Option<AccommodationType>> {
        Ok(self.tables.read().await.accommodation_types.get(id).cloned())
    }

    async fn list_accommodations(&self, location_id: Option<i64>) -> CoreResult<Vec<Accommodation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accommodations
            .cloned_where(|acc| location_id.map_or(true, |id| acc.location_id == id)))
    }

    async fn get_accommodation(&self, id: i64) -> CoreResult<Option<Accommodation>> {
        Ok(self.tables.read().await.accommodations.get(id).cloned())
    }

    async fn list_attractions(&self, location_id: Option<i64>) -> CoreResult<Vec<Attraction>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attractions
            .cloned_where(|attraction| location_id.map_or(true, |id| attraction.location_id == id)))
    }

    async fn get_attraction(&self, id: i64) -> CoreResult<Option<Attraction>> {
        Ok(self.tables.read().await.attractions.get(id).cloned())
    }
}
