//! Small reference catalog loaded at startup when `seed.enabled` is set.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;
use wayfarer_catalog::{Accommodation, Attraction, CatalogRepository, TransportationOption};
use wayfarer_core::{CoreError, CoreResult};

use crate::catalog_repo::MemoryCatalogRepository;

fn at(month: u32, day: u32, hour: u32, minute: u32) -> CoreResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2026, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| CoreError::InternalError(format!("bad seed timestamp 2026-{month}-{day}")))
}

pub async fn seed_catalog(catalog: &MemoryCatalogRepository) -> CoreResult<()> {
    let lisbon = catalog
        .add_location("Lisbon", "Portugal", Some("Hilly riverside capital"))
        .await
        .id;
    let barcelona = catalog
        .add_location("Barcelona", "Spain", Some("Modernist architecture by the sea"))
        .await
        .id;
    let amsterdam = catalog
        .add_location("Amsterdam", "Netherlands", Some("Canals and museums"))
        .await
        .id;

    let flight = catalog.add_transportation_type("Flight").await.id;
    let train = catalog.add_transportation_type("Train").await.id;
    let bus = catalog.add_transportation_type("Bus").await.id;

    let hotel = catalog.add_accommodation_type("Hotel").await.id;
    let hostel = catalog.add_accommodation_type("Hostel").await.id;
    let apartment = catalog.add_accommodation_type("Apartment").await.id;

    // (type, from, to, carrier, departs (day, h, m), arrives (day, h, m), price)
    let legs = [
        (flight, lisbon, barcelona, "Aurora Air", (1, 8, 0), (1, 11, 0), 12_000),
        (bus, lisbon, barcelona, "Iberbus", (1, 6, 0), (1, 20, 30), 4_500),
        (flight, barcelona, lisbon, "Aurora Air", (5, 18, 0), (5, 19, 0), 11_000),
        (flight, lisbon, amsterdam, "Polder Wings", (1, 9, 15), (1, 13, 15), 15_000),
        (flight, amsterdam, lisbon, "Polder Wings", (5, 15, 0), (5, 17, 0), 14_500),
        (train, barcelona, amsterdam, "EuroRail", (2, 7, 0), (2, 20, 0), 9_900),
        (train, amsterdam, barcelona, "EuroRail", (6, 7, 0), (6, 20, 0), 9_900),
    ];
    for (type_id, from, to, carrier, depart, arrive, price_cents) in legs {
        let (day, hour, minute) = depart;
        let departure_time = at(7, day, hour, minute)?;
        let (day, hour, minute) = arrive;
        let arrival_time = at(7, day, hour, minute)?;

        catalog
            .add_transportation_option(TransportationOption {
                id: 0,
                transportation_type_id: type_id,
                origin_location_id: from,
                destination_location_id: to,
                carrier: carrier.to_string(),
                departure_time,
                arrival_time,
                price_cents,
            })
            .await?;
    }

    let stays = [
        (hotel, barcelona, "Hotel Rambla Mar", "La Rambla 120", 15_000, 2, 4.4),
        (hostel, barcelona, "Gothic Quarter Hostel", "Carrer del Call 7", 3_500, 4, 3.9),
        (apartment, amsterdam, "Canal House Apartment", "Prinsengracht 263", 21_000, 4, 4.7),
        (hotel, lisbon, "Alfama Guesthouse", "Rua de Sao Miguel 15", 9_500, 2, 4.2),
    ];
    for (type_id, location_id, name, address, rate, guests, rating) in stays {
        catalog
            .add_accommodation(Accommodation {
                id: 0,
                accommodation_type_id: type_id,
                location_id,
                name: name.to_string(),
                address: address.to_string(),
                nightly_rate_cents: rate,
                max_guests_per_room: guests,
                rating,
            })
            .await?;
    }

    let sights = [
        (barcelona, "Sagrada Familia", "Landmark", "Gaudi's unfinished basilica", 3_300, 120),
        (barcelona, "Picasso Museum", "Museum", "Early works in medieval palaces", 1_400, 90),
        (amsterdam, "Rijksmuseum", "Museum", "Dutch masters", 2_250, 150),
        (lisbon, "Belem Tower", "Landmark", "Sixteenth-century fortified tower", 1_000, 60),
        (barcelona, "Park Guell", "Park", "Mosaic terraces above the city", 1_000, 90),
    ];
    for (location_id, name, category, description, price_cents, duration_minutes) in sights {
        catalog
            .add_attraction(Attraction {
                id: 0,
                location_id,
                name: name.to_string(),
                category: category.to_string(),
                description: Some(description.to_string()),
                price_cents,
                duration_minutes,
            })
            .await?;
    }

    info!(
        locations = catalog.list_locations().await?.len(),
        accommodations = catalog.list_accommodations(None).await?.len(),
        attractions = catalog.list_attractions(None).await?.len(),
        "Catalog seeded"
    );
    Ok(())
}
