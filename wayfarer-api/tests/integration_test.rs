use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wayfarer_api::{app, AppState};
use wayfarer_catalog::{Accommodation, Attraction, PricingEngine, TransportationOption};
use wayfarer_core::payment::PaymentCard;
use wayfarer_shared::Masked;
use wayfarer_store::app_config::{BusinessRules, EventsConfig, SeedConfig, ServerConfig};
use wayfarer_store::Config;
use wayfarer_trip::{Direction, TimeSlot, TripDetails, TripWizard};

// The seeded catalog: 1 Lisbon, 2 Barcelona, 3 Amsterdam.
// Transportation 1 flight L->B 120.00, 2 bus L->B 45.00, 3 flight B->L 110.00.
// Accommodation 1 Hotel Rambla Mar in Barcelona, 150.00/night, two per room.
// Attractions 1 Sagrada Familia 33.00 and 2 Picasso Museum 14.00 in Barcelona.

const GOOD_CARD: &str = "4242 4242 4242 4242";
const DECLINED_CARD: &str = "4000000000000002";

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        business_rules: BusinessRules {
            currency: "USD".to_string(),
            tax_rate: 0.10,
            booking_fee_cents: 1_500,
            max_party_size: 10,
            max_trip_nights: 30,
        },
        seed: SeedConfig { enabled: true },
        events: EventsConfig { channel_capacity: 16 },
    }
}

async fn setup_app() -> Router {
    let state = AppState::from_config(&test_config()).await.unwrap();
    app(state)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request(method, uri, body)).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn card(number: &str) -> Value {
    json!({
        "cardholder_name": "Grace Hopper",
        "card_number": number,
        "expiry_month": 12,
        "expiry_year": 2030,
        "cvc": "123"
    })
}

fn barcelona_trip() -> Value {
    json!({
        "origin_location_id": 1,
        "destination_location_id": 2,
        "start_date": "2026-07-01",
        "end_date": "2026-07-05",
        "party_size": 2
    })
}

/// Draft trip with both flights, four nights at the Rambla Mar and the Sagrada Familia.
async fn planned_trip(app: &Router) -> i64 {
    let (status, trip) = send(app, "POST", "/v1/trips", Some(barcelona_trip())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = trip["id"].as_i64().unwrap();

    let steps = [
        ("transportation", json!({ "transportation_option_id": 1, "direction": "OUTBOUND" })),
        ("transportation", json!({ "transportation_option_id": 3, "direction": "RETURN" })),
        ("accommodations", json!({ "accommodation_id": 1, "check_in": "2026-07-01", "check_out": "2026-07-05" })),
        ("attractions", json!({ "attraction_id": 1, "day": "2026-07-02", "time_slot": "MORNING" })),
    ];
    for (child, body) in steps {
        let (status, _) = send(app, "POST", &format!("/v1/trips/{}/{}", id, child), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "adding {}", child);
    }
    id
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = setup_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_catalog_reads() {
    let app = setup_app().await;

    let (status, locations) = send(&app, "GET", "/v1/locations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locations.as_array().unwrap().len(), 3);
    assert_eq!(locations[0]["name"], "Lisbon");

    let (status, body) = send(&app, "GET", "/v1/locations/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("location"));

    let (_, stays) = send(&app, "GET", "/v1/locations/2/accommodations", None).await;
    assert_eq!(stays.as_array().unwrap().len(), 2);

    let (_, sights) = send(&app, "GET", "/v1/attractions?location_id=2", None).await;
    assert_eq!(sights.as_array().unwrap().len(), 3);

    let (_, types) = send(&app, "GET", "/v1/transportation-types", None).await;
    assert_eq!(types[0]["name"], "Flight");
    let (status, _) = send(&app, "GET", "/v1/accommodation-types/3", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/v1/accommodation-types/30", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transportation_search() {
    let app = setup_app().await;

    let (status, options) = send(&app, "GET", "/v1/transportation?origin_id=1&destination_id=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let options = options.as_array().unwrap();
    assert_eq!(options.len(), 2);
    // The early bus leaves before the flight
    assert_eq!(options[0]["carrier"], "Iberbus");

    let (_, from_lisbon) = send(&app, "GET", "/v1/transportation?origin_id=1", None).await;
    assert_eq!(from_lisbon.as_array().unwrap().len(), 3);

    let (status, body) = send(&app, "GET", "/v1/transportation?origin_id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_user_registration() {
    let app = setup_app().await;
    let ada = json!({ "name": "Ada", "email": "Ada@Example.com" });

    let (status, user) = send(&app, "POST", "/v1/users", Some(ada.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "ada@example.com");
    let user_id = user["id"].as_i64().unwrap();

    let (status, _) = send(&app, "POST", "/v1/users", Some(ada)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/v1/users", Some(json!({ "name": "Bob", "email": "bob" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut trip = barcelona_trip();
    trip["user_id"] = json!(user_id);
    let (status, _) = send(&app, "POST", "/v1/trips", Some(trip)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, trips) = send(&app, "GET", &format!("/v1/users/{}/trips", user_id), None).await;
    assert_eq!(trips.as_array().unwrap().len(), 1);
    let (status, _) = send(&app, "GET", "/v1/users/404/trips", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Trips
// ============================================================================

#[tokio::test]
async fn test_trip_validation() {
    let app = setup_app().await;

    let mut same_city = barcelona_trip();
    same_city["destination_location_id"] = json!(1);
    let (status, _) = send(&app, "POST", "/v1/trips", Some(same_city)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut backwards = barcelona_trip();
    backwards["end_date"] = json!("2026-06-20");
    let (status, _) = send(&app, "POST", "/v1/trips", Some(backwards)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut nowhere = barcelona_trip();
    nowhere["destination_location_id"] = json!(42);
    let (status, _) = send(&app, "POST", "/v1/trips", Some(nowhere)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/trips")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_ids_get_json_errors() {
    let app = setup_app().await;

    for (method, uri) in [
        ("GET", "/v1/trips/abc"),
        ("GET", "/v1/users/abc/trips"),
        ("GET", "/v1/locations/1.5"),
        ("DELETE", "/v1/trips/1/attractions/first"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert!(body["error"].is_string(), "{} {} gave {}", method, uri, body);
    }
}

#[tokio::test]
async fn test_trip_total_is_derived() {
    let app = setup_app().await;
    let id = planned_trip(&app).await;

    let (status, summary) = send(&app, "GET", &format!("/v1/trips/{}/summary", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["price"]["subtotal_cents"], 112_600);
    assert_eq!(summary["price"]["taxes_cents"], 11_260);
    assert_eq!(summary["price"]["booking_fee_cents"], 1_500);
    assert_eq!(summary["price"]["total_cents"], 125_360);
    assert_eq!(summary["trip"]["total_price_cents"], 125_360);

    // Clients cannot set the price
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/v1/trips/{}", id),
        Some(json!({ "total_price_cents": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, trip) = send(
        &app,
        "PATCH",
        &format!("/v1/trips/{}", id),
        Some(json!({ "party_size": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trip["total_price_cents"], 86_300 + 8_630 + 1_500);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/v1/trips/{}", id),
        Some(json!({ "status": "CONFIRMED" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_trip_children() {
    let app = setup_app().await;
    let id = planned_trip(&app).await;
    let (_, other) = send(&app, "POST", "/v1/trips", Some(barcelona_trip())).await;
    let other_id = other["id"].as_i64().unwrap();

    let (_, legs) = send(&app, "GET", &format!("/v1/trips/{}/transportation", id), None).await;
    let outbound_id = legs[0]["id"].as_i64().unwrap();
    assert_eq!(legs[0]["direction"], "OUTBOUND");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/trips/{}/transportation", id),
        Some(json!({ "transportation_option_id": 2, "direction": "OUTBOUND" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, leg) = send(
        &app,
        "PATCH",
        &format!("/v1/trips/{}/transportation/{}", id, outbound_id),
        Some(json!({ "transportation_option_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(leg["transportation_option_id"], 2);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/v1/trips/{}/transportation/{}", other_id, outbound_id),
        Some(json!({ "transportation_option_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/trips/{}/attractions", id),
        Some(json!({ "attraction_id": 2, "day": "2026-07-02", "time_slot": "MORNING" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stays) = send(&app, "GET", &format!("/v1/trips/{}/accommodations", id), None).await;
    let stay_id = stays[0]["id"].as_i64().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/v1/trips/{}/accommodations/{}", other_id, stay_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/v1/trips/{}/accommodations/{}", id, stay_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, trip) = send(&app, "GET", &format!("/v1/trips/{}", id), None).await;
    // Bus out 90.00, flight back 220.00, Sagrada Familia 66.00
    assert_eq!(trip["total_price_cents"], 37_600 + 3_760 + 1_500);
}

#[tokio::test]
async fn test_checkout_flow() {
    let app = setup_app().await;
    let id = planned_trip(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/trips/{}/checkout", id),
        Some(json!({ "payment": card(DECLINED_CARD) })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(!body["error"].as_str().unwrap().contains(DECLINED_CARD));
    let (_, trip) = send(&app, "GET", &format!("/v1/trips/{}", id), None).await;
    assert_eq!(trip["status"], "DRAFT");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/trips/{}/checkout", id),
        Some(json!({ "payment": card("4242 4242 4242 4241") })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, receipt) = send(
        &app,
        "POST",
        &format!("/v1/trips/{}/checkout", id),
        Some(json!({ "payment": card(GOOD_CARD) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["status"], "CONFIRMED");
    assert_eq!(receipt["amount_cents"], 125_360);
    assert_eq!(receipt["currency"], "USD");
    assert_eq!(receipt["card_last4"], "4242");
    assert!(receipt["payment_reference"].as_str().unwrap().starts_with("pay_"));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/trips/{}/attractions", id),
        Some(json!({ "attraction_id": 2, "day": "2026-07-03", "time_slot": "EVENING" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, trip) = send(&app, "POST", &format!("/v1/trips/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trip["status"], "CANCELLED");
    let (status, _) = send(&app, "POST", &format!("/v1/trips/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_checkout_needs_outbound_and_stay() {
    let app = setup_app().await;
    let (_, trip) = send(&app, "POST", "/v1/trips", Some(barcelona_trip())).await;
    let id = trip["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/trips/{}/checkout", id),
        Some(json!({ "payment": card(GOOD_CARD) })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("outbound"));
}

#[tokio::test]
async fn test_trip_event_stream() {
    let app = setup_app().await;
    let (_, trip) = send(&app, "POST", "/v1/trips", Some(barcelona_trip())).await;
    let id = trip["id"].as_i64().unwrap();

    let (status, _) = send(&app, "GET", "/v1/trips/999/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/v1/trips/{}/events", id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.into_body();

    let (status, _) = send(&app, "POST", &format!("/v1/trips/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("no event within 5s")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: trip_cancelled"));
    assert!(text.contains("\"status\":\"CANCELLED\""));
}

// ============================================================================
// Bookings
// ============================================================================

fn submission(quoted_total_cents: i64, card_number: &str) -> Value {
    json!({
        "trip": barcelona_trip(),
        "contact": { "name": "Grace Hopper", "email": "grace@example.com" },
        "transportation": [
            { "transportation_option_id": 1, "direction": "OUTBOUND" },
            { "transportation_option_id": 3, "direction": "RETURN" }
        ],
        "accommodations": [
            { "accommodation_id": 1, "check_in": "2026-07-01", "check_out": "2026-07-05" }
        ],
        "attractions": [
            { "attraction_id": 1, "day": "2026-07-02", "time_slot": "MORNING" }
        ],
        "payment": card(card_number),
        "quoted_total_cents": quoted_total_cents
    })
}

#[tokio::test]
async fn test_booking_submission() {
    let app = setup_app().await;

    let (status, body) = send(&app, "POST", "/v1/bookings", Some(submission(100, GOOD_CARD))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("125360"));

    let (status, _) = send(&app, "POST", "/v1/bookings", Some(submission(125_360, DECLINED_CARD))).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    let (_, trips) = send(&app, "GET", "/v1/trips", None).await;
    assert!(trips.as_array().unwrap().is_empty());

    let (status, booking) = send(&app, "POST", "/v1/bookings", Some(submission(125_360, GOOD_CARD))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["summary"]["trip"]["status"], "CONFIRMED");
    assert_eq!(booking["summary"]["price"]["total_cents"], 125_360);
    assert_eq!(booking["summary"]["accommodations"][0]["rooms"], 1);
    assert_eq!(booking["payment"]["amount_cents"], 125_360);

    let user_id = booking["summary"]["trip"]["user_id"].as_i64().unwrap();
    let (_, trips) = send(&app, "GET", &format!("/v1/trips?user_id={}", user_id), None).await;
    assert_eq!(trips.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_rejects_unknown_references() {
    let app = setup_app().await;
    let mut body = submission(125_360, GOOD_CARD);
    body["attractions"][0]["attraction_id"] = json!(500);

    let (status, _) = send(&app, "POST", "/v1/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wizard_total_matches_server() {
    let app = setup_app().await;
    let config = test_config();
    let mut wizard = TripWizard::new(
        PricingEngine::new(config.business_rules.pricing()),
        config.business_rules.booking_rules(),
    );
    let day = |d| NaiveDate::from_ymd_opt(2026, 7, d).unwrap();

    wizard
        .set_trip_details(TripDetails {
            user_id: None,
            origin_location_id: 1,
            destination_location_id: 2,
            start_date: day(1),
            end_date: day(5),
            party_size: 3,
        })
        .unwrap();
    wizard.advance().unwrap();

    let (_, there) = send(&app, "GET", "/v1/transportation?origin_id=1&destination_id=2", None).await;
    let (_, back) = send(&app, "GET", "/v1/transportation?origin_id=2&destination_id=1", None).await;
    let bus: TransportationOption = serde_json::from_value(there[0].clone()).unwrap();
    let flight: TransportationOption = serde_json::from_value(back[0].clone()).unwrap();
    wizard.select_transportation(bus, Direction::Outbound).unwrap();
    wizard.select_transportation(flight, Direction::Return).unwrap();
    wizard.advance().unwrap();

    let (_, hotel) = send(&app, "GET", "/v1/accommodations/1", None).await;
    let hotel: Accommodation = serde_json::from_value(hotel).unwrap();
    // Three travelers need two rooms
    wizard.add_lodging(hotel, day(1), day(4), None).unwrap();
    wizard.advance().unwrap();

    let (_, museum) = send(&app, "GET", "/v1/attractions/2", None).await;
    let museum: Attraction = serde_json::from_value(museum).unwrap();
    wizard.add_attraction(museum, day(3), TimeSlot::Afternoon).unwrap();
    wizard.advance().unwrap();

    let payment = PaymentCard {
        cardholder_name: "Grace Hopper".to_string(),
        card_number: Masked::from(GOOD_CARD),
        expiry_month: 12,
        expiry_year: 2030,
        cvc: Masked::from("123"),
    };
    wizard
        .set_payment(payment, None, chrono::Utc::now().date_naive())
        .unwrap();

    let quoted = wizard.running_total();
    let submission = serde_json::to_value(wizard.submit().unwrap()).unwrap();
    let (status, booking) = send(&app, "POST", "/v1/bookings", Some(submission)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["summary"]["price"]["total_cents"], quoted.total_cents);
    assert_eq!(booking["summary"]["accommodations"][0]["rooms"], 2);
}
