use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;

use crate::repository::toy_repository::ToyRepository;

// The mongodb client connects lazily, so these tests exercise everything
// that answers before the first database round-trip.
async fn test_client() -> Client {
    let mongo = mongodb::Client::with_uri_str("mongodb://localhost:27017")
        .await
        .expect("client options");
    let rocket = crate::build_rocket(rocket::Config::figment(), ToyRepository::new(&mongo));

    Client::tracked(rocket).await.expect("valid rocket instance")
}

fn listing_body() -> String {
    serde_json::json!({
        "picture_url": "https://example.com/robot.png",
        "name": "Wind-Up Robot",
        "seller_name": "Grace",
        "seller_email": "grace@example.com",
        "sub_category": "robots",
        "price": 19.5,
        "rating": 4.7,
        "available_quantity": 3,
        "created_by": "grace@example.com",
        "description": "Clockwork robot, winds on the left side"
    })
    .to_string()
}

#[rocket::async_test]
async fn liveness_route_reports_running() {
    let client = test_client().await;

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.into_string().await.unwrap(),
        "Toy Catalog API is running..."
    );
}

#[rocket::async_test]
async fn responses_carry_cors_headers() {
    let client = test_client().await;

    let response = client.get("/").dispatch().await;
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
}

#[rocket::async_test]
async fn unknown_route_hits_the_json_catcher() {
    let client = test_client().await;

    let response = client.get("/nothing/here").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let body: serde_json::Value =
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    assert!(body["message"].as_str().unwrap().contains("route not found"));
    assert!(body["result"].is_null());
}

#[rocket::async_test]
async fn malformed_id_is_a_bad_request_on_fetch() {
    let client = test_client().await;

    let response = client.get("/toy/not-a-valid-id").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let body: serde_json::Value =
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("not a valid listing id"));
}

#[rocket::async_test]
async fn malformed_id_is_a_bad_request_on_edit_fetch() {
    let client = test_client().await;

    let response = client.get("/updatetoy/42").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn malformed_id_is_a_bad_request_on_update() {
    let client = test_client().await;

    let response = client
        .put("/mytoys/not-a-valid-id")
        .header(ContentType::JSON)
        .body(listing_body())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn malformed_id_is_a_bad_request_on_delete() {
    let client = test_client().await;

    let response = client.delete("/mytoys/not-a-valid-id").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}
