//! Promotion validation, discount capping and pricing through the API.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_promotion(app: &TestApp, payload: Value) -> Value {
    let response = app
        .request(Method::POST, "/api/v1/promotions", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await["data"].clone()
}

fn ten_percent_capped(code: &str) -> Value {
    let now = Utc::now();
    json!({
        "code": code,
        "description": "Ten percent off, capped",
        "promotion_type": "Percentage",
        "value": "10",
        "min_amount": "500000",
        "max_discount": "50000",
        "start_date": now - Duration::days(1),
        "end_date": now + Duration::days(30),
    })
}

#[tokio::test]
async fn validate_applies_cap_and_minimum() {
    let app = TestApp::new().await;
    create_promotion(&app, ten_percent_capped("SUMMER10")).await;

    // 10% of 1,000,000 would be 100,000; the cap wins.
    let response = app
        .request(
            Method::POST,
            "/api/v1/promotions/validate",
            Some(json!({ "promotion_code": "SUMMER10", "sub_total": "1000000" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["is_valid"], true);
    assert_eq!(decimal(&body["data"]["discount_amount"]), dec!(50000));

    // Below the minimum subtotal: rejected, but still HTTP 200.
    let response = app
        .request(
            Method::POST,
            "/api/v1/promotions/validate",
            Some(json!({ "promotion_code": "SUMMER10", "sub_total": "400000" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["is_valid"], false);
    assert_eq!(decimal(&body["data"]["discount_amount"]), dec!(0));

    // Unknown code: also a rejection, not an error.
    let response = app
        .request(
            Method::POST,
            "/api/v1/promotions/validate",
            Some(json!({ "promotion_code": "NOPE", "sub_total": "1000000" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["is_valid"], false);
}

#[tokio::test]
async fn price_quote_includes_discount_and_survives_bad_code() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("70A-20001", dec!(500000)).await;
    create_promotion(&app, ten_percent_capped("QUOTE10")).await;

    let start = Utc::now().date_naive();
    let end = start + Duration::days(2);

    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders/calculate-price",
            Some(json!({
                "vehicle_id": vehicle.id,
                "start_date": start,
                "end_date": end,
                "promotion_code": "QUOTE10",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let quote = &body["data"];
    assert_eq!(quote["total_days"], 3);
    assert_eq!(decimal(&quote["subtotal"]), dec!(1500000));
    assert_eq!(decimal(&quote["discount_amount"]), dec!(50000));
    assert_eq!(decimal(&quote["total_amount"]), dec!(1450000));

    // A bad code surfaces a message instead of failing the quote.
    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders/calculate-price",
            Some(json!({
                "vehicle_id": vehicle.id,
                "start_date": start,
                "end_date": end,
                "promotion_code": "EXPIRED99",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(decimal(&body["data"]["discount_amount"]), dec!(0));
    assert!(body["data"]["promotion_message"].is_string());

    // end < start is a hard validation failure.
    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders/calculate-price",
            Some(json!({
                "vehicle_id": vehicle.id,
                "start_date": end,
                "end_date": start,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn confirming_an_order_consumes_one_usage_slot() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("70B-20002", dec!(500000)).await;

    let now = Utc::now();
    let promo = create_promotion(
        &app,
        json!({
            "code": "ONCE",
            "promotion_type": "FixedAmount",
            "value": "100000",
            "start_date": now - Duration::days(1),
            "end_date": now + Duration::days(30),
            "usage_limit": 1,
        }),
    )
    .await;
    let promo_id = promo["id"].as_str().unwrap().to_string();

    let start = now.date_naive();
    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "vehicle_id": vehicle.id,
                "start_date": start,
                "end_date": start + Duration::days(1),
                "pickup_location": "Depot",
                "return_location": "Depot",
                "promotion_code": "ONCE",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let order = &body["data"];
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(decimal(&order["discount_amount"]), dec!(100000));
    assert_eq!(decimal(&order["total_amount"]), dec!(900000));

    // Draft creation does not consume usage yet.
    let response = app
        .request(Method::GET, &format!("/api/v1/promotions/{}", promo_id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["used_count"], 0);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rental-orders/{}/confirm", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, &format!("/api/v1/promotions/{}", promo_id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["used_count"], 1);

    // The limit is now exhausted for future validations.
    let response = app
        .request(
            Method::POST,
            "/api/v1/promotions/validate",
            Some(json!({ "promotion_code": "ONCE", "sub_total": "1000000" })),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["is_valid"], false);
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("usage limit"));
}

#[tokio::test]
async fn duplicate_promotion_code_is_rejected() {
    let app = TestApp::new().await;
    create_promotion(&app, ten_percent_capped("DUP10")).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/promotions",
            Some(ten_percent_capped("DUP10")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}
