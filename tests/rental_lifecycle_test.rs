//! End-to-end rental lifecycle: create → confirm → start → complete →
//! invoice → pay, with vehicle side effects and history rows along the way.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn full_lifecycle_from_draft_to_paid_invoice() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("51A-12345", dec!(500000)).await;

    let start = Utc::now().date_naive();
    let end = start + Duration::days(2);

    // Create as Draft: 3 inclusive days at 500,000/day.
    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "vehicle_id": vehicle.id,
                "start_date": start,
                "end_date": end,
                "pickup_location": "Airport",
                "return_location": "Downtown",
                "deposit_amount": "1000000",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let order = &body["data"];
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["status"], "Draft");
    assert_eq!(order["total_days"], 3);
    assert_eq!(decimal(&order["subtotal"]), dec!(1500000));
    assert_eq!(decimal(&order["total_amount"]), dec!(1500000));
    assert!(order["order_number"].as_str().unwrap().starts_with("RO"));

    // Confirm.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rental-orders/{}/confirm", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Confirmed");

    // Start: vehicle becomes Rented at the pickup location.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rental-orders/{}/start", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "InProgress");
    assert!(body["data"]["actual_start_date"].is_string());

    let response = app
        .request(Method::GET, &format!("/api/v1/vehicles/{}", vehicle.id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Rented");
    assert_eq!(body["data"]["current_location"], "Airport");

    // Complete: vehicle released at the return location.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rental-orders/{}/complete", order_id),
            Some(json!({})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Completed");

    let response = app
        .request(Method::GET, &format!("/api/v1/vehicles/{}", vehicle.id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Available");
    assert_eq!(body["data"]["current_location"], "Downtown");

    // Invoice at 10% tax: 1,500,000 + 150,000 = 1,650,000.
    let due = start + Duration::days(30);
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/invoices/from-rental/{}", order_id),
            Some(json!({ "tax_rate": "10", "due_date": due })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let invoice = &body["data"];
    let invoice_id = invoice["id"].as_str().unwrap().to_string();
    assert_eq!(decimal(&invoice["sub_total"]), dec!(1500000));
    assert_eq!(decimal(&invoice["tax_amount"]), dec!(150000));
    assert_eq!(decimal(&invoice["total_amount"]), dec!(1650000));
    assert_eq!(invoice["status"], "Unpaid");
    assert!(invoice["invoice_number"].as_str().unwrap().starts_with("HD"));

    // The order is now terminal.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/rental-orders/{}", order_id),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Invoiced");

    // Pay in full.
    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "invoice_id": invoice_id,
                "amount": "1650000",
                "payment_date": start,
                "method": "Cash",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["data"]["payment_number"]
        .as_str()
        .unwrap()
        .starts_with("PT"));

    let response = app
        .request(Method::GET, &format!("/api/v1/invoices/{}", invoice_id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Paid");
    assert_eq!(decimal(&body["data"]["remaining_amount"]), dec!(0));

    // Every transition appended one history row: Draft, Confirmed,
    // InProgress, Completed, Invoiced.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/rental-orders/{}/history", order_id),
            None,
        )
        .await;
    let body = response_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows[0]["old_status"].is_null());
    assert_eq!(rows[0]["new_status"], "Draft");
    assert_eq!(rows[4]["old_status"], "Completed");
    assert_eq!(rows[4]["new_status"], "Invoiced");
}

#[tokio::test]
async fn start_requires_confirmed_order() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("51B-00001", dec!(400000)).await;

    let start = Utc::now().date_naive();
    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "vehicle_id": vehicle.id,
                "start_date": start,
                "end_date": start,
                "pickup_location": "Depot",
                "return_location": "Depot",
            })),
        )
        .await;
    let body = response_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rental-orders/{}/start", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Draft"));
}

#[tokio::test]
async fn create_confirmed_claims_vehicle_and_rejects_unavailable() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("51C-00002", dec!(300000)).await;

    let start = Utc::now().date_naive();
    let payload = json!({
        "customer_id": Uuid::new_v4(),
        "vehicle_id": vehicle.id,
        "start_date": start,
        "end_date": start,
        "pickup_location": "Depot",
        "return_location": "Depot",
        "status": "Confirmed",
    });

    let response = app
        .request(Method::POST, "/api/v1/rental-orders", Some(payload.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, &format!("/api/v1/vehicles/{}", vehicle.id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Rented");

    // Vehicle is no longer Available, so a second confirmed create fails.
    let response = app
        .request(Method::POST, "/api/v1/rental-orders", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Rented"));
}

#[tokio::test]
async fn cancel_frees_vehicle_and_terminal_states_reject_cancel() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("51D-00003", dec!(350000)).await;

    let start = Utc::now().date_naive();
    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "vehicle_id": vehicle.id,
                "start_date": start,
                "end_date": start,
                "pickup_location": "Depot",
                "return_location": "Depot",
                "status": "Confirmed",
            })),
        )
        .await;
    let body = response_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rental-orders/{}/cancel", order_id),
            Some(json!({ "reason": "customer no-show" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, &format!("/api/v1/vehicles/{}", vehicle.id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "Available");

    // Cancelling again is rejected.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rental-orders/{}/cancel", order_id),
            Some(json!({})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The cancellation reason lands in the history notes.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/rental-orders/{}/history", order_id),
            None,
        )
        .await;
    let body = response_json(response).await;
    let rows = body["data"].as_array().unwrap();
    let last = rows.last().unwrap();
    assert_eq!(last["new_status"], "Cancelled");
    assert!(last["notes"].as_str().unwrap().contains("customer no-show"));
}

#[tokio::test]
async fn actor_header_is_stamped_on_history_rows() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("51E-00004", dec!(200000)).await;
    let actor = Uuid::new_v4();

    let start = Utc::now().date_naive();
    let response = app
        .request_with_headers(
            Method::POST,
            "/api/v1/rental-orders",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "vehicle_id": vehicle.id,
                "start_date": start,
                "end_date": start,
                "pickup_location": "Depot",
                "return_location": "Depot",
            })),
            &[("x-actor-id", &actor.to_string())],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/rental-orders/{}/history", order_id),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"][0]["changed_by"], actor.to_string());
}

#[tokio::test]
async fn malformed_actor_header_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request_with_headers(
            Method::POST,
            "/api/v1/rental-orders",
            Some(json!({})),
            &[("x-actor-id", "not-a-uuid")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
