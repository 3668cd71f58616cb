//! Payment-ledger invariants: `paid + remaining == total` after every
//! create/update/delete, overpayment rejection, duplicate-invoice rejection.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{decimal, response_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

/// Drive an order through the API to Completed and return its id.
async fn completed_order(app: &TestApp, vehicle_id: Uuid) -> String {
    let start = Utc::now().date_naive();
    let response = app
        .request(
            Method::POST,
            "/api/v1/rental-orders",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "vehicle_id": vehicle_id,
                "start_date": start,
                "end_date": start + Duration::days(1),
                "pickup_location": "Depot",
                "return_location": "Depot",
                "status": "Confirmed",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    for step in ["start", "complete"] {
        let response = app
            .request(
                Method::POST,
                &format!("/api/v1/rental-orders/{}/{}", order_id, step),
                Some(json!({})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "step {} failed", step);
    }
    order_id
}

async fn create_invoice(app: &TestApp, order_id: &str) -> Value {
    let due = Utc::now().date_naive() + Duration::days(30);
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/invoices/from-rental/{}", order_id),
            Some(json!({ "tax_rate": "0", "due_date": due })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await["data"].clone()
}

async fn fetch_invoice(app: &TestApp, invoice_id: &str) -> Value {
    let response = app
        .request(Method::GET, &format!("/api/v1/invoices/{}", invoice_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await["data"].clone()
}

fn assert_ledger_invariant(invoice: &Value) {
    let paid = decimal(&invoice["paid_amount"]);
    let remaining = decimal(&invoice["remaining_amount"]);
    let total = decimal(&invoice["total_amount"]);
    assert_eq!(paid + remaining, total, "ledger invariant broken: {invoice}");
    assert!(remaining >= Decimal::ZERO);
}

#[tokio::test]
async fn ledger_invariant_survives_create_update_delete() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("60A-10001", dec!(250000)).await;
    let order_id = completed_order(&app, vehicle.id).await;

    // 2 days × 250,000 at 0% tax.
    let invoice = create_invoice(&app, &order_id).await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();
    assert_eq!(decimal(&invoice["total_amount"]), dec!(500000));
    assert_ledger_invariant(&invoice);

    // Partial payment.
    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "invoice_id": invoice_id,
                "amount": "300000",
                "payment_date": Utc::now().date_naive(),
                "method": "BankTransfer",
                "bank_account": "0123456789",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payment_id = response_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let invoice = fetch_invoice(&app, &invoice_id).await;
    assert_eq!(invoice["status"], "Partial");
    assert_eq!(decimal(&invoice["paid_amount"]), dec!(300000));
    assert_ledger_invariant(&invoice);

    // Lower the payment amount: the delta flows back to remaining.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/payments/{}", payment_id),
            Some(json!({ "amount": "100000" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let invoice = fetch_invoice(&app, &invoice_id).await;
    assert_eq!(decimal(&invoice["paid_amount"]), dec!(100000));
    assert_eq!(decimal(&invoice["remaining_amount"]), dec!(400000));
    assert_ledger_invariant(&invoice);

    // Delete reverses the payment entirely.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/payments/{}", payment_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let invoice = fetch_invoice(&app, &invoice_id).await;
    assert_eq!(invoice["status"], "Unpaid");
    assert_eq!(decimal(&invoice["paid_amount"]), dec!(0));
    assert_ledger_invariant(&invoice);
}

#[tokio::test]
async fn overpayment_is_rejected_with_remaining_balance() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("60B-10002", dec!(100000)).await;
    let order_id = completed_order(&app, vehicle.id).await;

    let invoice = create_invoice(&app, &order_id).await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();
    assert_eq!(decimal(&invoice["total_amount"]), dec!(200000));

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "invoice_id": invoice_id,
                "amount": "300000",
                "payment_date": Utc::now().date_naive(),
                "method": "Cash",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("300000"), "message: {message}");
    assert!(message.contains("200000"), "message: {message}");
}

#[tokio::test]
async fn second_invoice_for_same_order_is_rejected() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("60C-10003", dec!(150000)).await;
    let order_id = completed_order(&app, vehicle.id).await;

    create_invoice(&app, &order_id).await;

    let due = Utc::now().date_naive() + Duration::days(30);
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/invoices/from-rental/{}", order_id),
            Some(json!({ "tax_rate": "0", "due_date": due })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("already"));
}

#[tokio::test]
async fn invoice_requires_completed_order() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("60D-10004", dec!(150000)).await;

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

    let due = start + Duration::days(30);
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/invoices/from-rental/{}", order_id),
            Some(json!({ "tax_rate": "10", "due_date": due })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Draft"));
}

#[tokio::test]
async fn fully_paid_invoice_rejects_further_payments_and_updates() {
    let app = TestApp::new().await;
    let vehicle = app.seed_vehicle("60E-10005", dec!(100000)).await;
    let order_id = completed_order(&app, vehicle.id).await;

    let invoice = create_invoice(&app, &order_id).await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "invoice_id": invoice_id,
                "amount": "200000",
                "payment_date": Utc::now().date_naive(),
                "method": "Card",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let invoice = fetch_invoice(&app, &invoice_id).await;
    assert_eq!(invoice["status"], "Paid");

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "invoice_id": invoice_id,
                "amount": "1",
                "payment_date": Utc::now().date_naive(),
                "method": "Cash",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/invoices/{}", invoice_id),
            Some(json!({ "tax_rate": "5" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
