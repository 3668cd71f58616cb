pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::db::DbPool;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

/// Common query parameters for list endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "ListQuery::first_page")]
    pub page: u64,
    #[serde(default = "ListQuery::default_limit")]
    pub limit: u64,
}

impl ListQuery {
    pub fn first_page() -> u64 {
        1
    }

    pub fn default_limit() -> u64 {
        20
    }

    /// Clamp the page size to something the database is happy with.
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, 100)
    }

    pub fn page(&self) -> u64 {
        self.page.max(1)
    }
}

/// Standard `{success, data, message}` envelope.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            errors: None,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Standard API result type for JSON responses.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Rental orders
        .route(
            "/rental-orders",
            post(handlers::rental_orders::create_order).get(handlers::rental_orders::list_orders),
        )
        .route(
            "/rental-orders/calculate-price",
            post(handlers::rental_orders::calculate_price),
        )
        .route(
            "/rental-orders/:id",
            get(handlers::rental_orders::get_order)
                .put(handlers::rental_orders::update_order)
                .delete(handlers::rental_orders::delete_order),
        )
        .route(
            "/rental-orders/:id/confirm",
            post(handlers::rental_orders::confirm_order),
        )
        .route(
            "/rental-orders/:id/start",
            post(handlers::rental_orders::start_rental),
        )
        .route(
            "/rental-orders/:id/complete",
            post(handlers::rental_orders::complete_rental),
        )
        .route(
            "/rental-orders/:id/cancel",
            post(handlers::rental_orders::cancel_order),
        )
        .route(
            "/rental-orders/:id/history",
            get(handlers::rental_orders::order_history),
        )
        // Invoices
        .route(
            "/invoices/from-rental/:rental_order_id",
            post(handlers::invoices::create_from_rental),
        )
        .route("/invoices", get(handlers::invoices::list_invoices))
        .route(
            "/invoices/:id",
            get(handlers::invoices::get_invoice).put(handlers::invoices::update_invoice),
        )
        .route(
            "/invoices/:id/payments",
            get(handlers::payments::list_invoice_payments),
        )
        // Payments
        .route("/payments", post(handlers::payments::create_payment))
        .route(
            "/payments/:id",
            get(handlers::payments::get_payment)
                .put(handlers::payments::update_payment)
                .delete(handlers::payments::delete_payment),
        )
        // Promotions
        .route(
            "/promotions",
            post(handlers::promotions::create_promotion)
                .get(handlers::promotions::list_promotions),
        )
        .route(
            "/promotions/validate",
            post(handlers::promotions::validate_promotion),
        )
        .route("/promotions/:id", get(handlers::promotions::get_promotion))
        // Vehicles
        .route(
            "/vehicles",
            post(handlers::vehicles::create_vehicle).get(handlers::vehicles::list_vehicles),
        )
        .route("/vehicles/:id", get(handlers::vehicles::get_vehicle))
        .route(
            "/vehicles/:id/status",
            put(handlers::vehicles::change_vehicle_status),
        )
        .route(
            "/vehicles/:id/history",
            get(handlers::vehicles::vehicle_history),
        )
        // Service meta
        .route("/status", get(api_status))
        .route("/health", get(health_check))
}

async fn api_status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "rental-api",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
    }))
}
