use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{rental_order::RentalOrderStatus, rental_status_history},
    handlers::actor::Actor,
    services::{
        pricing::PriceQuote,
        rental_orders::{
            CancelRentalRequest, CompleteRentalRequest, CreateRentalOrderRequest,
            UpdateRentalOrderRequest,
        },
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

use crate::entities::rental_order::Model as RentalOrder;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculatePriceRequest {
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub promotion_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default = "ListQuery::first_page")]
    pub page: u64,
    #[serde(default = "ListQuery::default_limit")]
    pub limit: u64,
    pub status: Option<RentalOrderStatus>,
}

#[utoipa::path(
    post, path = "/api/v1/rental-orders",
    request_body = CreateRentalOrderRequest,
    responses((status = 200, description = "Order created")),
    tag = "rental-orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(request): Json<CreateRentalOrderRequest>,
) -> ApiResult<RentalOrder> {
    let order = state
        .services
        .rental_orders
        .create_order(request, actor)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Rental order created",
    )))
}

#[utoipa::path(
    get, path = "/api/v1/rental-orders",
    responses((status = 200, description = "Paginated rental orders")),
    tag = "rental-orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<RentalOrder>> {
    let (page, limit) = (query.page.max(1), query.limit.clamp(1, 100));
    let (items, total) = state
        .services
        .rental_orders
        .list_orders(page, limit, query.status)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

#[utoipa::path(
    get, path = "/api/v1/rental-orders/{id}",
    responses((status = 200), (status = 404, description = "Order not found")),
    tag = "rental-orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RentalOrder> {
    let order = state.services.rental_orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    put, path = "/api/v1/rental-orders/{id}",
    request_body = UpdateRentalOrderRequest,
    responses((status = 200), (status = 400, description = "Order is not Draft")),
    tag = "rental-orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Json(request): Json<UpdateRentalOrderRequest>,
) -> ApiResult<RentalOrder> {
    let order = state
        .services
        .rental_orders
        .update_order(id, request, actor)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    delete, path = "/api/v1/rental-orders/{id}",
    responses((status = 200), (status = 400, description = "Order is not deletable")),
    tag = "rental-orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
) -> ApiResult<()> {
    state.services.rental_orders.delete_order(id, actor).await?;
    Ok(Json(ApiResponse::message_only("Rental order deleted")))
}

#[utoipa::path(
    post, path = "/api/v1/rental-orders/{id}/confirm",
    responses((status = 200), (status = 400, description = "Wrong state or vehicle unavailable")),
    tag = "rental-orders"
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
) -> ApiResult<RentalOrder> {
    let order = state.services.rental_orders.confirm_order(id, actor).await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Rental order confirmed",
    )))
}

#[utoipa::path(
    post, path = "/api/v1/rental-orders/{id}/start",
    responses((status = 200), (status = 400, description = "Order is not Confirmed")),
    tag = "rental-orders"
)]
pub async fn start_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
) -> ApiResult<RentalOrder> {
    let order = state.services.rental_orders.start_rental(id, actor).await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Rental started",
    )))
}

#[utoipa::path(
    post, path = "/api/v1/rental-orders/{id}/complete",
    request_body = CompleteRentalRequest,
    responses((status = 200), (status = 400, description = "Order is not InProgress")),
    tag = "rental-orders"
)]
pub async fn complete_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Json(request): Json<CompleteRentalRequest>,
) -> ApiResult<RentalOrder> {
    let order = state
        .services
        .rental_orders
        .complete_rental(id, request, actor)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Rental completed",
    )))
}

#[utoipa::path(
    post, path = "/api/v1/rental-orders/{id}/cancel",
    request_body = CancelRentalRequest,
    responses((status = 200), (status = 400, description = "Order is terminal")),
    tag = "rental-orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Json(request): Json<CancelRentalRequest>,
) -> ApiResult<RentalOrder> {
    let order = state
        .services
        .rental_orders
        .cancel_order(id, request, actor)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Rental order cancelled",
    )))
}

#[utoipa::path(
    get, path = "/api/v1/rental-orders/{id}/history",
    responses((status = 200, description = "Status transitions, oldest first")),
    tag = "rental-orders"
)]
pub async fn order_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<rental_status_history::Model>> {
    // 404 for unknown orders rather than an empty history.
    state.services.rental_orders.get_order(id).await?;
    let rows = state.services.history.order_history(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    post, path = "/api/v1/rental-orders/calculate-price",
    request_body = CalculatePriceRequest,
    responses((status = 200, description = "Price breakdown")),
    tag = "rental-orders"
)]
pub async fn calculate_price(
    State(state): State<AppState>,
    Json(request): Json<CalculatePriceRequest>,
) -> ApiResult<PriceQuote> {
    let quote = state
        .services
        .pricing
        .calculate_price(
            request.vehicle_id,
            request.start_date,
            request.end_date,
            request.promotion_code.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(quote)))
}
