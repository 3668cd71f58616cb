use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    entities::invoice::{InvoiceStatus, Model as Invoice},
    handlers::actor::Actor,
    services::invoicing::{CreateInvoiceRequest, UpdateInvoiceRequest},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    #[serde(default = "ListQuery::first_page")]
    pub page: u64,
    #[serde(default = "ListQuery::default_limit")]
    pub limit: u64,
    pub status: Option<InvoiceStatus>,
}

#[utoipa::path(
    post, path = "/api/v1/invoices/from-rental/{rental_order_id}",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice created, order now Invoiced"),
        (status = 400, description = "Order not Completed or already invoiced")
    ),
    tag = "invoices"
)]
pub async fn create_from_rental(
    State(state): State<AppState>,
    Path(rental_order_id): Path<Uuid>,
    Actor(actor): Actor,
    Json(request): Json<CreateInvoiceRequest>,
) -> ApiResult<Invoice> {
    let invoice = state
        .services
        .invoices
        .create_from_rental(rental_order_id, request, actor)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        invoice,
        "Invoice created",
    )))
}

#[utoipa::path(
    get, path = "/api/v1/invoices",
    responses((status = 200, description = "Paginated invoices")),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> ApiResult<PaginatedResponse<Invoice>> {
    let (page, limit) = (query.page.max(1), query.limit.clamp(1, 100));
    let (items, total) = state
        .services
        .invoices
        .list_invoices(page, limit, query.status)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

#[utoipa::path(
    get, path = "/api/v1/invoices/{id}",
    responses((status = 200), (status = 404, description = "Invoice not found")),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Invoice> {
    let invoice = state.services.invoices.get_invoice(id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    put, path = "/api/v1/invoices/{id}",
    request_body = UpdateInvoiceRequest,
    responses((status = 200), (status = 400, description = "Invoice is Paid or Cancelled")),
    tag = "invoices"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceRequest>,
) -> ApiResult<Invoice> {
    let invoice = state.services.invoices.update_invoice(id, request).await?;
    Ok(Json(ApiResponse::success(invoice)))
}
