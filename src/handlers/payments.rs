use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    entities::payment::Model as Payment,
    services::payments::{CreatePaymentRequest, UpdatePaymentRequest},
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    post, path = "/api/v1/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Payment recorded"),
        (status = 400, description = "Amount exceeds remaining balance or invoice closed")
    ),
    tag = "payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> ApiResult<Payment> {
    let payment = state.services.payments.create_payment(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        payment,
        "Payment recorded",
    )))
}

#[utoipa::path(
    get, path = "/api/v1/payments/{id}",
    responses((status = 200), (status = 404, description = "Payment not found")),
    tag = "payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Payment> {
    let payment = state.services.payments.get_payment(id).await?;
    Ok(Json(ApiResponse::success(payment)))
}

#[utoipa::path(
    put, path = "/api/v1/payments/{id}",
    request_body = UpdatePaymentRequest,
    responses((status = 200), (status = 400, description = "Delta exceeds remaining balance")),
    tag = "payments"
)]
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> ApiResult<Payment> {
    let payment = state.services.payments.update_payment(id, request).await?;
    Ok(Json(ApiResponse::success(payment)))
}

#[utoipa::path(
    delete, path = "/api/v1/payments/{id}",
    responses((status = 200, description = "Payment reversed")),
    tag = "payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.payments.delete_payment(id).await?;
    Ok(Json(ApiResponse::message_only("Payment deleted")))
}

#[utoipa::path(
    get, path = "/api/v1/invoices/{id}/payments",
    responses((status = 200, description = "Payments for the invoice, oldest first")),
    tag = "payments"
)]
pub async fn list_invoice_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Payment>> {
    // 404 for unknown invoices rather than an empty list.
    state.services.invoices.get_invoice(id).await?;
    let payments = state.services.payments.list_for_invoice(id).await?;
    Ok(Json(ApiResponse::success(payments)))
}
