use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::promotion::Model as Promotion,
    services::promotions::{CreatePromotionRequest, PromotionValidation},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidatePromotionRequest {
    pub promotion_code: String,
    pub sub_total: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PromotionListQuery {
    #[serde(default = "ListQuery::first_page")]
    pub page: u64,
    #[serde(default = "ListQuery::default_limit")]
    pub limit: u64,
}

#[utoipa::path(
    post, path = "/api/v1/promotions",
    request_body = CreatePromotionRequest,
    responses((status = 200), (status = 400, description = "Duplicate code or invalid window")),
    tag = "promotions"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    Json(request): Json<CreatePromotionRequest>,
) -> ApiResult<Promotion> {
    let promotion = state.services.promotions.create_promotion(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        promotion,
        "Promotion created",
    )))
}

#[utoipa::path(
    get, path = "/api/v1/promotions",
    responses((status = 200, description = "Paginated promotions")),
    tag = "promotions"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
    Query(query): Query<PromotionListQuery>,
) -> ApiResult<PaginatedResponse<Promotion>> {
    let (page, limit) = (query.page.max(1), query.limit.clamp(1, 100));
    let (items, total) = state
        .services
        .promotions
        .list_promotions(page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

#[utoipa::path(
    get, path = "/api/v1/promotions/{id}",
    responses((status = 200), (status = 404, description = "Promotion not found")),
    tag = "promotions"
)]
pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Promotion> {
    let promotion = state.services.promotions.get_promotion(id).await?;
    Ok(Json(ApiResponse::success(promotion)))
}

/// An inapplicable code is a successful validation with `is_valid = false`,
/// not an HTTP error.
#[utoipa::path(
    post, path = "/api/v1/promotions/validate",
    request_body = ValidatePromotionRequest,
    responses((status = 200, description = "Validation outcome with discount amount")),
    tag = "promotions"
)]
pub async fn validate_promotion(
    State(state): State<AppState>,
    Json(request): Json<ValidatePromotionRequest>,
) -> ApiResult<PromotionValidation> {
    let validation = state
        .services
        .promotions
        .validate(
            &request.promotion_code,
            request.sub_total,
            request.start_date,
            request.end_date,
        )
        .await?;
    Ok(Json(ApiResponse::success(validation)))
}
