use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    entities::{
        vehicle::{Model as Vehicle, VehicleStatus},
        vehicle_history,
    },
    handlers::actor::Actor,
    services::vehicles::{ChangeVehicleStatusRequest, CreateVehicleRequest},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize)]
pub struct VehicleListQuery {
    #[serde(default = "ListQuery::first_page")]
    pub page: u64,
    #[serde(default = "ListQuery::default_limit")]
    pub limit: u64,
    pub status: Option<VehicleStatus>,
}

#[utoipa::path(
    post, path = "/api/v1/vehicles",
    request_body = CreateVehicleRequest,
    responses((status = 200), (status = 400, description = "Duplicate plate number")),
    tag = "vehicles"
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(request): Json<CreateVehicleRequest>,
) -> ApiResult<Vehicle> {
    let vehicle = state
        .services
        .vehicles
        .create_vehicle(request, actor)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle,
        "Vehicle registered",
    )))
}

#[utoipa::path(
    get, path = "/api/v1/vehicles",
    responses((status = 200, description = "Paginated vehicles")),
    tag = "vehicles"
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> ApiResult<PaginatedResponse<Vehicle>> {
    let (page, limit) = (query.page.max(1), query.limit.clamp(1, 100));
    let (items, total) = state
        .services
        .vehicles
        .list_vehicles(page, limit, query.status)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

#[utoipa::path(
    get, path = "/api/v1/vehicles/{id}",
    responses((status = 200), (status = 404, description = "Vehicle not found")),
    tag = "vehicles"
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vehicle> {
    let vehicle = state.services.vehicles.get_vehicle(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

#[utoipa::path(
    put, path = "/api/v1/vehicles/{id}/status",
    request_body = ChangeVehicleStatusRequest,
    responses((status = 200), (status = 400, description = "Transition not allowed")),
    tag = "vehicles"
)]
pub async fn change_vehicle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Json(request): Json<ChangeVehicleStatusRequest>,
) -> ApiResult<Vehicle> {
    let vehicle = state
        .services
        .vehicles
        .change_status(id, request, actor)
        .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

#[utoipa::path(
    get, path = "/api/v1/vehicles/{id}/history",
    responses((status = 200, description = "Audit rows, oldest first")),
    tag = "vehicles"
)]
pub async fn vehicle_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<vehicle_history::Model>> {
    state.services.vehicles.get_vehicle(id).await?;
    let rows = state.services.history.vehicle_history(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
