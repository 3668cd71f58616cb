use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        vehicle::{self, Entity as VehicleEntity, Model as VehicleModel, VehicleStatus},
        vehicle_history::VehicleAction,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::history,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 20, message = "Plate number is required"))]
    pub plate_number: String,
    #[validate(length(min = 1, max = 100, message = "Model name is required"))]
    pub model_name: String,
    pub daily_rate: Decimal,
    pub current_location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangeVehicleStatusRequest {
    pub status: VehicleStatus,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct VehicleService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl VehicleService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(plate = %request.plate_number))]
    pub async fn create_vehicle(
        &self,
        request: CreateVehicleRequest,
        actor_id: Option<Uuid>,
    ) -> Result<VehicleModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if request.daily_rate <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Daily rate must be positive".to_string(),
            ));
        }

        let existing = VehicleEntity::find()
            .filter(vehicle::Column::PlateNumber.eq(request.plate_number.clone()))
            .filter(vehicle::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::BusinessRule(format!(
                "A vehicle with plate number '{}' already exists",
                request.plate_number
            )));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let now = Utc::now();
        let model = vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            plate_number: Set(request.plate_number),
            model_name: Set(request.model_name),
            daily_rate: Set(request.daily_rate),
            status: Set(VehicleStatus::Available),
            current_location: Set(request.current_location),
            version: Set(0),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model.insert(&txn).await?;

        history::record_vehicle_action(
            &txn,
            created.id,
            VehicleAction::Created,
            None,
            Some(VehicleStatus::Available),
            None,
            Some(format!("Vehicle {} registered", created.plate_number)),
            actor_id,
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        Ok(created)
    }

    pub async fn get_vehicle(&self, id: Uuid) -> Result<VehicleModel, ServiceError> {
        VehicleEntity::find_by_id(id)
            .filter(vehicle::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vehicle {} not found", id)))
    }

    pub async fn list_vehicles(
        &self,
        page: u64,
        per_page: u64,
        status: Option<VehicleStatus>,
    ) -> Result<(Vec<VehicleModel>, u64), ServiceError> {
        let mut query = VehicleEntity::find().filter(vehicle::Column::IsDeleted.eq(false));
        if let Some(status) = status {
            query = query.filter(vehicle::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_desc(vehicle::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Manual status change for maintenance and repair workflows. A vehicle
    /// that is currently rented can only be moved by its rental order.
    #[instrument(skip(self, request), fields(vehicle_id = %id, new_status = %request.status))]
    pub async fn change_status(
        &self,
        id: Uuid,
        request: ChangeVehicleStatusRequest,
        actor_id: Option<Uuid>,
    ) -> Result<VehicleModel, ServiceError> {
        let vehicle = self.get_vehicle(id).await?;

        if vehicle.status == request.status {
            return Err(ServiceError::InvalidState(format!(
                "Vehicle is already {}",
                vehicle.status
            )));
        }
        if vehicle.status == VehicleStatus::Rented || request.status == VehicleStatus::Rented {
            return Err(ServiceError::InvalidState(
                "Rented status is managed by the rental order lifecycle".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let old_status = vehicle.status.clone();
        guarded_status_update(
            &txn,
            &vehicle,
            request.status.clone(),
            vehicle.current_location.clone(),
        )
        .await?;

        let action = match (&old_status, &request.status) {
            (_, VehicleStatus::Maintenance) => VehicleAction::Maintenance,
            (_, VehicleStatus::Repair) => VehicleAction::Repair,
            (VehicleStatus::Maintenance, VehicleStatus::Available) => {
                VehicleAction::MaintenanceCompleted
            }
            (VehicleStatus::Repair, VehicleStatus::Available) => VehicleAction::RepairCompleted,
            _ => VehicleAction::StatusChanged,
        };
        history::record_vehicle_action(
            &txn,
            vehicle.id,
            action,
            Some(old_status.clone()),
            Some(request.status.clone()),
            None,
            request.notes,
            actor_id,
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .emit(Event::VehicleStatusChanged {
                vehicle_id: vehicle.id,
                old_status,
                new_status: request.status,
            })
            .await;

        self.get_vehicle(id).await
    }
}

/// Write the vehicle's status guarded by the version the caller read.
/// Zero rows affected means another writer got there first.
pub async fn guarded_status_update<C: ConnectionTrait>(
    conn: &C,
    vehicle: &VehicleModel,
    new_status: VehicleStatus,
    current_location: Option<String>,
) -> Result<(), ServiceError> {
    let result = VehicleEntity::update_many()
        .col_expr(vehicle::Column::Status, Expr::value(new_status))
        .col_expr(vehicle::Column::CurrentLocation, Expr::value(current_location))
        .col_expr(vehicle::Column::Version, Expr::value(vehicle.version + 1))
        .col_expr(vehicle::Column::UpdatedAt, Expr::value(Some(Utc::now())))
        .filter(vehicle::Column::Id.eq(vehicle.id))
        .filter(vehicle::Column::Version.eq(vehicle.version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::Conflict(format!(
            "Vehicle {} was modified concurrently, please retry",
            vehicle.id
        )));
    }
    Ok(())
}
