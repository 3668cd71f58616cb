use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        rental_order::RentalOrderStatus,
        rental_status_history,
        vehicle::VehicleStatus,
        vehicle_history::{self, HistoryRef, VehicleAction},
    },
    errors::ServiceError,
};

/// Append one rental-order transition row. Runs on the caller's transaction
/// so a rolled-back transition leaves no trace.
pub async fn record_order_transition<C: ConnectionTrait>(
    conn: &C,
    rental_order_id: Uuid,
    old_status: Option<RentalOrderStatus>,
    new_status: RentalOrderStatus,
    changed_by: Option<Uuid>,
    notes: Option<String>,
) -> Result<(), ServiceError> {
    let row = rental_status_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        rental_order_id: Set(rental_order_id),
        old_status: Set(old_status),
        new_status: Set(new_status),
        changed_at: Set(Utc::now()),
        changed_by: Set(changed_by),
        notes: Set(notes),
    };
    row.insert(conn).await?;
    Ok(())
}

/// Append one vehicle audit row with an optional typed back-reference.
#[allow(clippy::too_many_arguments)]
pub async fn record_vehicle_action<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
    action: VehicleAction,
    old_status: Option<VehicleStatus>,
    new_status: Option<VehicleStatus>,
    reference: Option<HistoryRef>,
    description: Option<String>,
    changed_by: Option<Uuid>,
) -> Result<(), ServiceError> {
    let (reference_type, reference_id) = match reference {
        Some(r) => {
            let (kind, id) = r.into_columns();
            (Some(kind), Some(id))
        }
        None => (None, None),
    };

    let row = vehicle_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle_id),
        action: Set(action),
        old_status: Set(old_status),
        new_status: Set(new_status),
        reference_type: Set(reference_type),
        reference_id: Set(reference_id),
        description: Set(description),
        changed_by: Set(changed_by),
        created_at: Set(Utc::now()),
    };
    row.insert(conn).await?;
    Ok(())
}

/// Read side of the audit trail.
#[derive(Clone)]
pub struct HistoryService {
    db: Arc<DbPool>,
}

impl HistoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn order_history(
        &self,
        rental_order_id: Uuid,
    ) -> Result<Vec<rental_status_history::Model>, ServiceError> {
        let rows = rental_status_history::Entity::find()
            .filter(rental_status_history::Column::RentalOrderId.eq(rental_order_id))
            .order_by_asc(rental_status_history::Column::ChangedAt)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }

    pub async fn vehicle_history(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<vehicle_history::Model>, ServiceError> {
        let rows = vehicle_history::Entity::find()
            .filter(vehicle_history::Column::VehicleId.eq(vehicle_id))
            .order_by_asc(vehicle_history::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }
}
