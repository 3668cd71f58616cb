use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vehicle::VehicleStatus;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum VehicleAction {
    #[sea_orm(string_value = "Created")]
    Created,
    #[sea_orm(string_value = "Rented")]
    Rented,
    #[sea_orm(string_value = "Returned")]
    Returned,
    #[sea_orm(string_value = "StatusChanged")]
    StatusChanged,
    #[sea_orm(string_value = "Maintenance")]
    Maintenance,
    #[sea_orm(string_value = "Repair")]
    Repair,
    #[sea_orm(string_value = "MaintenanceCompleted")]
    MaintenanceCompleted,
    #[sea_orm(string_value = "RepairCompleted")]
    RepairCompleted,
    #[sea_orm(string_value = "RentalCancelled")]
    RentalCancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum HistoryRefType {
    #[sea_orm(string_value = "RentalOrder")]
    RentalOrder,
    #[sea_orm(string_value = "Invoice")]
    Invoice,
    #[sea_orm(string_value = "Maintenance")]
    Maintenance,
}

/// Typed reference back to the record that caused a vehicle history entry.
/// Stored as a type tag plus id pair instead of a bare nullable id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryRef {
    RentalOrder(Uuid),
    Invoice(Uuid),
    Maintenance(Uuid),
}

impl HistoryRef {
    pub fn into_columns(self) -> (HistoryRefType, Uuid) {
        match self {
            Self::RentalOrder(id) => (HistoryRefType::RentalOrder, id),
            Self::Invoice(id) => (HistoryRefType::Invoice, id),
            Self::Maintenance(id) => (HistoryRefType::Maintenance, id),
        }
    }

    pub fn from_columns(kind: Option<HistoryRefType>, id: Option<Uuid>) -> Option<Self> {
        match (kind, id) {
            (Some(HistoryRefType::RentalOrder), Some(id)) => Some(Self::RentalOrder(id)),
            (Some(HistoryRefType::Invoice), Some(id)) => Some(Self::Invoice(id)),
            (Some(HistoryRefType::Maintenance), Some(id)) => Some(Self::Maintenance(id)),
            _ => None,
        }
    }
}

/// Append-only vehicle audit trail.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub vehicle_id: Uuid,
    pub action: VehicleAction,
    pub old_status: Option<VehicleStatus>,
    pub new_status: Option<VehicleStatus>,
    pub reference_type: Option<HistoryRefType>,
    pub reference_id: Option<Uuid>,
    pub description: Option<String>,
    pub changed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn reference(&self) -> Option<HistoryRef> {
        HistoryRef::from_columns(self.reference_type.clone(), self.reference_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
