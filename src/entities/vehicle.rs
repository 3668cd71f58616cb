use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "Available")]
    Available,
    #[sea_orm(string_value = "Rented")]
    Rented,
    #[sea_orm(string_value = "Maintenance")]
    Maintenance,
    #[sea_orm(string_value = "Repair")]
    Repair,
    #[sea_orm(string_value = "OutOfService")]
    OutOfService,
    #[sea_orm(string_value = "InTransit")]
    InTransit,
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Available => "Available",
            Self::Rented => "Rented",
            Self::Maintenance => "Maintenance",
            Self::Repair => "Repair",
            Self::OutOfService => "OutOfService",
            Self::InTransit => "InTransit",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub plate_number: String,
    pub model_name: String,
    pub daily_rate: Decimal,

    pub status: VehicleStatus,
    pub current_location: Option<String>,

    /// Optimistic-concurrency version; every write filters on the version it
    /// read so racing writers surface as a Conflict instead of lost updates.
    pub version: i32,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rental_order::Entity")]
    RentalOrders,
    #[sea_orm(has_many = "super::vehicle_history::Entity")]
    History,
}

impl Related<super::rental_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RentalOrders.def()
    }
}

impl Related<super::vehicle_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
