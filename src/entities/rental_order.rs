use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle states of a rental order. There are no back-transitions;
/// Invoiced and Cancelled are terminal.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum RentalOrderStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Confirmed")]
    Confirmed,
    #[sea_orm(string_value = "InProgress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Invoiced")]
    Invoiced,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl std::fmt::Display for RentalOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Draft => "Draft",
            Self::Confirmed => "Confirmed",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Invoiced => "Invoiced",
            Self::Cancelled => "Cancelled",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rental_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique document number, `RO{yyyymmdd}{seq:03}`.
    pub order_number: String,

    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub employee_id: Option<Uuid>,

    /// Planned rental window, both endpoints inclusive.
    pub start_date: Date,
    pub end_date: Date,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_end_date: Option<DateTime<Utc>>,

    pub pickup_location: String,
    pub return_location: String,

    pub daily_rate: Decimal,
    pub total_days: i32,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub promotion_code: Option<String>,
    /// Invariant: `total_amount = subtotal - discount_amount`.
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,

    pub status: RentalOrderStatus,
    pub notes: Option<String>,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rental_status_history::Entity")]
    StatusHistory,
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
}

impl Related<super::rental_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
