use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-day document-number counters, keyed by `(prefix, day)`. The row is
/// read and bumped inside the transaction that inserts the numbered document,
/// so concurrent creators serialize on it instead of racing a max() scan.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub prefix: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub day: Date,
    pub value: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
