//! SeaORM Entity for block_checkpoints table
//! One row per stream, overwritten at the end of each productive run

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "block_checkpoints")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub partition_key: String,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub row_key: String,
    pub block_number: i64,
    /// Copy of the last event recorded by the run that wrote this row
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub last_event: Option<Json>,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
