//! SeaORM Entity for decoded_events table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "decoded_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub partition_key: String,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub row_key: String,
    pub block_number: i64,
    #[sea_orm(column_type = "Text")]
    pub block_hash: String,
    #[sea_orm(column_type = "Text")]
    pub transaction_hash: String,
    pub transaction_index: i64,
    pub log_index: i64,
    #[sea_orm(column_type = "Text")]
    pub e_address: String,
    #[sea_orm(column_type = "Text")]
    pub e_data: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub topics: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub args: Json,
    #[sea_orm(column_type = "Text")]
    pub e_signature: String,
    #[sea_orm(column_type = "Text")]
    pub e_name: String,
    #[sea_orm(column_type = "Text")]
    pub e_topic: String,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub e_timestamp: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
