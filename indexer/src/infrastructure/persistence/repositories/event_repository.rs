use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::domain::models::DecodedEvent;
use crate::domain::ports::EventStore;
use crate::infrastructure::persistence::entities::decoded_events;
use crate::infrastructure::persistence::error::DbError;

/// Repository for decoded chain events
#[derive(Clone)]
pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    /// Create a new EventRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    async fn write_event(&self, event: &DecodedEvent) -> Result<(), DbError> {
        use decoded_events::Column;

        let row = decoded_events::ActiveModel {
            partition_key: Set(event.partition_key.clone()),
            row_key: Set(event.row_key.clone()),
            block_number: Set(event.block_number as i64),
            block_hash: Set(event.block_hash.clone()),
            transaction_hash: Set(event.transaction_hash.clone()),
            transaction_index: Set(event.transaction_index as i64),
            log_index: Set(event.log_index as i64),
            e_address: Set(event.address.clone()),
            e_data: Set(event.data.clone()),
            topics: Set(serde_json::to_value(&event.topics)?),
            args: Set(serde_json::to_value(&event.args)?),
            e_signature: Set(event.signature.clone()),
            e_name: Set(event.name.clone()),
            e_topic: Set(event.topic.clone()),
            e_timestamp: Set(event.decoded_at.into()),
        };

        // Re-processing a range overwrites rows with the same key
        decoded_events::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([Column::PartitionKey, Column::RowKey])
                    .update_columns([
                        Column::BlockNumber,
                        Column::BlockHash,
                        Column::TransactionHash,
                        Column::TransactionIndex,
                        Column::LogIndex,
                        Column::EAddress,
                        Column::EData,
                        Column::Topics,
                        Column::Args,
                        Column::ESignature,
                        Column::EName,
                        Column::ETopic,
                        Column::ETimestamp,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    async fn recent_events(
        &self,
        partition_key: &str,
        limit: u64,
    ) -> Result<Vec<DecodedEvent>, DbError> {
        let rows = decoded_events::Entity::find()
            .filter(decoded_events::Column::PartitionKey.eq(partition_key))
            .order_by_desc(decoded_events::Column::BlockNumber)
            .order_by_desc(decoded_events::Column::LogIndex)
            .limit(limit)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(to_event).collect()
    }
}

fn to_event(row: decoded_events::Model) -> Result<DecodedEvent, DbError> {
    Ok(DecodedEvent {
        partition_key: row.partition_key,
        row_key: row.row_key,
        block_number: row.block_number.max(0) as u64,
        block_hash: row.block_hash,
        transaction_hash: row.transaction_hash,
        transaction_index: row.transaction_index.max(0) as u64,
        log_index: row.log_index.max(0) as u64,
        address: row.e_address,
        data: row.e_data,
        topics: serde_json::from_value(row.topics)?,
        args: serde_json::from_value(row.args)?,
        signature: row.e_signature,
        name: row.e_name,
        topic: row.e_topic,
        decoded_at: row.e_timestamp.into(),
    })
}
