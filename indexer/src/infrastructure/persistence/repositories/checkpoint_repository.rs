use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::domain::models::{BlockCheckpoint, StreamKey};
use crate::domain::ports::CheckpointStore;
use crate::infrastructure::persistence::entities::block_checkpoints;
use crate::infrastructure::persistence::error::DbError;

/// Repository for stream checkpoints
#[derive(Clone)]
pub struct CheckpointRepository {
    conn: DatabaseConnection,
}

impl CheckpointRepository {
    /// Create a new CheckpointRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CheckpointStore for CheckpointRepository {
    async fn read_checkpoint(&self, key: &StreamKey) -> Result<Option<BlockCheckpoint>, DbError> {
        let row = block_checkpoints::Entity::find_by_id((
            key.partition_key.clone(),
            key.row_key.clone(),
        ))
        .one(&self.conn)
        .await?;

        row.map(to_checkpoint).transpose()
    }

    async fn write_checkpoint(
        &self,
        key: &StreamKey,
        checkpoint: &BlockCheckpoint,
    ) -> Result<(), DbError> {
        use block_checkpoints::Column;

        let last_event = checkpoint
            .last_event
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row = block_checkpoints::ActiveModel {
            partition_key: Set(key.partition_key.clone()),
            row_key: Set(key.row_key.clone()),
            block_number: Set(checkpoint.block_number as i64),
            last_event: Set(last_event),
            updated_at: Set(Utc::now().into()),
        };

        // Full replace of the row, unless it already records a later block
        block_checkpoints::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([Column::PartitionKey, Column::RowKey])
                    .update_columns([Column::BlockNumber, Column::LastEvent, Column::UpdatedAt])
                    .action_and_where(
                        Expr::col((block_checkpoints::Entity, Column::BlockNumber))
                            .lte(Expr::cust("EXCLUDED.block_number")),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}

fn to_checkpoint(row: block_checkpoints::Model) -> Result<BlockCheckpoint, DbError> {
    Ok(BlockCheckpoint {
        block_number: row.block_number.max(0) as u64,
        last_event: row.last_event.map(serde_json::from_value).transpose()?,
    })
}
