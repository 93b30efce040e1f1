use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::time::Duration;

use crate::domain::ports::StreamLease;
use crate::infrastructure::persistence::entities::stream_leases;
use crate::infrastructure::persistence::error::DbError;

/// Repository for per-stream leases
#[derive(Clone)]
pub struct LeaseRepository {
    conn: DatabaseConnection,
}

impl LeaseRepository {
    /// Create a new LeaseRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl StreamLease for LeaseRepository {
    async fn try_acquire(&self, stream: &str, holder: &str, ttl: Duration) -> Result<bool, DbError> {
        use stream_leases::Column;

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| DbError::SerializationError(e.to_string()))?;
        let expires_at = now + ttl;

        // Take over an expired lease, or extend our own
        let updated = stream_leases::Entity::update_many()
            .col_expr(Column::Holder, Expr::value(holder.to_string()))
            .col_expr(Column::AcquiredAt, Expr::value(now))
            .col_expr(Column::ExpiresAt, Expr::value(expires_at))
            .filter(Column::Stream.eq(stream))
            .filter(
                Condition::any()
                    .add(Column::ExpiresAt.lt(now))
                    .add(Column::Holder.eq(holder)),
            )
            .exec(&self.conn)
            .await?;

        if updated.rows_affected > 0 {
            return Ok(true);
        }

        // No row yet: the insert races with other workers, first one wins
        let lease = stream_leases::ActiveModel {
            stream: Set(stream.to_string()),
            holder: Set(holder.to_string()),
            acquired_at: Set(now.into()),
            expires_at: Set(expires_at.into()),
        };

        let inserted = stream_leases::Entity::insert(lease)
            .on_conflict(OnConflict::column(Column::Stream).do_nothing().to_owned())
            .exec_without_returning(&self.conn)
            .await?;

        Ok(inserted > 0)
    }

    async fn release(&self, stream: &str, holder: &str) -> Result<(), DbError> {
        stream_leases::Entity::delete_many()
            .filter(stream_leases::Column::Stream.eq(stream))
            .filter(stream_leases::Column::Holder.eq(holder))
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
