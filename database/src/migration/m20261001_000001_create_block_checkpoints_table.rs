use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20261001_000001_create_block_checkpoints_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlockCheckpoints::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlockCheckpoints::PartitionKey).text().not_null())
                    .col(ColumnDef::new(BlockCheckpoints::RowKey).text().not_null())
                    .col(
                        ColumnDef::new(BlockCheckpoints::BlockNumber)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(BlockCheckpoints::LastEvent).json_binary().null())
                    .col(
                        ColumnDef::new(BlockCheckpoints::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(BlockCheckpoints::PartitionKey)
                            .col(BlockCheckpoints::RowKey),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlockCheckpoints::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BlockCheckpoints {
    Table,
    PartitionKey,
    RowKey,
    BlockNumber,
    LastEvent,
    UpdatedAt,
}
