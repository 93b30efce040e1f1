use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20261001_000002_create_decoded_events_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DecodedEvents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DecodedEvents::PartitionKey).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::RowKey).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::BlockNumber).big_integer().not_null())
                    .col(ColumnDef::new(DecodedEvents::BlockHash).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::TransactionHash).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::TransactionIndex).big_integer().not_null())
                    .col(ColumnDef::new(DecodedEvents::LogIndex).big_integer().not_null())
                    .col(ColumnDef::new(DecodedEvents::EAddress).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::EData).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::Topics).json_binary().not_null())
                    .col(ColumnDef::new(DecodedEvents::Args).json_binary().not_null())
                    .col(ColumnDef::new(DecodedEvents::ESignature).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::EName).text().not_null())
                    .col(ColumnDef::new(DecodedEvents::ETopic).text().not_null())
                    .col(
                        ColumnDef::new(DecodedEvents::ETimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DecodedEvents::PartitionKey)
                            .col(DecodedEvents::RowKey),
                    )
                    .to_owned(),
            )
            .await?;

        // Recent-events listing per stream
        manager
            .create_index(
                Index::create()
                    .name("idx_decoded_events_stream_position")
                    .table(DecodedEvents::Table)
                    .col(DecodedEvents::PartitionKey)
                    .col(DecodedEvents::BlockNumber)
                    .col(DecodedEvents::LogIndex)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_decoded_events_name")
                    .table(DecodedEvents::Table)
                    .col(DecodedEvents::EName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DecodedEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DecodedEvents {
    Table,
    PartitionKey,
    RowKey,
    BlockNumber,
    BlockHash,
    TransactionHash,
    TransactionIndex,
    LogIndex,
    #[iden = "e_address"]
    EAddress,
    #[iden = "e_data"]
    EData,
    Topics,
    Args,
    #[iden = "e_signature"]
    ESignature,
    #[iden = "e_name"]
    EName,
    #[iden = "e_topic"]
    ETopic,
    #[iden = "e_timestamp"]
    ETimestamp,
}
