use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20261001_000003_create_stream_leases_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StreamLeases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StreamLeases::Stream)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StreamLeases::Holder).text().not_null())
                    .col(
                        ColumnDef::new(StreamLeases::AcquiredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StreamLeases::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StreamLeases::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StreamLeases {
    Table,
    Stream,
    Holder,
    AcquiredAt,
    ExpiresAt,
}
