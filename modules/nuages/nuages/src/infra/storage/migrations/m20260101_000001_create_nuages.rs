//! Initial migration for the nuages table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Nuages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Nuages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Nuages::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Nuages::NodeName).string_len(255).not_null())
                    .col(ColumnDef::new(Nuages::InstanceId).big_integer().not_null())
                    .col(ColumnDef::new(Nuages::Template).string_len(255).not_null())
                    .col(ColumnDef::new(Nuages::Cores).integer().not_null().default(1))
                    .col(
                        ColumnDef::new(Nuages::MemoryMb)
                            .integer()
                            .not_null()
                            .default(512),
                    )
                    .col(ColumnDef::new(Nuages::SwapMb).integer().not_null().default(512))
                    .col(
                        ColumnDef::new(Nuages::DiskMb)
                            .integer()
                            .not_null()
                            .default(10_240),
                    )
                    .col(
                        ColumnDef::new(Nuages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Nuages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_nuages_name")
                    .table(Nuages::Table)
                    .col(Nuages::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_nuages_instance_id")
                    .table(Nuages::Table)
                    .col(Nuages::InstanceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Per-node lookups for the local id hint
        manager
            .create_index(
                Index::create()
                    .name("idx_nuages_node_name")
                    .table(Nuages::Table)
                    .col(Nuages::NodeName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Nuages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Nuages {
    Table,
    Id,
    Name,
    NodeName,
    InstanceId,
    Template,
    Cores,
    MemoryMb,
    SwapMb,
    DiskMb,
    CreatedAt,
    UpdatedAt,
}
