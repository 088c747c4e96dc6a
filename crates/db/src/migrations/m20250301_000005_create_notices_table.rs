//! Create notices table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notices::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Notices::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Notices::Message).text().not_null())
                    .col(ColumnDef::new(Notices::Type).string_len(50).not_null().default("announcement"))
                    .col(ColumnDef::new(Notices::Target).string_len(50).not_null().default("all"))
                    .col(ColumnDef::new(Notices::Status).string_len(20).not_null().default("active"))
                    .col(ColumnDef::new(Notices::Views).integer().not_null().default(0))
                    .col(ColumnDef::new(Notices::Schedule).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Notices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notices_created_at")
                    .table(Notices::Table)
                    .col(Notices::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notices {
    Table,
    Id,
    Title,
    Message,
    Type,
    Target,
    Status,
    Views,
    Schedule,
    CreatedAt,
}
