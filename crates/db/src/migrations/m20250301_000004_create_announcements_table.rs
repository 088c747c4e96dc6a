//! Create announcements table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Announcements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Announcements::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Announcements::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Announcements::Content).text().not_null())
                    .col(ColumnDef::new(Announcements::Type).string_len(50).not_null().default("info"))
                    .col(ColumnDef::new(Announcements::Priority).integer().not_null().default(1))
                    .col(ColumnDef::new(Announcements::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Announcements::ExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Announcements::CreatedBy).string_len(32))
                    .col(
                        ColumnDef::new(Announcements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Announcements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (is_active, priority) for the public listing
        manager
            .create_index(
                Index::create()
                    .name("idx_announcements_active_priority")
                    .table(Announcements::Table)
                    .col(Announcements::IsActive)
                    .col(Announcements::Priority)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_announcements_created_at")
                    .table(Announcements::Table)
                    .col(Announcements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Announcements::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Announcements {
    Table,
    Id,
    Title,
    Content,
    Type,
    Priority,
    IsActive,
    ExpiresAt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
