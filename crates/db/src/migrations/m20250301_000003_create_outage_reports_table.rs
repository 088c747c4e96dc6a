//! Create outage_reports table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OutageReports::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OutageReports::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(OutageReports::Title).string_len(255).not_null())
                    .col(ColumnDef::new(OutageReports::Description).text().not_null())
                    .col(ColumnDef::new(OutageReports::OutageType).string_len(50).not_null())
                    .col(
                        ColumnDef::new(OutageReports::Urgency)
                            .string_len(10)
                            .not_null()
                            .default("medium")
                            .check(Expr::col(OutageReports::Urgency).is_in(["low", "medium", "high"])),
                    )
                    .col(
                        ColumnDef::new(OutageReports::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending")
                            .check(Expr::col(OutageReports::Status).is_in([
                                "pending",
                                "assigned",
                                "in-progress",
                                "resolved",
                                "cancelled",
                            ])),
                    )
                    .col(ColumnDef::new(OutageReports::Latitude).double())
                    .col(ColumnDef::new(OutageReports::Longitude).double())
                    .col(ColumnDef::new(OutageReports::Address).text().not_null())
                    .col(ColumnDef::new(OutageReports::EstimatedAffected).string_len(50))
                    .col(ColumnDef::new(OutageReports::Reason).text())
                    .col(ColumnDef::new(OutageReports::TechnicianNotes).text())
                    .col(ColumnDef::new(OutageReports::ReportedBy).string_len(32))
                    .col(ColumnDef::new(OutageReports::AssignedTo).string_len(32))
                    .col(
                        ColumnDef::new(OutageReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OutageReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_outage_reports_status", OutageReports::Status),
            ("idx_outage_reports_urgency", OutageReports::Urgency),
            ("idx_outage_reports_created_at", OutageReports::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(OutageReports::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OutageReports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OutageReports {
    Table,
    Id,
    Title,
    Description,
    OutageType,
    Urgency,
    Status,
    Latitude,
    Longitude,
    Address,
    EstimatedAffected,
    Reason,
    TechnicianNotes,
    ReportedBy,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}
