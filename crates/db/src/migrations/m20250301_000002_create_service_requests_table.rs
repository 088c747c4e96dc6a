//! Create service_requests table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ServiceRequests::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(ServiceRequests::TicketId).string_len(50).not_null())
                    .col(ColumnDef::new(ServiceRequests::ServiceType).string_len(100).not_null())
                    .col(ColumnDef::new(ServiceRequests::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(ServiceRequests::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(ServiceRequests::City).string_len(100))
                    .col(ColumnDef::new(ServiceRequests::Woreda).string_len(100))
                    .col(ColumnDef::new(ServiceRequests::Kebele).string_len(100))
                    .col(ColumnDef::new(ServiceRequests::HousePlotNumber).string_len(100))
                    .col(ColumnDef::new(ServiceRequests::NearbyLandmark).string_len(255))
                    .col(ColumnDef::new(ServiceRequests::FullAddress).text().not_null())
                    .col(
                        ColumnDef::new(ServiceRequests::Documents)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ServiceRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending")
                            .check(Expr::col(ServiceRequests::Status).is_in([
                                "pending",
                                "under_review",
                                "approved",
                                "rejected",
                                "assigned",
                                "in_progress",
                                "completed",
                            ])),
                    )
                    .col(
                        ColumnDef::new(ServiceRequests::Priority)
                            .string_len(10)
                            .not_null()
                            .default("medium")
                            .check(
                                Expr::col(ServiceRequests::Priority)
                                    .is_in(["low", "medium", "high"]),
                            ),
                    )
                    .col(ColumnDef::new(ServiceRequests::AssignedTo).string_len(32))
                    .col(ColumnDef::new(ServiceRequests::CreatedBy).string_len(32))
                    .col(ColumnDef::new(ServiceRequests::SupervisorNotes).text())
                    .col(
                        ColumnDef::new(ServiceRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ServiceRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: ticket_id
        manager
            .create_index(
                Index::create()
                    .name("idx_service_requests_ticket_id")
                    .table(ServiceRequests::Table)
                    .col(ServiceRequests::TicketId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_service_requests_status", ServiceRequests::Status),
            ("idx_service_requests_priority", ServiceRequests::Priority),
            ("idx_service_requests_service_type", ServiceRequests::ServiceType),
            ("idx_service_requests_created_at", ServiceRequests::CreatedAt),
            ("idx_service_requests_created_by", ServiceRequests::CreatedBy),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(ServiceRequests::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServiceRequests {
    Table,
    Id,
    TicketId,
    ServiceType,
    FullName,
    Phone,
    City,
    Woreda,
    Kebele,
    HousePlotNumber,
    NearbyLandmark,
    FullAddress,
    Documents,
    Status,
    Priority,
    AssignedTo,
    CreatedBy,
    SupervisorNotes,
    CreatedAt,
    UpdatedAt,
}
