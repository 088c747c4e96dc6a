//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_service_requests_table;
mod m20250301_000003_create_outage_reports_table;
mod m20250301_000004_create_announcements_table;
mod m20250301_000005_create_notices_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_service_requests_table::Migration),
            Box::new(m20250301_000003_create_outage_reports_table::Migration),
            Box::new(m20250301_000004_create_announcements_table::Migration),
            Box::new(m20250301_000005_create_notices_table::Migration),
        ]
    }
}
