//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_roles_table;
mod m20240101_000003_create_useremails_table;
mod m20240101_000004_create_userroles_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_roles_table::Migration),
            Box::new(m20240101_000003_create_useremails_table::Migration),
            Box::new(m20240101_000004_create_userroles_table::Migration),
        ]
    }
}

/// Audit columns shared by every table.
#[derive(DeriveIden)]
pub(crate) enum Audit {
    CreatedBy,
    CreatedDate,
    LastModifiedBy,
    LastModifiedDate,
}

/// Append the audit columns to a table definition.
pub(crate) fn with_audit_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(ColumnDef::new(Audit::CreatedBy).string().null())
        .col(ColumnDef::new(Audit::CreatedDate).timestamp_with_time_zone().null())
        .col(ColumnDef::new(Audit::LastModifiedBy).string().null())
        .col(
            ColumnDef::new(Audit::LastModifiedDate)
                .timestamp_with_time_zone()
                .null(),
        )
}
