//! Migration: Create the userroles junction table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_roles_table::Roles;
use super::with_audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                with_audit_columns(
                    Table::create()
                        .table(Userroles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Userroles::Userid).big_integer().not_null())
                        .col(ColumnDef::new(Userroles::Roleid).big_integer().not_null())
                        .primary_key(
                            Index::create()
                                .col(Userroles::Userid)
                                .col(Userroles::Roleid),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_userroles_userid")
                                .from(Userroles::Table, Userroles::Userid)
                                .to(Users::Table, Users::Userid),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_userroles_roleid")
                                .from(Userroles::Table, Userroles::Roleid)
                                .to(Roles::Table, Roles::Roleid),
                        ),
                )
                .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Userroles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Userroles {
    Table,
    Userid,
    Roleid,
}
