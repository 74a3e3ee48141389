//! Migration: Create the useremails table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
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
                        .table(Useremails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Useremails::Useremailid)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Useremails::Useremail).string().not_null())
                        .col(ColumnDef::new(Useremails::Userid).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_useremails_userid")
                                .from(Useremails::Table, Useremails::Userid)
                                .to(Users::Table, Users::Userid),
                        ),
                )
                .to_owned(),
            )
            .await?;

        // Children are always loaded by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_useremails_userid")
                    .table(Useremails::Table)
                    .col(Useremails::Userid)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Useremails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Useremails {
    Table,
    Useremailid,
    Useremail,
    Userid,
}
