//! Migration: create hotels table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hotels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hotels::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Hotels::Name).string().not_null())
                    .col(ColumnDef::new(Hotels::Address).string().not_null())
                    .col(ColumnDef::new(Hotels::City).string().not_null())
                    .col(ColumnDef::new(Hotels::Contact).string().not_null())
                    .col(ColumnDef::new(Hotels::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Hotels::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Hotels::Images)
                            .array(ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(ColumnDef::new(Hotels::Rating).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Hotels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Hotels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Hotels::Rating).between(0.0, 5.0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hotels_owner")
                            .from(Hotels::Table, Hotels::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hotels_city")
                    .table(Hotels::Table)
                    .col(Hotels::City)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hotels_owner_id")
                    .table(Hotels::Table)
                    .col(Hotels::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Hotels::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Hotels {
    Table,
    Id,
    Name,
    Address,
    City,
    Contact,
    Description,
    OwnerId,
    Images,
    Rating,
    CreatedAt,
    UpdatedAt,
}
