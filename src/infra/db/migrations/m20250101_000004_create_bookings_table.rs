//! Migration: create bookings table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users_table::Users;
use super::m20250101_000002_create_hotels_table::Hotels;
use super::m20250101_000003_create_rooms_table::Rooms;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::RoomId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::HotelId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::CheckInDate).date().not_null())
                    .col(ColumnDef::new(Bookings::CheckOutDate).date().not_null())
                    .col(ColumnDef::new(Bookings::Guests).integer().not_null().default(1))
                    .col(ColumnDef::new(Bookings::TotalPrice).double().not_null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Bookings::PaymentMethod)
                            .string_len(32)
                            .not_null()
                            .default("Pay At Hotel"),
                    )
                    .col(
                        ColumnDef::new(Bookings::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Bookings::RazorpayOrderId).string().null())
                    .col(ColumnDef::new(Bookings::RazorpayPaymentId).string().null())
                    .col(ColumnDef::new(Bookings::RazorpaySignature).string().null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(
                        Expr::col(Bookings::CheckOutDate)
                            .gt(Expr::col(Bookings::CheckInDate)),
                    )
                    .check(Expr::col(Bookings::Guests).gte(1))
                    .check(Expr::col(Bookings::TotalPrice).gte(0.0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_room")
                            .from(Bookings::Table, Bookings::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_hotel")
                            .from(Bookings::Table, Bookings::HotelId)
                            .to(Hotels::Table, Hotels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Overlap checks scan a room's bookings by date
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_room_dates")
                    .table(Bookings::Table)
                    .col(Bookings::RoomId)
                    .col(Bookings::CheckInDate)
                    .col(Bookings::CheckOutDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_id")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_hotel_id")
                    .table(Bookings::Table)
                    .col(Bookings::HotelId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    UserId,
    RoomId,
    HotelId,
    CheckInDate,
    CheckOutDate,
    Guests,
    TotalPrice,
    Status,
    PaymentMethod,
    IsPaid,
    RazorpayOrderId,
    RazorpayPaymentId,
    RazorpaySignature,
    CreatedAt,
    UpdatedAt,
}
