//! Booking database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Booking, BookingStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub hotel_id: Uuid,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub guests: i32,
    pub total_price: f64,
    pub status: String,
    pub payment_method: String,
    pub is_paid: bool,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::HotelId",
        to = "super::hotel::Column::Id",
        on_delete = "Cascade"
    )]
    Hotel,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::hotel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hotel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Booking {
    fn from(model: Model) -> Self {
        Booking {
            id: model.id,
            user_id: model.user_id,
            room_id: model.room_id,
            hotel_id: model.hotel_id,
            check_in_date: model.check_in_date,
            check_out_date: model.check_out_date,
            guests: model.guests,
            total_price: model.total_price,
            status: model.status.parse().unwrap_or(BookingStatus::Pending),
            payment_method: model.payment_method.parse().unwrap_or_default(),
            is_paid: model.is_paid,
            razorpay_order_id: model.razorpay_order_id,
            razorpay_payment_id: model.razorpay_payment_id,
            razorpay_signature: model.razorpay_signature,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

