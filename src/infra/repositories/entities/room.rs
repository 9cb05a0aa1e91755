//! Room database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Room, RoomType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type: String,
    pub price_per_night: f64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_available: bool,
    pub max_guests: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::HotelId",
        to = "super::hotel::Column::Id",
        on_delete = "Cascade"
    )]
    Hotel,
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
}

impl Related<super::hotel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hotel.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Room {
    fn from(model: Model) -> Self {
        Room {
            id: model.id,
            hotel_id: model.hotel_id,
            // Column only ever receives values written from RoomType
            room_type: model.room_type.parse().unwrap_or(RoomType::SingleBed),
            price_per_night: model.price_per_night,
            amenities: model.amenities,
            images: model.images,
            is_available: model.is_available,
            max_guests: model.max_guests,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
