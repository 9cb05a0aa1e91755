//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{AuthProvider, User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: Option<String>,
    #[sea_orm(unique)]
    pub google_id: Option<String>,
    pub auth_provider: String,
    pub role: String,
    pub image: String,
    pub recent_searched_cities: Vec<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hotel::Entity")]
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

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            google_id: model.google_id,
            auth_provider: AuthProvider::from(model.auth_provider.as_str()),
            role: UserRole::from(model.role.as_str()),
            image: model.image,
            recent_searched_cities: model.recent_searched_cities,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
