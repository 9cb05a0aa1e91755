//! Hotel repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::hotel::{self, ActiveModel, Entity as HotelEntity};
use super::entities::user;
use super::query::contains_pattern;
use crate::domain::{Hotel, HotelChanges, HotelFilter, HotelView, NewHotel, User, UserSummary};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Hotel repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hotel>>;

    /// Hotel with its owner populated
    async fn find_view(&self, id: Uuid) -> AppResult<Option<HotelView>>;

    /// Hotels matching the filter, newest first, owners populated
    async fn list(&self, filter: HotelFilter) -> AppResult<Vec<HotelView>>;

    async fn create(&self, hotel: NewHotel) -> AppResult<Hotel>;

    async fn update(&self, id: Uuid, changes: HotelChanges) -> AppResult<Hotel>;

    /// Delete hotel; rooms and bookings cascade
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<u64>;

    /// Number of hotels per owner, for owners that have any
    async fn count_by_owner(&self) -> AppResult<HashMap<Uuid, u64>>;
}

/// Concrete implementation of HotelRepository
pub struct HotelStore {
    db: DatabaseConnection,
}

impl HotelStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn hotel_view(model: hotel::Model, owner: Option<user::Model>) -> HotelView {
    HotelView {
        hotel: Hotel::from(model),
        owner: owner.map(|o| UserSummary::from(&User::from(o))),
    }
}

#[async_trait]
impl HotelRepository for HotelStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hotel>> {
        let result = HotelEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Hotel::from))
    }

    async fn find_view(&self, id: Uuid) -> AppResult<Option<HotelView>> {
        let result = HotelEntity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;
        Ok(result.map(|(hotel, owner)| hotel_view(hotel, owner)))
    }

    async fn list(&self, filter: HotelFilter) -> AppResult<Vec<HotelView>> {
        let mut query = HotelEntity::find();

        if let Some(city) = filter.city {
            query = query.filter(hotel::Column::City.eq(city));
        }
        if let Some(owner_id) = filter.owner_id {
            query = query.filter(hotel::Column::OwnerId.eq(owner_id));
        }
        if let Some(search) = filter.search {
            let pattern = contains_pattern(&search);
            query = query.filter(
                Condition::any()
                    .add(Expr::col((hotel::Entity, hotel::Column::Name)).ilike(pattern.clone()))
                    .add(Expr::col((hotel::Entity, hotel::Column::Address)).ilike(pattern)),
            );
        }

        let rows = query
            .find_also_related(user::Entity)
            .order_by_desc(hotel::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(hotel, owner)| hotel_view(hotel, owner))
            .collect())
    }

    async fn create(&self, new_hotel: NewHotel) -> AppResult<Hotel> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_hotel.name),
            address: Set(new_hotel.address),
            city: Set(new_hotel.city),
            contact: Set(new_hotel.contact),
            description: Set(new_hotel.description),
            owner_id: Set(new_hotel.owner_id),
            images: Set(new_hotel.images),
            rating: Set(0.0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Hotel::from(model))
    }

    async fn update(&self, id: Uuid, changes: HotelChanges) -> AppResult<Hotel> {
        let hotel = HotelEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Hotel"))?;

        let mut active: ActiveModel = hotel.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(city) = changes.city {
            active.city = Set(city);
        }
        if let Some(contact) = changes.contact {
            active.contact = Set(contact);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(images) = changes.images {
            active.images = Set(images);
        }
        if let Some(rating) = changes.rating {
            active.rating = Set(rating);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Hotel::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = HotelEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Hotel"));
        }

        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(HotelEntity::find().count(&self.db).await?)
    }

    async fn count_by_owner(&self) -> AppResult<HashMap<Uuid, u64>> {
        let rows: Vec<(Uuid, i64)> = HotelEntity::find()
            .select_only()
            .column(hotel::Column::OwnerId)
            .column_as(hotel::Column::Id.count(), "hotel_count")
            .group_by(hotel::Column::OwnerId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(owner_id, count)| (owner_id, count.max(0) as u64))
            .collect())
    }
}
