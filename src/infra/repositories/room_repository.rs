//! Room repository implementation, including the public room search.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::{PgBinOper, PgExpr};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::room::{self, ActiveModel, Entity as RoomEntity};
use super::entities::{hotel, user};
use super::hotel_repository::hotel_view;
use super::query::contains_pattern;
use crate::domain::{NewRoom, Room, RoomChanges, RoomSearch, RoomSort, RoomView, SortOrder};
use crate::errors::{AppError, AppResult};
use crate::types::Paginated;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Room repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>>;

    /// Room with hotel and hotel owner populated
    async fn find_view(&self, id: Uuid) -> AppResult<Option<RoomView>>;

    /// Filtered, sorted and paginated room search
    async fn search(&self, search: RoomSearch) -> AppResult<Paginated<RoomView>>;

    /// Rooms of one hotel, or every room when `hotel_id` is `None`
    async fn list(&self, hotel_id: Option<Uuid>) -> AppResult<Vec<RoomView>>;

    async fn create(&self, room: NewRoom) -> AppResult<Room>;

    async fn update(&self, id: Uuid, changes: RoomChanges) -> AppResult<Room>;

    /// Delete room; its bookings cascade
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<u64>;
}

/// Concrete implementation of RoomRepository
pub struct RoomStore {
    db: DatabaseConnection,
}

impl RoomStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach hotels and their owners to joined room rows.
    async fn attach_hotels(
        &self,
        rows: Vec<(room::Model, Option<hotel::Model>)>,
    ) -> AppResult<Vec<RoomView>> {
        let owner_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, hotel)| hotel.as_ref().map(|h| h.owner_id))
            .collect();

        let owners: HashMap<Uuid, user::Model> = if owner_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(owner_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|owner| (owner.id, owner))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|(room, hotel)| RoomView {
                room: Room::from(room),
                hotel: hotel.map(|h| {
                    let owner = owners.get(&h.owner_id).cloned();
                    hotel_view(h, owner)
                }),
            })
            .collect())
    }
}

fn order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

#[async_trait]
impl RoomRepository for RoomStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>> {
        let result = RoomEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Room::from))
    }

    async fn find_view(&self, id: Uuid) -> AppResult<Option<RoomView>> {
        let row = RoomEntity::find_by_id(id)
            .find_also_related(hotel::Entity)
            .one(&self.db)
            .await?;

        match row {
            Some(row) => Ok(self.attach_hotels(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn search(&self, search: RoomSearch) -> AppResult<Paginated<RoomView>> {
        let mut query = RoomEntity::find().find_also_related(hotel::Entity);

        if let Some(city) = search.city {
            query = query.filter(hotel::Column::City.eq(city));
        }
        if let Some(term) = search.search {
            let pattern = contains_pattern(&term);
            query = query.filter(
                Condition::any()
                    .add(Expr::col((hotel::Entity, hotel::Column::Name)).ilike(pattern.clone()))
                    .add(Expr::col((hotel::Entity, hotel::Column::City)).ilike(pattern)),
            );
        }
        if let Some(hotel_id) = search.hotel_id {
            query = query.filter(room::Column::HotelId.eq(hotel_id));
        }
        if let Some(room_type) = search.room_type {
            query = query.filter(room::Column::RoomType.eq(room_type.as_str()));
        }
        if let Some(available) = search.available {
            query = query.filter(room::Column::IsAvailable.eq(available));
        }
        if let Some(min) = search.min_price {
            query = query.filter(room::Column::PricePerNight.gte(min));
        }
        if let Some(max) = search.max_price {
            query = query.filter(room::Column::PricePerNight.lte(max));
        }
        if !search.amenities.is_empty() {
            // amenities @> ARRAY[...]: the room offers every requested amenity
            query = query.filter(
                Expr::col((room::Entity, room::Column::Amenities))
                    .binary(PgBinOper::Contains, Expr::val(search.amenities)),
            );
        }

        query = match search.sort {
            RoomSort::HotelName => query.order_by(hotel::Column::Name, order(search.order)),
            RoomSort::Price => query.order_by(room::Column::PricePerNight, order(search.order)),
            RoomSort::Newest => query.order_by_desc(room::Column::CreatedAt),
        };
        // Stable pages across equal sort keys
        query = query.order_by_asc(room::Column::Id);

        let params = search.pagination;
        let paginator = query.paginate(&self.db, params.limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page_index()).await?;

        let views = self.attach_hotels(rows).await?;
        Ok(Paginated::new(views, params, total))
    }

    async fn list(&self, hotel_id: Option<Uuid>) -> AppResult<Vec<RoomView>> {
        let mut query = RoomEntity::find();
        if let Some(hotel_id) = hotel_id {
            query = query.filter(room::Column::HotelId.eq(hotel_id));
        }

        let rows = query
            .find_also_related(hotel::Entity)
            .order_by_desc(room::Column::CreatedAt)
            .all(&self.db)
            .await?;

        self.attach_hotels(rows).await
    }

    async fn create(&self, new_room: NewRoom) -> AppResult<Room> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            hotel_id: Set(new_room.hotel_id),
            room_type: Set(new_room.room_type.as_str().to_string()),
            price_per_night: Set(new_room.price_per_night),
            amenities: Set(new_room.amenities),
            images: Set(new_room.images),
            is_available: Set(true),
            max_guests: Set(new_room.max_guests),
            description: Set(new_room.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Room::from(model))
    }

    async fn update(&self, id: Uuid, changes: RoomChanges) -> AppResult<Room> {
        let room = RoomEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Room"))?;

        let mut active: ActiveModel = room.into();

        if let Some(room_type) = changes.room_type {
            active.room_type = Set(room_type.as_str().to_string());
        }
        if let Some(price) = changes.price_per_night {
            active.price_per_night = Set(price);
        }
        if let Some(amenities) = changes.amenities {
            active.amenities = Set(amenities);
        }
        if let Some(images) = changes.images {
            active.images = Set(images);
        }
        if let Some(is_available) = changes.is_available {
            active.is_available = Set(is_available);
        }
        if let Some(max_guests) = changes.max_guests {
            active.max_guests = Set(max_guests);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Room::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = RoomEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Room"));
        }

        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(RoomEntity::find().count(&self.db).await?)
    }
}
