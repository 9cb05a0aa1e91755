//! Room service - Public room search and owner-managed room CRUD.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::hotel_service::managed_hotel;
use crate::domain::room::{validate_max_guests, validate_price};
use crate::domain::{Actor, NewRoom, Room, RoomChanges, RoomSearch, RoomView};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;

#[async_trait]
pub trait RoomService: Send + Sync {
    /// Filtered, sorted and paginated room search
    async fn search_rooms(&self, search: RoomSearch) -> AppResult<Paginated<RoomView>>;

    async fn get_room(&self, id: Uuid) -> AppResult<RoomView>;

    /// Add a room to a hotel the caller manages
    async fn create_room(&self, actor: Actor, room: NewRoom) -> AppResult<RoomView>;

    async fn update_room(&self, actor: Actor, id: Uuid, changes: RoomChanges) -> AppResult<Room>;

    async fn delete_room(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    async fn rooms_by_hotel(&self, hotel_id: Uuid) -> AppResult<Vec<RoomView>>;

    /// Every room on the platform
    async fn list_rooms(&self) -> AppResult<Vec<RoomView>>;
}

pub struct RoomManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RoomManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Load a room and check the caller manages its hotel.
    async fn managed_room(&self, actor: Actor, id: Uuid) -> AppResult<Room> {
        let room = self.uow.rooms().find_by_id(id).await?.ok_or_not_found("Room")?;
        managed_hotel(self.uow.as_ref(), actor, room.hotel_id).await?;
        Ok(room)
    }
}

#[async_trait]
impl<U: UnitOfWork> RoomService for RoomManager<U> {
    async fn search_rooms(&self, search: RoomSearch) -> AppResult<Paginated<RoomView>> {
        self.uow.rooms().search(search).await
    }

    async fn get_room(&self, id: Uuid) -> AppResult<RoomView> {
        self.uow.rooms().find_view(id).await?.ok_or_not_found("Room")
    }

    async fn create_room(&self, actor: Actor, room: NewRoom) -> AppResult<RoomView> {
        validate_price(room.price_per_night)?;
        validate_max_guests(room.max_guests)?;
        managed_hotel(self.uow.as_ref(), actor, room.hotel_id).await?;

        let room = self.uow.rooms().create(room).await?;
        tracing::info!(room_id = %room.id, hotel_id = %room.hotel_id, "Room created");

        self.get_room(room.id).await
    }

    async fn update_room(&self, actor: Actor, id: Uuid, changes: RoomChanges) -> AppResult<Room> {
        if let Some(price) = changes.price_per_night {
            validate_price(price)?;
        }
        if let Some(max_guests) = changes.max_guests {
            validate_max_guests(max_guests)?;
        }
        self.managed_room(actor, id).await?;
        self.uow.rooms().update(id, changes).await
    }

    async fn delete_room(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.managed_room(actor, id).await?;
        self.uow.rooms().delete(id).await?;
        tracing::info!(room_id = %id, deleted_by = %actor.id, "Room deleted");
        Ok(())
    }

    async fn rooms_by_hotel(&self, hotel_id: Uuid) -> AppResult<Vec<RoomView>> {
        self.uow.rooms().list(Some(hotel_id)).await
    }

    async fn list_rooms(&self) -> AppResult<Vec<RoomView>> {
        self.uow.rooms().list(None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomType, UserRole};
    use crate::errors::AppError;
    use crate::services::test_support::{sample_hotel, sample_room, MockRepos};

    fn new_room(hotel_id: Uuid) -> NewRoom {
        NewRoom {
            hotel_id,
            room_type: RoomType::Suite,
            price_per_night: 4200.0,
            amenities: vec!["WiFi".into(), "Pool".into()],
            images: Vec::new(),
            max_guests: 3,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_room_missing_hotel() {
        let mut repos = MockRepos::default();
        repos.hotels.expect_find_by_id().returning(|_| Ok(None));
        repos.rooms.expect_create().never();

        let service = RoomManager::new(repos.into_uow());
        let err = service
            .create_room(Actor::new(Uuid::new_v4(), UserRole::HotelOwner), new_room(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Hotel")));
    }

    #[tokio::test]
    async fn test_create_room_in_foreign_hotel_is_forbidden() {
        let mut repos = MockRepos::default();
        repos
            .hotels
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_hotel(Uuid::new_v4()))));
        repos.rooms.expect_create().never();

        let service = RoomManager::new(repos.into_uow());
        let err = service
            .create_room(Actor::new(Uuid::new_v4(), UserRole::HotelOwner), new_room(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_room_rejects_negative_price() {
        let service = RoomManager::new(MockRepos::default().into_uow());
        let mut room = new_room(Uuid::new_v4());
        room.price_per_night = -1.0;

        let err = service
            .create_room(Actor::new(Uuid::new_v4(), UserRole::Admin), room)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_admin_updates_room_of_any_hotel() {
        let hotel = sample_hotel(Uuid::new_v4());
        let room = sample_room(hotel.id);
        let room_id = room.id;

        let mut repos = MockRepos::default();
        let found = room.clone();
        repos
            .rooms
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repos
            .hotels
            .expect_find_by_id()
            .returning(move |_| Ok(Some(hotel.clone())));
        repos
            .rooms
            .expect_update()
            .withf(|_, changes| changes.is_available == Some(false))
            .returning(move |_, _| {
                let mut updated = room.clone();
                updated.is_available = false;
                Ok(updated)
            });

        let service = RoomManager::new(repos.into_uow());
        let changes = RoomChanges {
            is_available: Some(false),
            ..Default::default()
        };
        let updated = service
            .update_room(Actor::new(Uuid::new_v4(), UserRole::Admin), room_id, changes)
            .await
            .unwrap();
        assert!(!updated.is_available);
    }
}
