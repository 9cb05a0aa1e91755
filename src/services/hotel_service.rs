//! Hotel service - Listing and owner-managed hotel CRUD.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::hotel::validate_rating;
use crate::domain::{Actor, Hotel, HotelChanges, HotelFilter, HotelView, NewHotel};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait HotelService: Send + Sync {
    async fn list_hotels(&self, filter: HotelFilter) -> AppResult<Vec<HotelView>>;

    async fn get_hotel(&self, id: Uuid) -> AppResult<HotelView>;

    /// Create a hotel owned by the caller
    async fn create_hotel(&self, actor: Actor, hotel: NewHotel) -> AppResult<Hotel>;

    /// Update a hotel; owner or admin only
    async fn update_hotel(&self, actor: Actor, id: Uuid, changes: HotelChanges)
        -> AppResult<Hotel>;

    /// Delete a hotel with its rooms and bookings; owner or admin only
    async fn delete_hotel(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    async fn my_hotels(&self, actor: Actor) -> AppResult<Vec<HotelView>>;
}

/// Load a hotel and make sure the caller may manage it.
pub(crate) async fn managed_hotel<U: UnitOfWork>(
    uow: &U,
    actor: Actor,
    id: Uuid,
) -> AppResult<Hotel> {
    let hotel = uow.hotels().find_by_id(id).await?.ok_or_not_found("Hotel")?;
    if !hotel.is_managed_by(actor.id, actor.is_admin()) {
        return Err(AppError::forbidden("Not authorized to manage this hotel"));
    }
    Ok(hotel)
}

pub struct HotelManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HotelManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> HotelService for HotelManager<U> {
    async fn list_hotels(&self, filter: HotelFilter) -> AppResult<Vec<HotelView>> {
        self.uow.hotels().list(filter).await
    }

    async fn get_hotel(&self, id: Uuid) -> AppResult<HotelView> {
        self.uow.hotels().find_view(id).await?.ok_or_not_found("Hotel")
    }

    async fn create_hotel(&self, actor: Actor, hotel: NewHotel) -> AppResult<Hotel> {
        let hotel = self
            .uow
            .hotels()
            .create(NewHotel {
                owner_id: actor.id,
                ..hotel
            })
            .await?;

        tracing::info!(hotel_id = %hotel.id, owner_id = %actor.id, "Hotel created");
        Ok(hotel)
    }

    async fn update_hotel(
        &self,
        actor: Actor,
        id: Uuid,
        changes: HotelChanges,
    ) -> AppResult<Hotel> {
        managed_hotel(self.uow.as_ref(), actor, id).await?;
        if let Some(rating) = changes.rating {
            validate_rating(rating)?;
        }
        self.uow.hotels().update(id, changes).await
    }

    async fn delete_hotel(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        managed_hotel(self.uow.as_ref(), actor, id).await?;
        self.uow.hotels().delete(id).await?;
        tracing::info!(hotel_id = %id, deleted_by = %actor.id, "Hotel deleted");
        Ok(())
    }

    async fn my_hotels(&self, actor: Actor) -> AppResult<Vec<HotelView>> {
        self.uow
            .hotels()
            .list(HotelFilter {
                owner_id: Some(actor.id),
                ..Default::default()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::services::test_support::{sample_hotel, MockRepos};

    #[tokio::test]
    async fn test_non_owner_cannot_update() {
        let owner = Uuid::new_v4();
        let mut repos = MockRepos::default();
        repos
            .hotels
            .expect_find_by_id()
            .returning(move |_| Ok(Some(sample_hotel(owner))));
        repos.hotels.expect_update().never();

        let service = HotelManager::new(repos.into_uow());
        let intruder = Actor::new(Uuid::new_v4(), UserRole::HotelOwner);
        let err = service
            .update_hotel(intruder, Uuid::new_v4(), HotelChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_can_delete_any_hotel() {
        let mut repos = MockRepos::default();
        repos
            .hotels
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_hotel(Uuid::new_v4()))));
        repos.hotels.expect_delete().times(1).returning(|_| Ok(()));

        let service = HotelManager::new(repos.into_uow());
        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);
        assert!(service.delete_hotel(admin, Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_rating() {
        let owner = Uuid::new_v4();
        let mut repos = MockRepos::default();
        repos
            .hotels
            .expect_find_by_id()
            .returning(move |_| Ok(Some(sample_hotel(owner))));
        repos.hotels.expect_update().never();

        let service = HotelManager::new(repos.into_uow());
        let changes = HotelChanges {
            rating: Some(7.5),
            ..Default::default()
        };
        let err = service
            .update_hotel(Actor::new(owner, UserRole::HotelOwner), Uuid::new_v4(), changes)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_sets_caller_as_owner() {
        let caller = Uuid::new_v4();
        let mut repos = MockRepos::default();
        repos
            .hotels
            .expect_create()
            .withf(move |hotel| hotel.owner_id == caller)
            .returning(|hotel| Ok(sample_hotel(hotel.owner_id)));

        let service = HotelManager::new(repos.into_uow());
        let new_hotel = NewHotel {
            name: "Hill View".into(),
            address: "2 Ridge Road".into(),
            city: "Shimla".into(),
            contact: "0177 2650000".into(),
            description: String::new(),
            owner_id: Uuid::nil(),
            images: Vec::new(),
        };
        let hotel = service
            .create_hotel(Actor::new(caller, UserRole::HotelOwner), new_hotel)
            .await
            .unwrap();
        assert_eq!(hotel.owner_id, caller);
    }
}
