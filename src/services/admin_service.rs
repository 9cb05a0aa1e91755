//! Admin service - Platform-wide user management, superusers and analytics.

use async_trait::async_trait;
use chrono::{Months, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user_service::register_local_user;
use crate::config::{RECENT_BOOKINGS_LIMIT, REVENUE_REPORT_MONTHS};
use crate::domain::booking::monthly_revenue;
use crate::domain::{
    Actor, BookingFilter, BookingStatus, BookingView, MonthlyRevenue, User, UserChanges,
    UserFilter, UserResponse, UserRole,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Fields an admin may change on any account
#[derive(Debug, Clone, Default)]
pub struct AdminUserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// Hotel owner with the number of hotels they list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelOwnerSummary {
    #[serde(flatten)]
    pub user: UserResponse,
    pub hotel_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_users: u64,
    pub total_hotel_owners: u64,
    pub total_admins: u64,
    pub total_hotels: u64,
    pub total_rooms: u64,
    pub total_bookings: u64,
    /// Sum of paid booking totals
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingCounts {
    pub pending: u64,
    pub confirmed: u64,
    pub cancelled: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub overview: Overview,
    pub bookings: BookingCounts,
    pub recent_bookings: Vec<BookingView>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn list_users(&self, filter: UserFilter) -> AppResult<Vec<User>>;

    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Create an account with any role
    async fn create_user(
        &self,
        username: String,
        email: String,
        password: String,
        role: UserRole,
    ) -> AppResult<User>;

    async fn update_user(&self, id: Uuid, update: AdminUserUpdate) -> AppResult<User>;

    /// Delete an account other than the caller's own
    async fn delete_user(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    async fn hotel_owners(&self) -> AppResult<Vec<HotelOwnerSummary>>;

    async fn analytics(&self) -> AppResult<Analytics>;

    async fn list_superusers(&self) -> AppResult<Vec<User>>;

    async fn create_superuser(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<User>;
}

pub struct AdminManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AdminManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminManager<U> {
    async fn list_users(&self, filter: UserFilter) -> AppResult<Vec<User>> {
        self.uow.users().list(filter).await
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn create_user(
        &self,
        username: String,
        email: String,
        password: String,
        role: UserRole,
    ) -> AppResult<User> {
        let user = register_local_user(
            self.uow.users().as_ref(),
            username.trim().to_string(),
            email.trim().to_lowercase(),
            &password,
            role,
        )
        .await?;
        tracing::info!(user_id = %user.id, role = %role, "Admin created user");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: AdminUserUpdate) -> AppResult<User> {
        let changes = UserChanges {
            username: update.username,
            email: update.email.map(|e| e.trim().to_lowercase()),
            role: update.role,
            ..Default::default()
        };
        let user = self.uow.users().update(id, changes).await?;
        if let Some(role) = update.role {
            tracing::info!(user_id = %id, role = %role, "User role changed");
        }
        Ok(user)
    }

    async fn delete_user(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        if actor.id == id {
            return Err(AppError::bad_request("You cannot delete your own account"));
        }
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, deleted_by = %actor.id, "User deleted");
        Ok(())
    }

    async fn hotel_owners(&self) -> AppResult<Vec<HotelOwnerSummary>> {
        let users = self.uow.users();
        let hotels = self.uow.hotels();
        let (owners, counts) = tokio::try_join!(
            users.list(UserFilter {
                role: Some(UserRole::HotelOwner),
                ..Default::default()
            }),
            hotels.count_by_owner(),
        )?;

        Ok(owners
            .into_iter()
            .map(|owner| HotelOwnerSummary {
                hotel_count: counts.get(&owner.id).copied().unwrap_or(0),
                user: owner.into(),
            })
            .collect())
    }

    async fn analytics(&self) -> AppResult<Analytics> {
        let users = self.uow.users();
        let hotels = self.uow.hotels();
        let rooms = self.uow.rooms();
        let bookings = self.uow.bookings();

        let now = Utc::now();
        let since = now
            .checked_sub_months(Months::new(REVENUE_REPORT_MONTHS))
            .unwrap_or(now);

        let (
            total_users,
            total_hotel_owners,
            total_admins,
            total_hotels,
            total_rooms,
            total_bookings,
            pending,
            confirmed,
            cancelled,
            completed,
            total_revenue,
            recent_bookings,
            paid,
        ) = tokio::try_join!(
            users.count(Some(UserRole::User)),
            users.count(Some(UserRole::HotelOwner)),
            users.count(Some(UserRole::Admin)),
            hotels.count(),
            rooms.count(),
            bookings.count(None),
            bookings.count(Some(BookingStatus::Pending)),
            bookings.count(Some(BookingStatus::Confirmed)),
            bookings.count(Some(BookingStatus::Cancelled)),
            bookings.count(Some(BookingStatus::Completed)),
            bookings.total_revenue(),
            bookings.list(BookingFilter {
                limit: Some(RECENT_BOOKINGS_LIMIT),
                ..Default::default()
            }),
            bookings.paid_since(since),
        )?;

        Ok(Analytics {
            overview: Overview {
                total_users,
                total_hotel_owners,
                total_admins,
                total_hotels,
                total_rooms,
                total_bookings,
                total_revenue,
            },
            bookings: BookingCounts {
                pending,
                confirmed,
                cancelled,
                completed,
            },
            recent_bookings,
            monthly_revenue: monthly_revenue(&paid),
        })
    }

    async fn list_superusers(&self) -> AppResult<Vec<User>> {
        self.uow
            .users()
            .list(UserFilter {
                role: Some(UserRole::Admin),
                ..Default::default()
            })
            .await
    }

    async fn create_superuser(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        self.create_user(username, email, password, UserRole::Admin)
            .await
    }
}
