//! Booking repository implementation.
//!
//! Writes that place a booking on the calendar run in a serializable
//! transaction together with the overlap check, so two concurrent requests
//! cannot both reserve the same nights.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::entities::booking::{self, ActiveModel, Entity as BookingEntity};
use super::entities::{hotel, room, user};
use super::query::is_serialization_failure;
use crate::domain::{
    Booking, BookingChanges, BookingFilter, BookingStatus, BookingView, Hotel, NewBooking, Room,
    User, UserSummary,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

pub const ALREADY_BOOKED: &str = "Room is already booked for the selected dates";

/// Booking repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    /// Booking with room, hotel and guest populated
    async fn find_view(&self, id: Uuid) -> AppResult<Option<BookingView>>;

    /// Bookings matching the filter, newest first, populated
    async fn list(&self, filter: BookingFilter) -> AppResult<Vec<BookingView>>;

    /// Insert unless another live booking of the room overlaps the stay.
    async fn create(&self, booking: NewBooking) -> AppResult<Booking>;

    /// Apply a partial update; moved stays are re-checked for overlap.
    async fn update(&self, id: Uuid, changes: BookingChanges) -> AppResult<Booking>;

    /// Hard delete
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self, status: Option<BookingStatus>) -> AppResult<u64>;

    /// Sum of `total_price` over paid bookings
    async fn total_revenue(&self) -> AppResult<f64>;

    /// `(created_at, total_price)` of paid bookings created since `since`
    async fn paid_since(&self, since: DateTime<Utc>) -> AppResult<Vec<(DateTime<Utc>, f64)>>;
}

/// Concrete implementation of BookingRepository
pub struct BookingStore {
    db: DatabaseConnection,
}

impl BookingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach rooms, hotels and guests to booking rows.
    async fn populate(&self, models: Vec<booking::Model>) -> AppResult<Vec<BookingView>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let room_ids: Vec<Uuid> = models.iter().map(|b| b.room_id).collect();
        let hotel_ids: Vec<Uuid> = models.iter().map(|b| b.hotel_id).collect();
        let user_ids: Vec<Uuid> = models.iter().map(|b| b.user_id).collect();

        let rooms: HashMap<Uuid, Room> = room::Entity::find()
            .filter(room::Column::Id.is_in(room_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, Room::from(m)))
            .collect();
        let hotels: HashMap<Uuid, Hotel> = hotel::Entity::find()
            .filter(hotel::Column::Id.is_in(hotel_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, Hotel::from(m)))
            .collect();
        let users: HashMap<Uuid, UserSummary> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, UserSummary::from(&User::from(m))))
            .collect();

        Ok(models
            .into_iter()
            .map(|model| {
                let booking = Booking::from(model);
                BookingView {
                    room: rooms.get(&booking.room_id).cloned(),
                    hotel: hotels.get(&booking.hotel_id).cloned(),
                    user: users.get(&booking.user_id).cloned(),
                    booking,
                }
            })
            .collect())
    }
}

/// Whether a live booking of `room_id` overlaps `[check_in, check_out)`.
async fn has_overlap<C: ConnectionTrait>(
    conn: &C,
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude: Option<Uuid>,
) -> Result<bool, DbErr> {
    let mut query = BookingEntity::find()
        .filter(booking::Column::RoomId.eq(room_id))
        .filter(booking::Column::Status.ne(BookingStatus::Cancelled.as_str()))
        .filter(booking::Column::CheckInDate.lt(check_out))
        .filter(booking::Column::CheckOutDate.gt(check_in));

    if let Some(id) = exclude {
        query = query.filter(booking::Column::Id.ne(id));
    }

    Ok(query.count(conn).await? > 0)
}

/// A serializable transaction that lost the race is reported as a double booking.
fn write_error(err: DbErr) -> AppError {
    if is_serialization_failure(&err) {
        tracing::info!("Concurrent booking rejected by serialization check");
        AppError::conflict(ALREADY_BOOKED)
    } else {
        AppError::from(err)
    }
}

#[async_trait]
impl BookingRepository for BookingStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let result = BookingEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Booking::from))
    }

    async fn find_view(&self, id: Uuid) -> AppResult<Option<BookingView>> {
        match BookingEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(self.populate(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: BookingFilter) -> AppResult<Vec<BookingView>> {
        let mut query = BookingEntity::find();

        if let Some(user_id) = filter.user_id {
            query = query.filter(booking::Column::UserId.eq(user_id));
        }
        if let Some(hotel_id) = filter.hotel_id {
            query = query.filter(booking::Column::HotelId.eq(hotel_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }

        query = query.order_by_desc(booking::Column::CreatedAt);
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let models = query.all(&self.db).await?;
        self.populate(models).await
    }

    async fn create(&self, new_booking: NewBooking) -> AppResult<Booking> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::Serializable),
                Some(AccessMode::ReadWrite),
            )
            .await?;

        let result = async {
            if has_overlap(
                &txn,
                new_booking.room_id,
                new_booking.check_in_date,
                new_booking.check_out_date,
                None,
            )
            .await
            .map_err(write_error)?
            {
                return Err(AppError::conflict(ALREADY_BOOKED));
            }

            let now = Utc::now();
            let active_model = ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(new_booking.user_id),
                room_id: Set(new_booking.room_id),
                hotel_id: Set(new_booking.hotel_id),
                check_in_date: Set(new_booking.check_in_date),
                check_out_date: Set(new_booking.check_out_date),
                guests: Set(new_booking.guests),
                total_price: Set(new_booking.total_price),
                status: Set(new_booking.status.as_str().to_string()),
                payment_method: Set(new_booking.payment_method.as_str().to_string()),
                is_paid: Set(new_booking.is_paid),
                razorpay_order_id: Set(new_booking.razorpay_order_id.clone()),
                razorpay_payment_id: Set(new_booking.razorpay_payment_id.clone()),
                razorpay_signature: Set(new_booking.razorpay_signature.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            };

            active_model.insert(&txn).await.map_err(write_error)
        }
        .await;

        match result {
            Ok(model) => {
                txn.commit().await.map_err(write_error)?;
                Ok(Booking::from(model))
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn update(&self, id: Uuid, changes: BookingChanges) -> AppResult<Booking> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::Serializable),
                Some(AccessMode::ReadWrite),
            )
            .await?;

        let result = async {
            let existing = BookingEntity::find_by_id(id)
                .one(&txn)
                .await
                .map_err(write_error)?
                .ok_or(AppError::NotFound("Booking"))?;

            let check_in = changes.check_in_date.unwrap_or(existing.check_in_date);
            let check_out = changes.check_out_date.unwrap_or(existing.check_out_date);
            let current = existing.status.parse::<BookingStatus>()?;

            if changes.needs_availability_check(current)
                && has_overlap(&txn, existing.room_id, check_in, check_out, Some(id))
                    .await
                    .map_err(write_error)?
            {
                return Err(AppError::conflict(ALREADY_BOOKED));
            }

            let mut active: ActiveModel = existing.into();
            if let Some(date) = changes.check_in_date {
                active.check_in_date = Set(date);
            }
            if let Some(date) = changes.check_out_date {
                active.check_out_date = Set(date);
            }
            if let Some(guests) = changes.guests {
                active.guests = Set(guests);
            }
            if let Some(total) = changes.total_price {
                active.total_price = Set(total);
            }
            if let Some(status) = changes.status {
                active.status = Set(status.as_str().to_string());
            }
            if let Some(is_paid) = changes.is_paid {
                active.is_paid = Set(is_paid);
            }
            active.updated_at = Set(Utc::now());

            active.update(&txn).await.map_err(write_error)
        }
        .await;

        match result {
            Ok(model) => {
                txn.commit().await.map_err(write_error)?;
                Ok(Booking::from(model))
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = BookingEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Booking"));
        }

        Ok(())
    }

    async fn count(&self, status: Option<BookingStatus>) -> AppResult<u64> {
        let mut query = BookingEntity::find();
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }
        Ok(query.count(&self.db).await?)
    }

    async fn total_revenue(&self) -> AppResult<f64> {
        let total: Option<Option<f64>> = BookingEntity::find()
            .select_only()
            .column_as(booking::Column::TotalPrice.sum(), "revenue")
            .filter(booking::Column::IsPaid.eq(true))
            .into_tuple()
            .one(&self.db)
            .await?;

        Ok(total.flatten().unwrap_or(0.0))
    }

    async fn paid_since(&self, since: DateTime<Utc>) -> AppResult<Vec<(DateTime<Utc>, f64)>> {
        let rows: Vec<(DateTime<Utc>, f64)> = BookingEntity::find()
            .select_only()
            .column(booking::Column::CreatedAt)
            .column(booking::Column::TotalPrice)
            .filter(booking::Column::IsPaid.eq(true))
            .filter(booking::Column::CreatedAt.gte(since))
            .order_by_asc(booking::Column::CreatedAt)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}
