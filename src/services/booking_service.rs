//! Booking service - Placing, changing and cancelling reservations.
//!
//! Price, status and paid flag are always derived here from the room and the
//! payment method; clients never supply them. Overlap protection itself lives
//! in the booking repository's serializable transaction.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::payment_service::{verify_payment_signature, PaymentConfirmation};
use crate::domain::booking::{total_price, validate_guests, validate_stay};
use crate::domain::{
    Actor, Booking, BookingChanges, BookingFilter, BookingStatus, BookingView, NewBooking,
    PaymentMethod,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Booking request from a guest
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    pub room_id: Uuid,
    /// Optional; must match the room's hotel when given
    pub hotel_id: Option<Uuid>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i32,
    pub payment_method: PaymentMethod,
    pub payment: PaymentConfirmation,
}

/// Requested booking changes; who may set which field is checked per caller
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub status: Option<BookingStatus>,
    pub is_paid: Option<bool>,
}

impl BookingUpdate {
    fn touches_stay(&self) -> bool {
        self.check_in_date.is_some() || self.check_out_date.is_some() || self.guests.is_some()
    }

    fn touches_state(&self) -> bool {
        self.status.is_some() || self.is_paid.is_some()
    }
}

#[async_trait]
pub trait BookingService: Send + Sync {
    /// Caller's bookings, newest first
    async fn my_bookings(&self, actor: Actor) -> AppResult<Vec<BookingView>>;

    async fn get_booking(&self, actor: Actor, id: Uuid) -> AppResult<BookingView>;

    /// Place a booking and return it with its room, hotel and guest
    async fn create_booking(
        &self,
        actor: Actor,
        input: CreateBookingInput,
    ) -> AppResult<BookingView>;

    async fn update_booking(
        &self,
        actor: Actor,
        id: Uuid,
        update: BookingUpdate,
    ) -> AppResult<BookingView>;

    /// Mark a booking cancelled; the row is kept
    async fn cancel_booking(&self, actor: Actor, id: Uuid) -> AppResult<Booking>;

    async fn hotel_bookings(&self, actor: Actor, hotel_id: Uuid) -> AppResult<Vec<BookingView>>;

    /// Every booking, optionally by status
    async fn list_bookings(&self, status: Option<BookingStatus>) -> AppResult<Vec<BookingView>>;

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking>;

    /// Remove a booking permanently
    async fn delete_booking(&self, id: Uuid) -> AppResult<()>;
}

pub struct BookingManager<U: UnitOfWork> {
    uow: Arc<U>,
    razorpay_secret: Option<String>,
}

impl<U: UnitOfWork> BookingManager<U> {
    pub fn new(uow: Arc<U>, razorpay_secret: Option<String>) -> Self {
        Self {
            uow,
            razorpay_secret,
        }
    }

    /// Status, paid flag and gateway references for a new booking
    fn payment_state(
        &self,
        method: PaymentMethod,
        payment: &PaymentConfirmation,
    ) -> AppResult<(BookingStatus, bool, [Option<String>; 3])> {
        let (status, is_paid) = method.initial_state();
        if method != PaymentMethod::Razorpay {
            return Ok((status, is_paid, [None, None, None]));
        }

        let (order_id, payment_id, signature) = payment.complete().ok_or_else(|| {
            AppError::bad_request("Razorpay order id, payment id and signature are required")
        })?;
        let secret = self
            .razorpay_secret
            .as_deref()
            .ok_or(AppError::NotConfigured("Payment gateway"))?;

        if !verify_payment_signature(secret, order_id, payment_id, signature) {
            tracing::warn!(order_id = %order_id, "Booking rejected: invalid payment signature");
            return Err(AppError::bad_request(
                "Payment verification failed - Invalid signature",
            ));
        }

        Ok((
            status,
            is_paid,
            [
                Some(order_id.to_string()),
                Some(payment_id.to_string()),
                Some(signature.to_string()),
            ],
        ))
    }

    async fn existing(&self, id: Uuid) -> AppResult<Booking> {
        self.uow
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Booking")
    }

    async fn manages_hotel(&self, actor: Actor, hotel_id: Uuid) -> AppResult<bool> {
        if actor.is_admin() {
            return Ok(true);
        }
        let hotel = self.uow.hotels().find_by_id(hotel_id).await?;
        Ok(hotel.is_some_and(|h| h.owner_id == actor.id))
    }

    async fn view(&self, id: Uuid) -> AppResult<BookingView> {
        self.uow
            .bookings()
            .find_view(id)
            .await?
            .ok_or_not_found("Booking")
    }
}

#[async_trait]
impl<U: UnitOfWork> BookingService for BookingManager<U> {
    async fn my_bookings(&self, actor: Actor) -> AppResult<Vec<BookingView>> {
        self.uow
            .bookings()
            .list(BookingFilter {
                user_id: Some(actor.id),
                ..Default::default()
            })
            .await
    }

    async fn get_booking(&self, actor: Actor, id: Uuid) -> AppResult<BookingView> {
        let view = self.view(id).await?;
        if view.booking.user_id != actor.id && !actor.is_admin() {
            return Err(AppError::forbidden("Not authorized to view this booking"));
        }
        Ok(view)
    }

    async fn create_booking(
        &self,
        actor: Actor,
        input: CreateBookingInput,
    ) -> AppResult<BookingView> {
        let room = self
            .uow
            .rooms()
            .find_by_id(input.room_id)
            .await?
            .ok_or_not_found("Room")?;

        if !room.is_available {
            return Err(AppError::bad_request("Room is not available"));
        }
        if input.hotel_id.is_some_and(|hotel_id| hotel_id != room.hotel_id) {
            return Err(AppError::bad_request("Room does not belong to the given hotel"));
        }

        let today = Utc::now().date_naive();
        let nights = validate_stay(input.check_in_date, input.check_out_date, today)?;
        validate_guests(input.guests, room.max_guests)?;

        let (status, is_paid, [order_id, payment_id, signature]) =
            self.payment_state(input.payment_method, &input.payment)?;

        let booking = self
            .uow
            .bookings()
            .create(NewBooking {
                user_id: actor.id,
                room_id: room.id,
                hotel_id: room.hotel_id,
                check_in_date: input.check_in_date,
                check_out_date: input.check_out_date,
                guests: input.guests,
                total_price: total_price(nights, room.price_per_night),
                status,
                payment_method: input.payment_method,
                is_paid,
                razorpay_order_id: order_id,
                razorpay_payment_id: payment_id,
                razorpay_signature: signature,
            })
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            user_id = %actor.id,
            status = %booking.status,
            "Booking created"
        );
        self.view(booking.id).await
    }

    async fn update_booking(
        &self,
        actor: Actor,
        id: Uuid,
        update: BookingUpdate,
    ) -> AppResult<BookingView> {
        let booking = self.existing(id).await?;
        let is_guest = booking.user_id == actor.id;
        let is_manager = self.manages_hotel(actor, booking.hotel_id).await?;

        if !is_guest && !is_manager {
            return Err(AppError::forbidden("Not authorized to update this booking"));
        }
        if update.touches_stay() && !(is_guest || actor.is_admin()) {
            return Err(AppError::forbidden(
                "Only the guest can change the dates or guests of a booking",
            ));
        }
        if update.touches_state() && !is_manager {
            return Err(AppError::forbidden(
                "Only the hotel owner can change booking status or payment",
            ));
        }

        let mut changes = BookingChanges {
            status: update.status,
            is_paid: update.is_paid,
            ..Default::default()
        };

        if update.touches_stay() {
            if !booking.status.is_modifiable() {
                return Err(AppError::bad_request(
                    "Only pending or confirmed bookings can be changed",
                ));
            }

            let room = self
                .uow
                .rooms()
                .find_by_id(booking.room_id)
                .await?
                .ok_or_not_found("Room")?;

            let check_in = update.check_in_date.unwrap_or(booking.check_in_date);
            let check_out = update.check_out_date.unwrap_or(booking.check_out_date);
            let guests = update.guests.unwrap_or(booking.guests);

            // A stay already under way keeps its check-in; only a new one must not be past
            let earliest = match update.check_in_date {
                Some(_) => Utc::now().date_naive(),
                None => booking.check_in_date,
            };
            let nights = validate_stay(check_in, check_out, earliest)?;
            validate_guests(guests, room.max_guests)?;

            changes.check_in_date = update.check_in_date;
            changes.check_out_date = update.check_out_date;
            changes.guests = update.guests;
            changes.total_price = Some(total_price(nights, room.price_per_night));
        }

        self.uow.bookings().update(id, changes).await?;
        tracing::info!(booking_id = %id, updated_by = %actor.id, "Booking updated");
        self.view(id).await
    }

    async fn cancel_booking(&self, actor: Actor, id: Uuid) -> AppResult<Booking> {
        let booking = self.existing(id).await?;
        if booking.user_id != actor.id && !actor.is_admin() {
            return Err(AppError::forbidden("Not authorized to cancel this booking"));
        }
        if booking.status == BookingStatus::Completed {
            return Err(AppError::bad_request("Completed bookings cannot be cancelled"));
        }

        let booking = self
            .uow
            .bookings()
            .update(
                id,
                BookingChanges {
                    status: Some(BookingStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(booking_id = %id, cancelled_by = %actor.id, "Booking cancelled");
        Ok(booking)
    }

    async fn hotel_bookings(&self, actor: Actor, hotel_id: Uuid) -> AppResult<Vec<BookingView>> {
        let hotel = self
            .uow
            .hotels()
            .find_by_id(hotel_id)
            .await?
            .ok_or_not_found("Hotel")?;

        if !hotel.is_managed_by(actor.id, actor.is_admin()) {
            return Err(AppError::forbidden(
                "Not authorized to view bookings for this hotel",
            ));
        }

        self.uow
            .bookings()
            .list(BookingFilter {
                hotel_id: Some(hotel_id),
                ..Default::default()
            })
            .await
    }

    async fn list_bookings(&self, status: Option<BookingStatus>) -> AppResult<Vec<BookingView>> {
        self.uow
            .bookings()
            .list(BookingFilter {
                status,
                ..Default::default()
            })
            .await
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let booking = self
            .uow
            .bookings()
            .update(
                id,
                BookingChanges {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(booking_id = %id, status = %status, "Booking status set");
        Ok(booking)
    }

    async fn delete_booking(&self, id: Uuid) -> AppResult<()> {
        self.uow.bookings().delete(id).await?;
        tracing::info!(booking_id = %id, "Booking deleted");
        Ok(())
    }
}
