//! Service Container - Centralized service access.
//!
//! Handlers depend on the `ServiceContainer` trait so tests can swap in
//! mocks; `Services` wires the real implementations over one unit of work.

use std::sync::Arc;

use super::{
    AdminManager, AdminService, AuthService, Authenticator, BookingManager, BookingService,
    HotelManager, HotelService, PaymentProcessor, PaymentService, RoomManager, RoomService,
    UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{
    GoogleOAuthClient, IdentityProvider, PaymentGateway, Persistence, RazorpayClient,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn hotels(&self) -> Arc<dyn HotelService>;

    fn rooms(&self) -> Arc<dyn RoomService>;

    fn bookings(&self) -> Arc<dyn BookingService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn admin(&self) -> Arc<dyn AdminService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    hotel_service: Arc<dyn HotelService>,
    room_service: Arc<dyn RoomService>,
    booking_service: Arc<dyn BookingService>,
    payment_service: Arc<dyn PaymentService>,
    admin_service: Arc<dyn AdminService>,
}

impl Services {
    /// Create service container from database connection and config.
    ///
    /// Google sign-in and the payment gateway are only wired when their
    /// credentials are configured; their endpoints answer 503 otherwise.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> AppResult<Self> {
        let uow = Arc::new(Persistence::new(db));

        let google: Option<Arc<dyn IdentityProvider>> = match config.google.clone() {
            Some(google) => Some(Arc::new(GoogleOAuthClient::new(google)?)),
            None => {
                tracing::warn!("Google OAuth credentials not set; Google sign-in disabled");
                None
            }
        };

        let razorpay_secret = config.razorpay.as_ref().map(|r| r.key_secret.clone());
        let gateway: Option<Arc<dyn PaymentGateway>> = match config.razorpay.clone() {
            Some(razorpay) => Some(Arc::new(RazorpayClient::new(razorpay)?)),
            None => {
                tracing::warn!("Razorpay credentials not set; online payments disabled");
                None
            }
        };

        Ok(Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config, google)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            hotel_service: Arc::new(HotelManager::new(uow.clone())),
            room_service: Arc::new(RoomManager::new(uow.clone())),
            booking_service: Arc::new(BookingManager::new(uow.clone(), razorpay_secret.clone())),
            payment_service: Arc::new(PaymentProcessor::new(gateway, razorpay_secret)),
            admin_service: Arc::new(AdminManager::new(uow)),
        })
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn hotels(&self) -> Arc<dyn HotelService> {
        self.hotel_service.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomService> {
        self.room_service.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingService> {
        self.booking_service.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    fn admin(&self) -> Arc<dyn AdminService> {
        self.admin_service.clone()
    }
}
