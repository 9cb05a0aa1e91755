//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, booking_handler, hotel_handler, payment_handler, room_handler,
    user_handler,
};
use crate::domain::{
    AuthProvider, Booking, BookingStatus, BookingView, Hotel, HotelView, MonthlyRevenue,
    PaymentMethod, Room, RoomType, RoomView, UserResponse, UserRole, UserSummary,
};
use crate::services::{
    Analytics, AuthResponse, BookingCounts, CreatedOrder, HotelOwnerSummary, Overview,
    VerifiedPayment,
};

/// OpenAPI documentation for the Hotel Booking API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hotel Booking API",
        version = "0.1.0",
        description = "Hotel booking marketplace: room search, bookings, owner hotel management and admin tooling",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::signup,
        auth_handler::login,
        auth_handler::me,
        auth_handler::google_redirect,
        auth_handler::google_callback,
        // Users
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::update_password,
        user_handler::list_users,
        // Hotels
        hotel_handler::list_hotels,
        hotel_handler::get_hotel,
        hotel_handler::create_hotel,
        hotel_handler::update_hotel,
        hotel_handler::delete_hotel,
        hotel_handler::my_hotels,
        // Rooms
        room_handler::search_rooms,
        room_handler::get_room,
        room_handler::rooms_by_hotel,
        room_handler::create_room,
        room_handler::update_room,
        room_handler::delete_room,
        // Bookings
        booking_handler::my_bookings,
        booking_handler::get_booking,
        booking_handler::create_booking,
        booking_handler::update_booking,
        booking_handler::cancel_booking,
        booking_handler::hotel_bookings,
        // Payment
        payment_handler::create_order,
        payment_handler::verify_payment,
        // Admin
        admin_handler::list_users,
        admin_handler::get_user,
        admin_handler::create_user,
        admin_handler::update_user,
        admin_handler::delete_user,
        admin_handler::hotel_owners,
        admin_handler::list_hotels,
        admin_handler::update_hotel,
        admin_handler::delete_hotel,
        admin_handler::list_rooms,
        admin_handler::update_room,
        admin_handler::delete_room,
        admin_handler::list_bookings,
        admin_handler::update_booking_status,
        admin_handler::delete_booking,
        admin_handler::analytics,
        admin_handler::list_superusers,
        admin_handler::create_superuser,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            AuthProvider,
            UserResponse,
            UserSummary,
            Hotel,
            HotelView,
            RoomType,
            Room,
            RoomView,
            BookingStatus,
            PaymentMethod,
            Booking,
            BookingView,
            MonthlyRevenue,
            // Service outputs
            AuthResponse,
            CreatedOrder,
            VerifiedPayment,
            HotelOwnerSummary,
            Overview,
            BookingCounts,
            Analytics,
            // Request bodies
            auth_handler::SignupRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateProfileRequest,
            user_handler::UpdatePasswordRequest,
            hotel_handler::CreateHotelRequest,
            hotel_handler::UpdateHotelRequest,
            room_handler::CreateRoomRequest,
            room_handler::UpdateRoomRequest,
            booking_handler::CreateBookingRequest,
            booking_handler::UpdateBookingRequest,
            payment_handler::CreateOrderRequest,
            payment_handler::VerifyPaymentRequest,
            admin_handler::CreateUserRequest,
            admin_handler::AdminUpdateUserRequest,
            admin_handler::UpdateStatusRequest,
            admin_handler::CreateSuperuserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, login and Google sign-in"),
        (name = "Users", description = "Profile management"),
        (name = "Hotels", description = "Hotel listings and owner management"),
        (name = "Rooms", description = "Room search and management"),
        (name = "Bookings", description = "Reservations"),
        (name = "Payment", description = "Razorpay checkout"),
        (name = "Admin", description = "Platform administration")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_module_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/signup",
            "/api/users/profile",
            "/api/hotels/{id}",
            "/api/rooms",
            "/api/bookings/hotel/{hotel_id}",
            "/api/payment/verify",
            "/api/admin/analytics",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
