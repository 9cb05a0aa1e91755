//! HTTP surface of the marketplace.
//!
//! Everything is mounted under `/api`: public browsing of hotels and rooms,
//! authenticated bookings and payments, owner management and the admin
//! console. Swagger UI is served from `/swagger-ui`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
