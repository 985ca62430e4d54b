//! REST API routes.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::{bookings, locations, request_id};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    let location_routes = Router::new()
        .route(
            "/v1/locations",
            get(locations::list_locations).post(locations::upsert_location),
        )
        .route("/v1/walking-time/calculate", get(locations::walking_time))
        // Kept for clients of the original building picker
        .route("/v1/walking-time/buildings", get(locations::list_locations));

    let booking_routes = Router::new()
        .route(
            "/v1/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/v1/bookings/check", post(bookings::check_booking))
        .route(
            "/v1/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking_status)
                .delete(bookings::cancel_booking),
        );

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(location_routes)
        .merge(booking_routes)
        .layer(middleware::from_fn(request_id::ensure_request_id))
}
