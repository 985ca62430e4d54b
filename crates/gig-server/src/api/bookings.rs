//! Booking API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gig_core::models::{BookingRequest, BookingStatus};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::error::{failure, malformed_body, rejection};
use crate::intake::{BookingIntake, IntakeError, IntakeOutcome};
use crate::persistence::bookings::{self, BookingFilter};
use crate::state::AppState;

/// Create a booking after the walking-time conflict check.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Response, IntakeError> {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(err) => return Ok(malformed_body(err)),
    };
    let outcome = BookingIntake::new(&state).create(request).await?;
    Ok(match outcome {
        IntakeOutcome::Created(booking) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Booking created successfully",
                "data": booking,
            })),
        )
            .into_response(),
        IntakeOutcome::Rejected(decision) => rejection(decision),
    })
}

/// Run the conflict check without creating anything.
pub async fn check_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Response, IntakeError> {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(err) => return Ok(malformed_body(err)),
    };
    let decision = BookingIntake::new(&state).check(&request).await?;
    Ok(Json(decision).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub provider_id: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBookingsQuery>,
) -> Response {
    let status = match query.status.as_deref().map(str::parse::<BookingStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(err)) => return failure(StatusCode::BAD_REQUEST, err.to_string()),
        None => None,
    };
    let filter = BookingFilter {
        provider_id: query.provider_id,
        customer_id: query.customer_id,
        status,
    };

    match bookings::list_bookings(state.db().pool(), &filter).await {
        Ok(list) => Json(json!({
            "success": true,
            "count": list.len(),
            "data": list,
        }))
        .into_response(),
        Err(err) => {
            tracing::error!("Failed to list bookings: {:#}", err);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching bookings")
        }
    }
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match bookings::load_booking(state.db().pool(), &id).await {
        Ok(Some(booking)) => Json(json!({ "success": true, "data": booking })).into_response(),
        Ok(None) => failure(StatusCode::NOT_FOUND, "Booking not found"),
        Err(err) => {
            tracing::error!("Failed to load booking {}: {:#}", id, err);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching booking")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Response, IntakeError> {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(err) => return Ok(malformed_body(err)),
    };
    let booking = BookingIntake::new(&state)
        .update_status(&id, request.status)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Booking status updated successfully",
        "data": booking,
    }))
    .into_response())
}

/// Cancel rather than delete, so the history stays intact.
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, IntakeError> {
    BookingIntake::new(&state)
        .update_status(&id, BookingStatus::Cancelled)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Booking cancelled successfully",
    }))
    .into_response())
}
