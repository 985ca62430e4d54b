//! Mapping of intake results onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gig_core::ConflictDecision;
use serde_json::json;

use crate::intake::IntakeError;

/// `{ "success": false, "message": ... }` with the given status.
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// An unreadable or incomplete JSON body. Always 400, so it is never
/// mistaken for an input fault (422).
pub fn malformed_body(rejection: JsonRejection) -> Response {
    failure(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// A scheduling rejection, surfaced verbatim with its classification.
pub fn rejection(decision: ConflictDecision) -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "success": false,
            "message": decision.message,
            "conflictType": decision.conflict_type,
            "details": decision.details,
        })),
    )
        .into_response()
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        match self {
            IntakeError::Invalid(message) => failure(StatusCode::BAD_REQUEST, message),
            IntakeError::Input(fault) => {
                failure(StatusCode::UNPROCESSABLE_ENTITY, fault.to_string())
            }
            IntakeError::NotFound(id) => {
                failure(StatusCode::NOT_FOUND, format!("Booking not found: {}", id))
            }
            IntakeError::Upstream(err) => {
                tracing::error!("Booking intake failed: {:#}", err);
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to check schedule; booking not created",
                )
            }
        }
    }
}
