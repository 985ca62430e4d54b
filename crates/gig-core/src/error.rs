//! Caller-contract violations, kept apart from scheduling rejections.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::ConflictDecision;

/// Structurally invalid input. A scheduling conflict is never an `InputFault`;
/// it is a normal [`ConflictDecision`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputFault {
    #[error("Invalid booking interval: end {end} is not after start {start}")]
    InvalidInterval {
        booking_id: Option<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Location {name} ({location_id}) has no coordinates")]
    MissingCoordinates { location_id: String, name: String },

    #[error("Location not found: {location_id}")]
    UnknownLocation { location_id: String },
}

impl InputFault {
    /// Render the fault as a rejection carrying no conflict classification.
    pub fn to_decision(&self) -> ConflictDecision {
        ConflictDecision {
            can_book: false,
            message: self.to_string(),
            conflict_type: None,
            details: None,
        }
    }
}
