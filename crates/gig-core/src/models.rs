//! Core data models for campus bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A physical campus location, usually a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    pub name: String,
    /// Short building code, e.g. "LIB"
    #[serde(default)]
    pub code: Option<String>,
    /// Absent when the building has never been surveyed
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

impl Location {
    pub fn new(location_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            name: name.into(),
            code: None,
            coordinate: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_coordinate(mut self, lat: f64, lng: f64) -> Self {
        self.coordinate = Some(Coordinate::new(lat, lng));
        self
    }

    /// "Name (CODE)" when a code exists, otherwise just the name.
    pub fn label(&self) -> String {
        match &self.code {
            Some(code) => format!("{} ({})", self.name, code),
            None => self.name.clone(),
        }
    }
}

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Only pending and confirmed bookings are scheduling obligations.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown booking status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A committed or candidate booking slot for a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingInterval {
    /// None for a candidate that has not been persisted yet
    #[serde(default)]
    pub booking_id: Option<String>,
    pub provider_id: String,
    pub location: Location,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl BookingInterval {
    /// Create a pending interval with no booking id.
    pub fn candidate(
        provider_id: impl Into<String>,
        location: Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id: None,
            provider_id: provider_id.into(),
            location,
            start,
            end,
            status: BookingStatus::Pending,
        }
    }

    pub fn with_id(mut self, booking_id: impl Into<String>) -> Self {
        self.booking_id = Some(booking_id.into());
        self
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Inclusive-exclusive intersection: `[s1,e1)` and `[s2,e2)` overlap iff
    /// `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &BookingInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn summary(&self) -> BookingSummary {
        BookingSummary {
            booking_id: self.booking_id.clone(),
            start: self.start,
            end: self.end,
            location: LocationSummary::from(&self.location),
        }
    }
}

/// Classification of a scheduling rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// The candidate intersects an existing booking
    TimeOverlap,
    /// Not enough time to walk from the candidate to the next booking
    WalkingTimeBefore,
    /// Not enough time to walk from the previous booking to the candidate
    WalkingTimeAfter,
}

impl ConflictType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictType::TimeOverlap => "time_overlap",
            ConflictType::WalkingTimeBefore => "walking_time_before",
            ConflictType::WalkingTimeAfter => "walking_time_after",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub location_id: String,
    pub name: String,
    pub code: Option<String>,
}

impl From<&Location> for LocationSummary {
    fn from(location: &Location) -> Self {
        Self {
            location_id: location.location_id.clone(),
            name: location.name.clone(),
            code: location.code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub booking_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: LocationSummary,
}

/// Everything a UI needs to explain a rejection without re-deriving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetails {
    /// The colliding or adjacent existing booking
    pub booking: BookingSummary,
    /// Rounded walking time between the two locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_minutes: Option<u32>,
    /// Walking time plus buffer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_minutes: Option<u32>,
    /// Whole minutes between the two bookings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_minutes: Option<i64>,
    pub candidate: BookingSummary,
}

/// Result of evaluating a candidate booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDecision {
    pub can_book: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_type: Option<ConflictType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ConflictDetails>,
}

impl ConflictDecision {
    pub fn accept() -> Self {
        Self {
            can_book: true,
            message: "No scheduling conflicts".to_string(),
            conflict_type: None,
            details: None,
        }
    }

    pub fn reject(
        conflict_type: ConflictType,
        message: impl Into<String>,
        details: ConflictDetails,
    ) -> Self {
        Self {
            can_book: false,
            message: message.into(),
            conflict_type: Some(conflict_type),
            details: Some(details),
        }
    }
}

/// A persisted booking between a customer and a service provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub provider_id: String,
    pub customer_id: String,
    pub location_id: String,
    #[serde(default)]
    pub service_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Attach the resolved location to produce a schedulable interval.
    pub fn to_interval(&self, location: Location) -> BookingInterval {
        BookingInterval {
            booking_id: Some(self.booking_id.clone()),
            provider_id: self.provider_id.clone(),
            location,
            start: self.start_at,
            end: self.ends_at,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub provider_id: String,
    pub customer_id: String,
    pub location_id: String,
    #[serde(default)]
    pub service_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}
