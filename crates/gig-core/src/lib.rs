pub mod conflict;
pub mod distance;
pub mod error;
pub mod models;
pub mod rules;
pub mod spatial;

pub use conflict::ConflictResolver;
pub use distance::DistanceEngine;
pub use error::InputFault;
pub use models::{
    Booking, BookingInterval, BookingRequest, BookingStatus, BookingSummary, ConflictDecision, ConflictDetails,
    ConflictType, Coordinate, Location, LocationSummary,
};
pub use rules::SchedulingRules;
pub use spatial::haversine_distance_km;
