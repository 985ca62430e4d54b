//! Walking-time estimates between campus coordinates.

use crate::models::Coordinate;
use crate::rules::SchedulingRules;
use crate::spatial::distance_km;

/// Converts great-circle distance into a conservative walking time.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEngine {
    walking_speed_kmh: f64,
    campus_factor: f64,
    buffer_minutes: u32,
}

impl Default for DistanceEngine {
    fn default() -> Self {
        Self::new(&SchedulingRules::default())
    }
}

impl DistanceEngine {
    pub fn new(rules: &SchedulingRules) -> Self {
        Self {
            walking_speed_kmh: rules.walking_speed_kmh,
            campus_factor: rules.campus_factor,
            buffer_minutes: rules.travel_buffer_minutes,
        }
    }

    /// One-way walking time from `a` to `b` in whole minutes, rounded up.
    pub fn estimate_travel_minutes(&self, a: Coordinate, b: Coordinate) -> u32 {
        let km = distance_km(a, b);
        let minutes = km / self.walking_speed_kmh * 60.0 * self.campus_factor;
        // `as` saturates; NaN from malformed input maps to 0
        minutes.ceil() as u32
    }

    /// Walking time plus the travel buffer. The walking time is rounded
    /// before the buffer is added.
    pub fn required_minutes(&self, a: Coordinate, b: Coordinate) -> u32 {
        self.estimate_travel_minutes(a, b)
            .saturating_add(self.buffer_minutes)
    }

    pub fn buffer_minutes(&self) -> u32 {
        self.buffer_minutes
    }
}
