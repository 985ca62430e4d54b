//! Scheduling rules and thresholds for booking intake.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for walking-time estimates and the conflict check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingRules {
    /// Nominal pedestrian speed in km/h
    pub walking_speed_kmh: f64,
    /// Multiplier for sidewalks, crossings and stairs vs. straight-line travel
    pub campus_factor: f64,
    /// Safety margin added on top of the rounded walking time (minutes)
    pub travel_buffer_minutes: u32,
    /// How far before and after the candidate the snapshot must reach (minutes)
    pub snapshot_window_minutes: i64,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 5.0,
            campus_factor: 1.3,
            travel_buffer_minutes: 5,
            snapshot_window_minutes: 120,
        }
    }
}

impl SchedulingRules {
    /// Effective speed once the campus factor is applied.
    pub fn effective_speed_kmh(&self) -> f64 {
        self.walking_speed_kmh / self.campus_factor
    }

    /// Instant range whose bookings must be loaded to evaluate `[start, end)`.
    ///
    /// `None` when widening either bound leaves chrono's representable range.
    pub fn snapshot_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let window = Duration::try_minutes(self.snapshot_window_minutes)?;
        Some((
            start.checked_sub_signed(window)?,
            end.checked_add_signed(window)?,
        ))
    }
}
