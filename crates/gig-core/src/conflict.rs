//! Booking conflict resolution for campus service providers.
//!
//! Decides whether a candidate booking fits into a provider's schedule,
//! checking direct time overlap and then the walking time to and from the
//! nearest neighbouring bookings.

use std::cmp::Ordering;

use crate::distance::DistanceEngine;
use crate::error::InputFault;
use crate::models::{
    BookingInterval, ConflictDecision, ConflictDetails, ConflictType, Coordinate, Location,
};
use crate::rules::SchedulingRules;

const TIME_FORMAT: &str = "%H:%M";

/// Stateless conflict resolver. Safe to share across threads; every call
/// works only on the snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver {
    engine: DistanceEngine,
}

impl ConflictResolver {
    pub fn new(rules: &SchedulingRules) -> Self {
        Self {
            engine: DistanceEngine::new(rules),
        }
    }

    pub fn engine(&self) -> &DistanceEngine {
        &self.engine
    }

    /// Evaluate `candidate` against the provider's existing bookings.
    ///
    /// Returns `Ok` with a rejection for scheduling conflicts and `Err` only
    /// for structurally invalid input. Bookings for other providers and
    /// inactive bookings in `existing` are ignored. Checks run in order and
    /// the first violation wins:
    ///
    /// 1. candidate coordinates must be known
    /// 2. no overlap with any existing booking
    /// 3. enough time to walk from the immediate predecessor
    /// 4. enough time to walk to the immediate successor
    pub fn evaluate(
        &self,
        candidate: &BookingInterval,
        existing: &[BookingInterval],
    ) -> Result<ConflictDecision, InputFault> {
        ensure_valid_interval(candidate)?;
        let candidate_coord = coordinate_of(&candidate.location)?;

        let active: Vec<&BookingInterval> = existing
            .iter()
            .filter(|b| b.is_active() && b.provider_id == candidate.provider_id)
            .collect();
        for booking in &active {
            ensure_valid_interval(booking)?;
        }

        // Earliest-starting overlap is reported so the outcome does not
        // depend on snapshot order.
        if let Some(overlap) = active
            .iter()
            .copied()
            .filter(|b| candidate.overlaps(b))
            .min_by(|a, b| a.start.cmp(&b.start).then_with(|| cmp_ids(a, b)))
        {
            tracing::debug!(
                provider_id = %candidate.provider_id,
                booking_id = ?overlap.booking_id,
                "candidate overlaps existing booking"
            );
            return Ok(time_overlap(candidate, overlap));
        }

        let predecessor = active
            .iter()
            .copied()
            .filter(|b| b.end <= candidate.start)
            .max_by(|a, b| a.end.cmp(&b.end).then_with(|| cmp_ids(b, a)));

        if let Some(previous) = predecessor {
            let travel = self
                .engine
                .estimate_travel_minutes(coordinate_of(&previous.location)?, candidate_coord);
            let required = travel.saturating_add(self.engine.buffer_minutes());
            let available = (candidate.start - previous.end).num_minutes();
            tracing::debug!(
                available_minutes = available,
                required_minutes = required,
                "previous booking check"
            );

            if available < i64::from(required) {
                let message = walking_message(&previous.location, &candidate.location, travel, available);
                return Ok(ConflictDecision::reject(
                    ConflictType::WalkingTimeAfter,
                    message,
                    ConflictDetails {
                        booking: previous.summary(),
                        travel_minutes: Some(travel),
                        required_minutes: Some(required),
                        available_minutes: Some(available),
                        candidate: candidate.summary(),
                    },
                ));
            }
        }

        let successor = active
            .iter()
            .copied()
            .filter(|b| b.start >= candidate.end)
            .min_by(|a, b| a.start.cmp(&b.start).then_with(|| cmp_ids(a, b)));

        if let Some(next) = successor {
            let travel = self
                .engine
                .estimate_travel_minutes(candidate_coord, coordinate_of(&next.location)?);
            let required = travel.saturating_add(self.engine.buffer_minutes());
            let available = (next.start - candidate.end).num_minutes();
            tracing::debug!(
                available_minutes = available,
                required_minutes = required,
                "next booking check"
            );

            if available < i64::from(required) {
                let message = walking_message(&candidate.location, &next.location, travel, available);
                return Ok(ConflictDecision::reject(
                    ConflictType::WalkingTimeBefore,
                    message,
                    ConflictDetails {
                        booking: next.summary(),
                        travel_minutes: Some(travel),
                        required_minutes: Some(required),
                        available_minutes: Some(available),
                        candidate: candidate.summary(),
                    },
                ));
            }
        }

        Ok(ConflictDecision::accept())
    }
}

fn ensure_valid_interval(booking: &BookingInterval) -> Result<(), InputFault> {
    if booking.end <= booking.start {
        return Err(InputFault::InvalidInterval {
            booking_id: booking.booking_id.clone(),
            start: booking.start,
            end: booking.end,
        });
    }
    Ok(())
}

fn coordinate_of(location: &Location) -> Result<Coordinate, InputFault> {
    location
        .coordinate
        .ok_or_else(|| InputFault::MissingCoordinates {
            location_id: location.location_id.clone(),
            name: location.name.clone(),
        })
}

fn cmp_ids(a: &BookingInterval, b: &BookingInterval) -> Ordering {
    a.booking_id.cmp(&b.booking_id)
}

fn time_overlap(candidate: &BookingInterval, existing: &BookingInterval) -> ConflictDecision {
    ConflictDecision::reject(
        ConflictType::TimeOverlap,
        format!(
            "Time conflict: Provider already has a booking from {} to {} at {}",
            existing.start.format(TIME_FORMAT),
            existing.end.format(TIME_FORMAT),
            existing.location.label(),
        ),
        ConflictDetails {
            booking: existing.summary(),
            travel_minutes: None,
            required_minutes: None,
            available_minutes: None,
            candidate: candidate.summary(),
        },
    )
}

fn walking_message(from: &Location, to: &Location, travel: u32, available: i64) -> String {
    format!(
        "Cannot make booking: Walking time from {} to {} requires {} minutes, \
         but only {} minutes available between bookings.",
        from.label(),
        to.label(),
        travel,
        available,
    )
}
