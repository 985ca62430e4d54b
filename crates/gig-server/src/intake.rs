//! Booking intake: loads the provider's schedule, runs the conflict resolver
//! and persists accepted bookings.
//!
//! Creation for a single provider is serialized through the provider lock in
//! [`AppState`], so two requests can never both pass the check against the
//! same stale snapshot.

use chrono::Utc;
use gig_core::models::{Booking, BookingInterval, BookingRequest, BookingStatus, ConflictDecision};
use gig_core::InputFault;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::persistence::{bookings, is_storable, locations};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum IntakeError {
    /// Malformed request (missing fields, self-booking, bad transition)
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Input(#[from] InputFault),

    #[error("Booking not found: {0}")]
    NotFound(String),

    /// Storage failed; bookability cannot be determined
    #[error("Unable to check schedule: {0}")]
    Upstream(anyhow::Error),
}

impl From<anyhow::Error> for IntakeError {
    fn from(err: anyhow::Error) -> Self {
        IntakeError::Upstream(err)
    }
}

#[derive(Debug)]
pub enum IntakeOutcome {
    Created(Booking),
    Rejected(ConflictDecision),
}

pub struct BookingIntake<'a> {
    state: &'a AppState,
}

impl<'a> BookingIntake<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Evaluate and, if accepted, persist a new pending booking.
    pub async fn create(&self, request: BookingRequest) -> Result<IntakeOutcome, IntakeError> {
        validate(&request)?;
        let _guard = self.state.lock_provider(&request.provider_id).await;

        let started = Instant::now();
        let decision = self.evaluate(&request).await?;
        if !decision.can_book {
            tracing::info!(
                provider_id = %request.provider_id,
                conflict_type = ?decision.conflict_type,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Booking rejected"
            );
            return Ok(IntakeOutcome::Rejected(decision));
        }

        let booking = Booking {
            booking_id: Uuid::new_v4().to_string(),
            provider_id: request.provider_id,
            customer_id: request.customer_id,
            location_id: request.location_id,
            service_id: request.service_id,
            start_at: request.start_at,
            ends_at: request.ends_at,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        bookings::insert_booking(self.state.db().pool(), &booking).await?;

        tracing::info!(
            booking_id = %booking.booking_id,
            provider_id = %booking.provider_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Booking created"
        );
        Ok(IntakeOutcome::Created(booking))
    }

    /// Dry run of [`create`](Self::create): same checks, nothing persisted.
    pub async fn check(&self, request: &BookingRequest) -> Result<ConflictDecision, IntakeError> {
        validate(request)?;
        self.evaluate(request).await
    }

    /// Move a booking to `status`. Completed and cancelled are terminal.
    pub async fn update_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<Booking, IntakeError> {
        let pool = self.state.db().pool();
        let Some(provider_id) = bookings::load_booking(pool, booking_id)
            .await?
            .map(|b| b.provider_id)
        else {
            return Err(IntakeError::NotFound(booking_id.to_string()));
        };

        // Share the intake lock so a status change never races a new booking.
        let _guard = self.state.lock_provider(&provider_id).await;
        let Some(mut booking) = bookings::load_booking(pool, booking_id).await? else {
            return Err(IntakeError::NotFound(booking_id.to_string()));
        };

        if booking.status == status {
            return Ok(booking);
        }
        if !booking.status.is_active() {
            return Err(IntakeError::Invalid(format!(
                "Booking is already {}",
                booking.status
            )));
        }
        if status == BookingStatus::Pending {
            return Err(IntakeError::Invalid(
                "A confirmed booking cannot return to pending".to_string(),
            ));
        }

        if !bookings::update_booking_status(pool, booking_id, status).await? {
            return Err(IntakeError::NotFound(booking_id.to_string()));
        }

        tracing::info!(booking_id, %status, "Booking status updated");
        booking.status = status;
        Ok(booking)
    }

    async fn evaluate(&self, request: &BookingRequest) -> Result<ConflictDecision, IntakeError> {
        let pool = self.state.db().pool();
        let location = locations::load_location(pool, &request.location_id)
            .await?
            .ok_or_else(|| InputFault::UnknownLocation {
                location_id: request.location_id.clone(),
            })?;

        let (window_start, window_end) = self
            .state
            .rules()
            .snapshot_window(request.start_at, request.ends_at)
            .ok_or_else(|| IntakeError::Invalid(OUT_OF_RANGE.to_string()))?;
        let existing = bookings::load_active_intervals(
            pool,
            &request.provider_id,
            window_start,
            window_end,
        )
        .await?;
        tracing::debug!(
            provider_id = %request.provider_id,
            count = existing.len(),
            "Loaded existing bookings in window"
        );

        let candidate = BookingInterval::candidate(
            request.provider_id.clone(),
            location,
            request.start_at,
            request.ends_at,
        );
        Ok(self.state.resolver().evaluate(&candidate, &existing)?)
    }
}

const OUT_OF_RANGE: &str = "Booking times must fall between years 0000 and 9999";

fn validate(request: &BookingRequest) -> Result<(), IntakeError> {
    if request.provider_id.trim().is_empty()
        || request.customer_id.trim().is_empty()
        || request.location_id.trim().is_empty()
    {
        return Err(IntakeError::Invalid(
            "Please provide all required fields".to_string(),
        ));
    }
    if request.provider_id == request.customer_id {
        return Err(IntakeError::Invalid(
            "Cannot book your own service".to_string(),
        ));
    }
    if !is_storable(request.start_at) || !is_storable(request.ends_at) {
        return Err(IntakeError::Invalid(OUT_OF_RANGE.to_string()));
    }
    if request.ends_at <= request.start_at {
        return Err(InputFault::InvalidInterval {
            booking_id: None,
            start: request.start_at,
            end: request.ends_at,
        }
        .into());
    }
    Ok(())
}
