//! Notification sink (external collaborator).
//!
//! Outcomes are reported to the sink on a best-effort basis: the engine
//! logs and swallows delivery failures, and never rolls back a booking,
//! cancellation or promotion because a notification failed.

use std::sync::{Mutex, PoisonError};

use crate::domain::{Booking, Locator, Occupancy, OccupancyId, SeatId};

/// Error from notification delivery.
#[derive(Debug, Clone, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Sink informed of booking outcomes, fire-and-forget.
pub trait NotificationSink {
    /// A booking completed (possibly with every passenger waiting).
    fn booking_completed(
        &self,
        booking: &Booking,
        occupancies: &[Occupancy],
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    /// Occupancies of a booking were cancelled, with the refund owed.
    fn cancelled(
        &self,
        booking: &Booking,
        cancelled: &[Occupancy],
        refund: u32,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    /// A waiting occupancy was promoted to a confirmed seat.
    fn promoted(&self, occupancy: &Occupancy)
    -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Sink that logs outcomes via `tracing` and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    async fn booking_completed(
        &self,
        booking: &Booking,
        occupancies: &[Occupancy],
    ) -> Result<(), NotifyError> {
        let confirmed = occupancies.iter().filter(|o| o.is_confirmed()).count();
        tracing::info!(
            locator = %booking.locator,
            vehicle = %booking.vehicle,
            confirmed,
            waiting = occupancies.len() - confirmed,
            "booking completed"
        );
        Ok(())
    }

    async fn cancelled(
        &self,
        booking: &Booking,
        cancelled: &[Occupancy],
        refund: u32,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            locator = %booking.locator,
            cancelled = cancelled.len(),
            refund,
            "occupancies cancelled"
        );
        Ok(())
    }

    async fn promoted(&self, occupancy: &Occupancy) -> Result<(), NotifyError> {
        tracing::info!(
            occupancy = %occupancy.id,
            locator = %occupancy.booking,
            seat = occupancy.seat.as_ref().map(|s| s.to_string()),
            "waitlisted passenger promoted"
        );
        Ok(())
    }
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    async fn booking_completed(
        &self,
        _booking: &Booking,
        _occupancies: &[Occupancy],
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn cancelled(
        &self,
        _booking: &Booking,
        _cancelled: &[Occupancy],
        _refund: u32,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn promoted(&self, _occupancy: &Occupancy) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// A notification observed by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Booking completed with the given confirmed/waiting split.
    BookingCompleted {
        locator: Locator,
        confirmed: usize,
        waiting: usize,
    },
    /// Occupancies cancelled with the refund owed.
    Cancelled {
        locator: Locator,
        cancelled: usize,
        refund: u32,
    },
    /// A waiting occupancy took a freed seat.
    Promoted {
        occupancy: OccupancyId,
        seat: Option<SeatId>,
    },
}

/// Sink that records notifications for inspection in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingSink {
    /// Create a sink that records and succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that records and then reports delivery failure,
    /// for exercising the engine's swallow-and-log path.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// The notifications observed so far.
    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, event: Notification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        if self.fail {
            Err(NotifyError("sink configured to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

impl NotificationSink for RecordingSink {
    async fn booking_completed(
        &self,
        booking: &Booking,
        occupancies: &[Occupancy],
    ) -> Result<(), NotifyError> {
        let confirmed = occupancies.iter().filter(|o| o.is_confirmed()).count();
        self.record(Notification::BookingCompleted {
            locator: booking.locator,
            confirmed,
            waiting: occupancies.len() - confirmed,
        })
    }

    async fn cancelled(
        &self,
        booking: &Booking,
        cancelled: &[Occupancy],
        refund: u32,
    ) -> Result<(), NotifyError> {
        self.record(Notification::Cancelled {
            locator: booking.locator,
            cancelled: cancelled.len(),
            refund,
        })
    }

    async fn promoted(&self, occupancy: &Occupancy) -> Result<(), NotifyError> {
        self.record(Notification::Promoted {
            occupancy: occupancy.id,
            seat: occupancy.seat.clone(),
        })
    }
}
