//! Reservation model and its status state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Reservation lifecycle.
///
/// ```text
/// (create) -> PENDING -> CONFIRMED
///             PENDING | CONFIRMED -> CANCELLED
/// ```
///
/// `CANCELLED` and `COMPLETED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether the reservation still holds its room.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    pub fn confirm(self) -> Result<Self, AppError> {
        match self {
            Self::Pending => Ok(Self::Confirmed),
            _ => Err(AppError::Conflict(anyhow::anyhow!(
                "only pending reservations can be confirmed"
            ))),
        }
    }

    pub fn cancel(self) -> Result<Self, AppError> {
        match self {
            Self::Pending | Self::Confirmed => Ok(Self::Cancelled),
            Self::Cancelled => Err(AppError::Conflict(anyhow::anyhow!(
                "reservation is already cancelled"
            ))),
            Self::Completed => Err(AppError::Conflict(anyhow::anyhow!(
                "cannot cancel completed reservation"
            ))),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(AppError::BadRequest(anyhow::anyhow!(
                "unknown reservation status '{}'",
                other
            ))),
        }
    }
}

/// A status change a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Confirm,
    Cancel,
}

impl StatusChange {
    /// Parse the target status from a `PUT /reservations/:id/status` body.
    pub fn from_target(status: &str) -> Result<Self, AppError> {
        match status {
            "CONFIRMED" => Ok(Self::Confirm),
            "CANCELLED" => Ok(Self::Cancel),
            _ => Err(AppError::BadRequest(anyhow::anyhow!(
                "invalid status. Use CANCELLED or CONFIRMED"
            ))),
        }
    }

    pub fn apply(self, from: ReservationStatus) -> Result<ReservationStatus, AppError> {
        match self {
            Self::Confirm => from.confirm(),
            Self::Cancel => from.cancel(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
        }
    }
}

/// Half-open stay `[start, end)` in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `None` unless `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Two stays overlap when they share at least one night. Back-to-back
    /// stays (one ends the day the other starts) do not.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}

impl Reservation {
    pub fn parsed_status(&self) -> Result<ReservationStatus, AppError> {
        self.status.parse().map_err(|_| {
            AppError::InternalError(anyhow::anyhow!(
                "reservation {} has unknown status '{}'",
                self.reservation_id,
                self.status
            ))
        })
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// A validated booking request, ready to be written as `PENDING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub user_id: String,
    pub range: DateRange,
    pub created_by: Option<Uuid>,
}

/// New room and dates for an existing reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reschedule {
    pub room_id: Uuid,
    pub range: DateRange,
    pub updated_by: Option<Uuid>,
}
