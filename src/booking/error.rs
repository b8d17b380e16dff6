//! Booking Error Types

use chrono::NaiveDate;
use strum_macros::Display;

use crate::booking::types::{AppointmentId, AppointmentStatus, TimeWindow};
use crate::core::error_handling::ContextualError;

/// What a `NotFound` error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntityKind {
    Service,
    Appointment,
    #[strum(to_string = "Pending input")]
    PendingInput,
}

/// Who may perform an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RequiredRole {
    Master,
    Client,
    Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("{requested} on {date} overlaps appointment {existing}")]
    Conflict {
        date: NaiveDate,
        requested: TimeWindow,
        existing: AppointmentId,
    },

    #[error("Cannot {action} appointment {id}: it is {status}")]
    InvalidState {
        id: AppointmentId,
        status: AppointmentStatus,
        action: &'static str,
    },

    #[error("Permission denied: {action} is reserved for the {required}")]
    PermissionDenied {
        action: &'static str,
        required: RequiredRole,
    },

    #[error("Ledger invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ContextualError for BookingError {
    fn is_user_actionable(&self) -> bool {
        !matches!(
            self,
            BookingError::InvariantViolation { .. } | BookingError::Internal { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        if self.is_user_actionable() {
            Some(self.to_string())
        } else {
            None
        }
    }
}

/// Result type for booking operations
pub type BookingResult<T> = Result<T, BookingError>;
