//! Booking lifecycle events

use chrono::NaiveDateTime;
use strum_macros::Display;

use crate::booking::types::Appointment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BookingEventKind {
    /// A client reserved a slot; the master has to confirm or reject it
    Proposed,
    Confirmed,
    Rejected,
    Cancelled,
    /// The proposal was not confirmed in time
    Expired,
}

/// An appointment state change, carrying the appointment after the change
#[derive(Clone, Debug, PartialEq)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub timestamp: NaiveDateTime,
    pub appointment: Appointment,
}

impl BookingEvent {
    pub fn new(kind: BookingEventKind, timestamp: NaiveDateTime, appointment: Appointment) -> Self {
        Self {
            kind,
            timestamp,
            appointment,
        }
    }
}

/// Which events a subscriber wants to see
#[derive(Clone, Debug, PartialEq)]
pub enum EventFilter {
    All,
    Kinds(Vec<BookingEventKind>),
    /// Events about one client's appointments
    Client(String),
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &BookingEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Kinds(kinds) => kinds.contains(&event.kind),
            EventFilter::Client(client_id) => event.appointment.client_id == *client_id,
        }
    }
}
