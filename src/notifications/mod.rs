//! Booking notifications
//!
//! The ledger publishes an event for every appointment state change so the
//! transport can tell the master about new proposals and tell clients about
//! confirmations, rejections and expiries.

pub mod error;
pub mod event;
pub mod manager;

pub use error::{NotificationError, NotificationResult};
pub use event::{BookingEvent, BookingEventKind, EventFilter};
pub use manager::{EventReceiver, NotificationManager};

#[cfg(test)]
mod tests;
