//! Salon Booking Core
//!
//! The scheduling domain of a single-master salon: what can be booked, when
//! the master works, who holds which time, and which start times are still
//! free for a given service.
//!
//! # Components
//!
//! - [`catalog`]: bookable services keyed by a slug of their name
//! - [`calendar`]: weekly template plus per-date overrides, yielding the open
//!   windows of a date
//! - [`ledger`]: appointments and their lifecycle
//!   (`proposed -> confirmed -> cancelled`); guarantees that active
//!   appointments never overlap
//! - [`slots`]: free start times for a service on a date
//! - [`session`]: pending multi-step input per actor
//! - [`scheduler`]: the facade that checks roles and routes intents
//!
//! Times of day are minutes after midnight and every interval is half-open,
//! so an appointment ending at 14:00 and one starting at 14:00 do not collide.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use salonbook::booking::api::*;
//! use salonbook::core::time::SystemClock;
//!
//! # fn main() -> Result<(), BookingError> {
//! let scheduler = Scheduler::new(
//!     SchedulerConfig::default(),
//!     Catalog::with_default_services(),
//!     WeeklyTemplate::default(),
//!     Arc::new(SystemClock),
//! )?;
//! let reply = scheduler.dispatch(&Actor::client("anna"), Intent::ListServices)?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod calendar;
pub mod catalog;
pub mod error;
pub mod intent;
pub mod ledger;
pub mod scheduler;
pub mod session;
pub mod slots;
pub mod types;

#[cfg(test)]
mod tests;
