//! Test modules for the booking core
//!
//! Organised by component; `helpers` builds the shared fixture.

mod calendar;
mod concurrent;
mod helpers;
mod slots;
