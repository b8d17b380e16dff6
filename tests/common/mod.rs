//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use salonbook::booking::api::*;
use salonbook::core::time::MockClock;

pub const CLASSIC: &str = "classic_manicure";
pub const GEL: &str = "gel_polish_manicure";

/// Monday 10 March 2025
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0).unwrap()
}

pub fn hm(hour: u32, minute: u32) -> Minute {
    hour * 60 + minute
}

/// A salon with the starter menu and default hours, as of `now`
pub fn salon_at(now: NaiveDateTime) -> (Arc<MockClock>, Scheduler) {
    let clock = Arc::new(MockClock::new(now));
    let scheduler = Scheduler::new(
        SchedulerConfig::default(),
        Catalog::with_default_services(),
        WeeklyTemplate::default(),
        clock.clone(),
    )
    .unwrap();
    (clock, scheduler)
}

pub fn book(
    scheduler: &Scheduler,
    client: &str,
    service_id: &str,
    date: NaiveDate,
    start: Minute,
) -> BookingResult<Appointment> {
    let intent = Intent::Book {
        service_id: service_id.to_string(),
        date,
        start,
    };
    match scheduler.dispatch(&Actor::client(client), intent)? {
        Reply::Appointment(appointment) => Ok(appointment),
        other => panic!("unexpected reply to a booking: {:?}", other),
    }
}

pub fn slots(scheduler: &Scheduler, service_id: &str, date: NaiveDate) -> Vec<Minute> {
    let intent = Intent::Slots {
        service_id: service_id.to_string(),
        date,
    };
    match scheduler.dispatch(&Actor::client("anyone"), intent).unwrap() {
        Reply::Slots { starts, .. } => starts,
        other => panic!("unexpected reply to slots: {:?}", other),
    }
}
