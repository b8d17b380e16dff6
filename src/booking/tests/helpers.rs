//! Shared fixture for booking unit tests

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::booking::api::*;
use crate::core::time::MockClock;
use crate::notifications::NotificationManager;

pub const CLASSIC: &str = "classic_manicure";
pub const GEL: &str = "gel_polish_manicure";
pub const REMOVAL: &str = "gel_polish_removal";

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

/// Catalog, calendar and ledger wired to one mock clock set to the Sunday before [`monday`]
pub struct Fixture {
    pub clock: Arc<MockClock>,
    pub catalog: Arc<Catalog>,
    pub calendar: Arc<Calendar>,
    pub ledger: Arc<Ledger>,
    pub notifications: Arc<NotificationManager>,
    pub resolver: SlotResolver,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_granularity(DEFAULT_SLOT_GRANULARITY_MINUTES)
    }

    pub fn with_granularity(granularity: u32) -> Self {
        let clock = Arc::new(MockClock::new(at(monday() - Duration::days(1), 9, 0)));
        let catalog = Arc::new(Catalog::with_default_services());
        let calendar = Arc::new(Calendar::new(WeeklyTemplate::default()).unwrap());
        let notifications = Arc::new(NotificationManager::new());
        let ledger = Arc::new(Ledger::new(
            catalog.clone(),
            clock.clone(),
            notifications.clone(),
            Duration::minutes(DEFAULT_PROPOSAL_GRACE_MINUTES),
        ));
        let resolver = SlotResolver::new(
            catalog.clone(),
            calendar.clone(),
            ledger.clone(),
            clock.clone(),
            granularity,
        );
        Self {
            clock,
            catalog,
            calendar,
            ledger,
            notifications,
            resolver,
        }
    }

    pub fn slots(&self, service_id: &str, date: NaiveDate) -> Vec<Minute> {
        self.resolver.available_slots(service_id, date).unwrap()
    }
}

pub fn scheduler_at(now: NaiveDateTime) -> (Arc<MockClock>, Scheduler) {
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
