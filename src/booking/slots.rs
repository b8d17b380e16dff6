//! Slot resolution
//!
//! Turns the calendar's open windows and the ledger's active appointments into
//! the list of start times a client may book for a service.

use chrono::{NaiveDate, Timelike};
use std::sync::Arc;

use crate::booking::calendar::Calendar;
use crate::booking::catalog::Catalog;
use crate::booking::error::{BookingError, BookingResult};
use crate::booking::ledger::Ledger;
use crate::booking::types::{format_minute, Minute, TimeWindow, ACTIVE_STATUSES};
use crate::core::time::Clock;

pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 60;

/// Subtract `occupied` from `window`
///
/// `occupied` must be sorted by start. Returns the free parts in order.
pub fn free_intervals(window: TimeWindow, occupied: &[TimeWindow]) -> Vec<TimeWindow> {
    let mut free = Vec::new();
    let mut cursor = window.start;
    for busy in occupied {
        if busy.end <= cursor || busy.start >= window.end {
            continue;
        }
        if busy.start > cursor {
            free.push(TimeWindow::new(cursor, busy.start));
        }
        cursor = cursor.max(busy.end);
        if cursor >= window.end {
            break;
        }
    }
    if cursor < window.end {
        free.push(TimeWindow::new(cursor, window.end));
    }
    free
}

/// Grid points anchored at `anchor` that start inside `free` and fit `duration`
pub fn grid_starts(anchor: Minute, free: TimeWindow, duration: u32, granularity: u32) -> Vec<Minute> {
    let step = granularity.max(1);
    let offset = free.start.saturating_sub(anchor);
    let mut start = anchor + offset.div_ceil(step) * step;
    let mut starts = Vec::new();
    while start + duration <= free.end {
        starts.push(start);
        start += step;
    }
    starts
}

pub struct SlotResolver {
    catalog: Arc<Catalog>,
    calendar: Arc<Calendar>,
    ledger: Arc<Ledger>,
    clock: Arc<dyn Clock>,
    granularity: u32,
}

impl SlotResolver {
    pub fn new(
        catalog: Arc<Catalog>,
        calendar: Arc<Calendar>,
        ledger: Arc<Ledger>,
        clock: Arc<dyn Clock>,
        granularity: u32,
    ) -> Self {
        Self {
            catalog,
            calendar,
            ledger,
            clock,
            granularity: granularity.max(1),
        }
    }

    pub fn granularity(&self) -> u32 {
        self.granularity
    }

    /// Start minutes on `date` at which `service_id` can be booked, ascending
    pub fn available_slots(&self, service_id: &str, date: NaiveDate) -> BookingResult<Vec<Minute>> {
        let duration = self.catalog.get_service(service_id)?.duration_minutes;
        let granularity = self.granularity;
        let now = self.clock.now();
        self.ledger.expire_stale(now)?;

        let today = now.date();
        if date < today {
            return Ok(Vec::new());
        }
        let earliest = if date == today {
            now.hour() * 60 + now.minute()
        } else {
            0
        };

        let occupied: Vec<TimeWindow> = self
            .ledger
            .list_for_date(date, &ACTIVE_STATUSES)?
            .iter()
            .map(|a| a.window())
            .collect();

        let mut slots: Vec<Minute> = self
            .calendar
            .open_windows(date)?
            .into_iter()
            .flat_map(|window| {
                free_intervals(window, &occupied)
                    .into_iter()
                    .flat_map(move |free| {
                        grid_starts(window.start, free, duration, granularity)
                    })
            })
            .filter(|start| *start >= earliest)
            .collect();
        slots.sort_unstable();
        slots.dedup();

        log::debug!(
            "{} slot(s) for {} on {}: {:?}",
            slots.len(),
            service_id,
            date,
            slots
        );
        Ok(slots)
    }

    /// Fail unless `start` is one of the offered slots for the service on `date`
    ///
    /// An occupied start is left to the ledger so the caller sees a conflict
    /// naming the blocking appointment.
    pub fn check_bookable(&self, service_id: &str, date: NaiveDate, start: Minute) -> BookingResult<()> {
        let service = self.catalog.get_service(service_id)?;
        let now = self.clock.now();
        let today = now.date();
        if date < today || (date == today && start < now.hour() * 60 + now.minute()) {
            return Err(BookingError::validation(format!(
                "{} {} is in the past",
                date,
                format_minute(start)
            )));
        }

        let requested = TimeWindow::new(start, start.saturating_add(service.duration_minutes));
        let windows = self.calendar.open_windows(date)?;
        let window = windows
            .iter()
            .find(|w| w.contains(&requested))
            .ok_or_else(|| {
                BookingError::validation(format!(
                    "{} on {} is outside working hours",
                    requested, date
                ))
            })?;
        if (start - window.start) % self.granularity != 0 {
            return Err(BookingError::validation(format!(
                "{} is not on the {}-minute slot grid",
                format_minute(start),
                self.granularity
            )));
        }
        Ok(())
    }
}
