//! Availability calendar
//!
//! Holds the weekly template and sparse per-date overrides, and turns them into
//! the open windows of a given date before any booking is taken into account.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::booking::error::{BookingError, BookingResult};
use crate::booking::types::{DayOverride, TimeWindow, WeeklyTemplate};
use crate::core::sync;

#[derive(Debug, Default)]
struct CalendarState {
    template: WeeklyTemplate,
    overrides: BTreeMap<NaiveDate, DayOverride>,
}

#[derive(Debug, Default)]
pub struct Calendar {
    state: RwLock<CalendarState>,
}

impl Calendar {
    /// Build a calendar after validating the template
    pub fn new(template: WeeklyTemplate) -> BookingResult<Self> {
        template.day_hours().validate()?;
        let mut template = template;
        template.normalise_days();
        Ok(Self {
            state: RwLock::new(CalendarState {
                template,
                overrides: BTreeMap::new(),
            }),
        })
    }

    /// Restore a calendar from stored state, validating every entry
    pub fn restore(
        template: WeeklyTemplate,
        overrides: BTreeMap<NaiveDate, DayOverride>,
    ) -> BookingResult<Self> {
        for day_override in overrides.values() {
            validate_override(day_override)?;
        }
        let calendar = Self::new(template)?;
        calendar.write()?.overrides = overrides;
        Ok(calendar)
    }

    pub fn weekly_template(&self) -> BookingResult<WeeklyTemplate> {
        Ok(self.read()?.template.clone())
    }

    pub fn set_weekly_template(&self, template: WeeklyTemplate) -> BookingResult<WeeklyTemplate> {
        template.day_hours().validate()?;
        let mut template = template;
        template.normalise_days();
        self.write()?.template = template.clone();
        log::info!(
            "Weekly template set: days {:?}, work {}, break {}",
            template.work_days,
            template.work_hours,
            template
                .break_hours
                .map(|b| b.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Ok(template)
    }

    pub fn set_date_override(&self, date: NaiveDate, day_override: DayOverride) -> BookingResult<()> {
        validate_override(&day_override)?;
        self.write()?.overrides.insert(date, day_override);
        log::info!("Override for {} set: {:?}", date, day_override);
        Ok(())
    }

    /// Returns whether an override was present
    pub fn clear_date_override(&self, date: NaiveDate) -> BookingResult<bool> {
        let removed = self.write()?.overrides.remove(&date).is_some();
        if removed {
            log::info!("Override for {} cleared", date);
        }
        Ok(removed)
    }

    pub fn date_override(&self, date: NaiveDate) -> BookingResult<Option<DayOverride>> {
        Ok(self.read()?.overrides.get(&date).copied())
    }

    /// All overrides ordered by date
    pub fn list_overrides(&self) -> BookingResult<Vec<(NaiveDate, DayOverride)>> {
        Ok(self
            .read()?
            .overrides
            .iter()
            .map(|(date, o)| (*date, *o))
            .collect())
    }

    /// Open windows of `date`, ordered, before bookings are subtracted
    pub fn open_windows(&self, date: NaiveDate) -> BookingResult<Vec<TimeWindow>> {
        let state = self.read()?;
        let windows = match state.overrides.get(&date) {
            Some(DayOverride::Closed) => Vec::new(),
            Some(DayOverride::Hours(hours)) => hours.windows(),
            None if state.template.is_work_day(date.weekday()) => {
                state.template.day_hours().windows()
            }
            None => Vec::new(),
        };
        log::trace!("Open windows for {}: {:?}", date, windows);
        Ok(windows)
    }

    fn read(&self) -> BookingResult<std::sync::RwLockReadGuard<'_, CalendarState>> {
        sync::read(&self.state, "calendar", BookingError::internal)
    }

    fn write(&self) -> BookingResult<std::sync::RwLockWriteGuard<'_, CalendarState>> {
        sync::write(&self.state, "calendar", BookingError::internal)
    }
}

fn validate_override(day_override: &DayOverride) -> BookingResult<()> {
    match day_override {
        DayOverride::Closed => Ok(()),
        DayOverride::Hours(hours) => hours.validate(),
    }
}
