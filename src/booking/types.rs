//! Plain data shared by the catalog, calendar, ledger and resolver

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

use crate::booking::error::{BookingError, BookingResult};

/// Minutes after midnight
pub type Minute = u32;

pub const MINUTES_PER_DAY: Minute = 24 * 60;

/// Render minutes after midnight as `HH:MM`
pub fn format_minute(minute: Minute) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// An offered service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Stable key derived from the name when the service was created
    pub id: String,
    pub name: String,
    /// Price in whole currency units
    pub price: u64,
    pub duration_minutes: u32,
}

/// Partial update for a service; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub duration_minutes: Option<i64>,
}

impl ServicePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn price(price: i64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn duration(minutes: i64) -> Self {
        Self {
            duration_minutes: Some(minutes),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.duration_minutes.is_none()
    }
}

/// Half-open interval of whole hours, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn to_window(self) -> TimeWindow {
        TimeWindow::new(Minute::from(self.start) * 60, Minute::from(self.end) * 60)
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start, self.end)
    }
}

/// Half-open interval of minutes within one day, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Minute,
    pub end: Minute,
}

impl TimeWindow {
    pub fn new(start: Minute, end: Minute) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> Minute {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_minute(self.start), format_minute(self.end))
    }
}

/// Work hours for one day with an optional break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub work_hours: HourRange,
    pub break_hours: Option<HourRange>,
}

impl DayHours {
    pub fn new(work_hours: HourRange, break_hours: Option<HourRange>) -> Self {
        Self {
            work_hours,
            break_hours,
        }
    }

    /// Check `work.start < break.start < break.end < work.end`, all below 24
    pub fn validate(&self) -> BookingResult<()> {
        let work = self.work_hours;
        if work.start >= 24 || work.end >= 24 {
            return Err(BookingError::validation(format!(
                "work hours {} must lie within 00-23",
                work
            )));
        }
        if work.start >= work.end {
            return Err(BookingError::validation(format!(
                "work hours {} must start before they end",
                work
            )));
        }
        if let Some(brk) = self.break_hours {
            if !(work.start < brk.start && brk.start < brk.end && brk.end < work.end) {
                return Err(BookingError::validation(format!(
                    "break {} must start after and end before work hours {}",
                    brk, work
                )));
            }
        }
        Ok(())
    }

    /// Work hours split around the break, in order
    pub fn windows(&self) -> Vec<TimeWindow> {
        let work = self.work_hours.to_window();
        match self.break_hours {
            Some(brk) => {
                let brk = brk.to_window();
                vec![
                    TimeWindow::new(work.start, brk.start),
                    TimeWindow::new(brk.end, work.end),
                ]
            }
            None => vec![work],
        }
    }
}

/// Recurring weekly availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTemplate {
    /// Sorted Monday first, no duplicates
    pub work_days: Vec<Weekday>,
    pub work_hours: HourRange,
    pub break_hours: Option<HourRange>,
}

impl WeeklyTemplate {
    pub fn new(work_days: Vec<Weekday>, work_hours: HourRange, break_hours: Option<HourRange>) -> Self {
        let mut template = Self {
            work_days,
            work_hours,
            break_hours,
        };
        template.normalise_days();
        template
    }

    pub fn day_hours(&self) -> DayHours {
        DayHours::new(self.work_hours, self.break_hours)
    }

    pub fn is_work_day(&self, day: Weekday) -> bool {
        self.work_days.contains(&day)
    }

    pub(crate) fn normalise_days(&mut self) {
        self.work_days.sort_by_key(|d| d.num_days_from_monday());
        self.work_days.dedup();
    }
}

impl Default for WeeklyTemplate {
    /// Monday to Saturday, 10:00-20:00 with a break 13:00-14:00
    fn default() -> Self {
        Self::new(
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            HourRange::new(10, 20),
            Some(HourRange::new(13, 14)),
        )
    }
}

/// Replacement availability for a single date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayOverride {
    Closed,
    Hours(DayHours),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppointmentId(pub u64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for AppointmentId {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .map(AppointmentId)
            .map_err(|_| BookingError::validation(format!("'{}' is not an appointment id", s)))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Proposed,
    Confirmed,
    Cancelled,
}

/// Statuses that occupy time on the calendar
pub const ACTIVE_STATUSES: [AppointmentStatus; 2] =
    [AppointmentStatus::Proposed, AppointmentStatus::Confirmed];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The master turned the proposal down
    Rejected,
    /// Nobody confirmed the proposal within the grace period
    Expired,
    CancelledByMaster,
    CancelledByClient,
}

/// A booking; service name, price and duration are copied at booking time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_id: String,
    pub service_id: String,
    pub service_name: String,
    pub price: u64,
    pub date: NaiveDate,
    pub start: Minute,
    pub end: Minute,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    /// Set only while proposed
    pub expires_at: Option<NaiveDateTime>,
    /// Set only once cancelled
    pub cancel_reason: Option<CancelReason>,
}

impl Appointment {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minute() {
        assert_eq!(format_minute(0), "00:00");
        assert_eq!(format_minute(14 * 60 + 5), "14:05");
    }

    #[test]
    fn test_window_overlap_is_half_open() {
        let a = TimeWindow::new(600, 660);
        let b = TimeWindow::new(660, 720);
        let c = TimeWindow::new(630, 690);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert!(TimeWindow::new(600, 720).contains(&c));
    }

    #[test]
    fn test_day_hours_validation() {
        assert!(DayHours::new(HourRange::new(10, 20), Some(HourRange::new(13, 14)))
            .validate()
            .is_ok());
        assert!(DayHours::new(HourRange::new(10, 20), None).validate().is_ok());
        // break touching the work boundary
        assert!(DayHours::new(HourRange::new(10, 20), Some(HourRange::new(10, 11)))
            .validate()
            .is_err());
        assert!(DayHours::new(HourRange::new(10, 20), Some(HourRange::new(19, 20)))
            .validate()
            .is_err());
        assert!(DayHours::new(HourRange::new(20, 10), None).validate().is_err());
        assert!(DayHours::new(HourRange::new(10, 24), None).validate().is_err());
        assert!(DayHours::new(HourRange::new(10, 20), Some(HourRange::new(14, 13)))
            .validate()
            .is_err());
    }

    #[test]
    fn test_day_hours_windows() {
        let hours = DayHours::new(HourRange::new(10, 20), Some(HourRange::new(13, 14)));
        assert_eq!(
            hours.windows(),
            vec![TimeWindow::new(600, 780), TimeWindow::new(840, 1200)]
        );
        let no_break = DayHours::new(HourRange::new(9, 12), None);
        assert_eq!(no_break.windows(), vec![TimeWindow::new(540, 720)]);
    }

    #[test]
    fn test_template_normalises_days() {
        let template = WeeklyTemplate::new(
            vec![Weekday::Fri, Weekday::Mon, Weekday::Fri],
            HourRange::new(10, 18),
            None,
        );
        assert_eq!(template.work_days, vec![Weekday::Mon, Weekday::Fri]);
        assert!(!template.is_work_day(Weekday::Sun));
    }

    #[test]
    fn test_appointment_id_parsing() {
        assert_eq!("#12".parse::<AppointmentId>().unwrap(), AppointmentId(12));
        assert_eq!("7".parse::<AppointmentId>().unwrap(), AppointmentId(7));
        assert!("x7".parse::<AppointmentId>().is_err());
        assert_eq!(AppointmentId(3).to_string(), "#3");
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(AppointmentStatus::Proposed.to_string(), "proposed");
        assert_eq!(
            "confirmed".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Confirmed
        );
        assert_eq!(CancelReason::CancelledByClient.to_string(), "cancelled_by_client");
    }
}
