//! What actors can ask the scheduler to do, and what it answers
//!
//! The transport turns user input into an [`Intent`] and renders the
//! [`Reply`]; the scheduler never formats text for people.

use chrono::{NaiveDate, Weekday};
use strum_macros::{Display, EnumString};

use crate::booking::types::{
    Appointment, AppointmentId, DayHours, DayOverride, HourRange, Minute, Service, WeeklyTemplate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Master,
    Client,
}

/// Who is issuing an intent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn master(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Master,
        }
    }

    pub fn client(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Client,
        }
    }

    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ListServices,
    /// Start the add-service wizard
    StartAddService,
    AddService {
        name: String,
        price: i64,
        duration: i64,
    },
    /// Rename now, or wait for the new name when `name` is `None`
    RenameService {
        service_id: String,
        name: Option<String>,
    },
    /// Reprice now, or wait for the new price when `price` is `None`
    RepriceService {
        service_id: String,
        price: Option<i64>,
    },
    SetServiceDuration {
        service_id: String,
        duration: i64,
    },
    DeleteService {
        service_id: String,
    },

    ShowSchedule,
    SetWorkHours(HourRange),
    SetBreak(HourRange),
    ClearBreak,
    SetWorkDays(Vec<Weekday>),
    CloseDate(NaiveDate),
    SetDateHours {
        date: NaiveDate,
        hours: DayHours,
    },
    ClearDate(NaiveDate),

    Slots {
        service_id: String,
        date: NaiveDate,
    },
    Book {
        service_id: String,
        date: NaiveDate,
        start: Minute,
    },
    Confirm(AppointmentId),
    Reject(AppointmentId),
    Cancel(AppointmentId),

    MyBookings,
    Today,
    AllBookings,

    /// Free text answering the actor's pending input
    Reply(String),
    /// Drop the actor's pending input
    Abort,
}

impl Intent {
    /// Short name used in logs and permission errors
    pub fn action(&self) -> &'static str {
        match self {
            Intent::ListServices => "list services",
            Intent::StartAddService | Intent::AddService { .. } => "add service",
            Intent::RenameService { .. } => "rename service",
            Intent::RepriceService { .. } => "reprice service",
            Intent::SetServiceDuration { .. } => "set service duration",
            Intent::DeleteService { .. } => "delete service",
            Intent::ShowSchedule => "show schedule",
            Intent::SetWorkHours(_) => "set work hours",
            Intent::SetBreak(_) | Intent::ClearBreak => "set break",
            Intent::SetWorkDays(_) => "set work days",
            Intent::CloseDate(_) => "close date",
            Intent::SetDateHours { .. } => "set date hours",
            Intent::ClearDate(_) => "clear date",
            Intent::Slots { .. } => "list slots",
            Intent::Book { .. } => "book",
            Intent::Confirm(_) => "confirm",
            Intent::Reject(_) => "reject",
            Intent::Cancel(_) => "cancel",
            Intent::MyBookings => "list own bookings",
            Intent::Today => "list today's bookings",
            Intent::AllBookings => "list all bookings",
            Intent::Reply(_) => "reply",
            Intent::Abort => "abort",
        }
    }

    /// Intents only the master may issue
    pub fn is_master_only(&self) -> bool {
        matches!(
            self,
            Intent::StartAddService
                | Intent::AddService { .. }
                | Intent::RenameService { .. }
                | Intent::RepriceService { .. }
                | Intent::SetServiceDuration { .. }
                | Intent::DeleteService { .. }
                | Intent::ShowSchedule
                | Intent::SetWorkHours(_)
                | Intent::SetBreak(_)
                | Intent::ClearBreak
                | Intent::SetWorkDays(_)
                | Intent::CloseDate(_)
                | Intent::SetDateHours { .. }
                | Intent::ClearDate(_)
                | Intent::Confirm(_)
                | Intent::Reject(_)
                | Intent::Today
                | Intent::AllBookings
        )
    }

    /// Intents only clients may issue
    pub fn is_client_only(&self) -> bool {
        matches!(self, Intent::Book { .. } | Intent::MyBookings)
    }

    /// Whether a successful dispatch may have changed persisted state
    ///
    /// Slot and booking listings expire stale proposals first, so they count.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Intent::ListServices | Intent::StartAddService | Intent::ShowSchedule | Intent::Abort
        ) && !matches!(
            self,
            Intent::RenameService { name: None, .. } | Intent::RepriceService { price: None, .. }
        )
    }
}

/// A question the scheduler is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    ServiceName,
    ServicePrice { name: String },
    ServiceDuration { name: String, price: i64, presets: Vec<u32> },
    NewName { service: Service },
    NewPrice { service: Service },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Services(Vec<Service>),
    ServiceAdded(Service),
    ServiceUpdated(Service),
    ServiceRemoved(Service),
    Schedule {
        template: WeeklyTemplate,
        overrides: Vec<(NaiveDate, DayOverride)>,
    },
    DateOverrideCleared {
        date: NaiveDate,
        removed: bool,
    },
    Slots {
        service: Service,
        date: NaiveDate,
        starts: Vec<Minute>,
    },
    Appointment(Appointment),
    Appointments(Vec<Appointment>),
    Prompt(Prompt),
    Aborted {
        had_pending: bool,
    },
}
