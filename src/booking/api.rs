//! Public API for the booking core
//!
//! Other modules (the app layer, storage, styles) import booking types from
//! here rather than reaching into the internal modules.

pub use crate::booking::calendar::Calendar;
pub use crate::booking::catalog::Catalog;
pub use crate::booking::error::{BookingError, BookingResult, EntityKind, RequiredRole};
pub use crate::booking::intent::{Actor, Intent, Prompt, Reply, Role};
pub use crate::booking::ledger::{Ledger, LedgerSnapshot, DEFAULT_PROPOSAL_GRACE_MINUTES};
pub use crate::booking::scheduler::{Scheduler, SchedulerConfig, SchedulerState};
pub use crate::booking::session::{
    PendingInput, ServiceDraft, DEFAULT_INPUT_TIMEOUT_SECONDS, DURATION_PRESETS,
};
pub use crate::booking::slots::{SlotResolver, DEFAULT_SLOT_GRANULARITY_MINUTES};
pub use crate::booking::types::{
    format_minute, Appointment, AppointmentId, AppointmentStatus, CancelReason, DayHours,
    DayOverride, HourRange, Minute, Service, ServicePatch, TimeWindow, WeeklyTemplate,
    ACTIVE_STATUSES, MINUTES_PER_DAY,
};
