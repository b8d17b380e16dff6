//! Booking ledger
//!
//! Owns every appointment and enforces the central invariant: on any date, no
//! two proposed or confirmed appointments overlap. All mutations go through a
//! single mutex, so the overlap check and the insert in [`Ledger::propose`]
//! form one atomic step and expiry can never interleave with a confirmation.
//!
//! State changes are announced on the [`NotificationManager`] after the lock
//! has been released.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::booking::catalog::Catalog;
use crate::booking::error::{BookingError, BookingResult, EntityKind};
use crate::booking::types::{
    Appointment, AppointmentId, AppointmentStatus, CancelReason, Minute, TimeWindow,
    ACTIVE_STATUSES, MINUTES_PER_DAY,
};
use crate::core::sync;
use crate::core::time::Clock;
use crate::notifications::{BookingEvent, BookingEventKind, NotificationManager};

/// How long a proposal waits for the master before it lapses
pub const DEFAULT_PROPOSAL_GRACE_MINUTES: i64 = 15;

/// Serializable ledger contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub appointments: Vec<Appointment>,
    /// Id the next appointment will receive
    pub next_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    Confirm,
    Reject,
    Cancel(CancelReason),
}

impl Transition {
    fn action(self) -> &'static str {
        match self {
            Transition::Confirm => "confirm",
            Transition::Reject => "reject",
            Transition::Cancel(_) => "cancel",
        }
    }

    fn event_kind(self) -> BookingEventKind {
        match self {
            Transition::Confirm => BookingEventKind::Confirmed,
            Transition::Reject => BookingEventKind::Rejected,
            Transition::Cancel(_) => BookingEventKind::Cancelled,
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    appointments: BTreeMap<AppointmentId, Appointment>,
    by_date: BTreeMap<NaiveDate, BTreeSet<AppointmentId>>,
    next_id: u64,
}

impl LedgerState {
    fn insert(&mut self, appointment: Appointment) {
        self.by_date
            .entry(appointment.date)
            .or_default()
            .insert(appointment.id);
        self.appointments.insert(appointment.id, appointment);
    }

    fn on_date<'a>(
        &'a self,
        date: NaiveDate,
        statuses: &'a [AppointmentStatus],
    ) -> impl Iterator<Item = &'a Appointment> + 'a {
        self.by_date
            .get(&date)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.appointments.get(id))
            .filter(move |a| statuses.contains(&a.status))
    }

    /// Active appointments on `date`, ordered by start
    fn active_on(&self, date: NaiveDate) -> Vec<&Appointment> {
        let mut active: Vec<&Appointment> = self.on_date(date, &ACTIVE_STATUSES).collect();
        active.sort_by_key(|a| (a.start, a.id));
        active
    }

    /// Cancel proposals whose expiry is at or before `now`
    fn expire(&mut self, now: NaiveDateTime) -> Vec<Appointment> {
        let mut expired = Vec::new();
        for appointment in self.appointments.values_mut() {
            let lapsed = appointment.status == AppointmentStatus::Proposed
                && appointment.expires_at.is_some_and(|at| at <= now);
            if lapsed {
                appointment.status = AppointmentStatus::Cancelled;
                appointment.expires_at = None;
                appointment.cancel_reason = Some(CancelReason::Expired);
                expired.push(appointment.clone());
            }
        }
        expired
    }

    fn apply(&mut self, id: AppointmentId, transition: Transition) -> BookingResult<Appointment> {
        let appointment = self
            .appointments
            .get_mut(&id)
            .ok_or_else(|| BookingError::not_found(EntityKind::Appointment, id))?;

        let allowed = match transition {
            Transition::Confirm | Transition::Reject => {
                appointment.status == AppointmentStatus::Proposed
            }
            Transition::Cancel(_) => appointment.is_active(),
        };
        if !allowed {
            return Err(BookingError::InvalidState {
                id,
                status: appointment.status,
                action: transition.action(),
            });
        }

        appointment.expires_at = None;
        match transition {
            Transition::Confirm => appointment.status = AppointmentStatus::Confirmed,
            Transition::Reject => {
                appointment.status = AppointmentStatus::Cancelled;
                appointment.cancel_reason = Some(CancelReason::Rejected);
            }
            Transition::Cancel(reason) => {
                appointment.status = AppointmentStatus::Cancelled;
                appointment.cancel_reason = Some(reason);
            }
        }
        Ok(appointment.clone())
    }
}

/// Fail when two active appointments on one date overlap
///
/// `active` must be ordered by start.
fn check_no_overlap(date: NaiveDate, active: &[&Appointment]) -> BookingResult<()> {
    for pair in active.windows(2) {
        if pair[0].window().overlaps(&pair[1].window()) {
            let message = format!(
                "appointments {} ({}) and {} ({}) overlap on {}",
                pair[0].id,
                pair[0].window(),
                pair[1].id,
                pair[1].window(),
                date
            );
            log::error!("Ledger invariant violated: {}", message);
            return Err(BookingError::InvariantViolation { message });
        }
    }
    Ok(())
}

pub struct Ledger {
    catalog: Arc<Catalog>,
    clock: Arc<dyn Clock>,
    notifications: Arc<NotificationManager>,
    grace: Duration,
    state: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new(
        catalog: Arc<Catalog>,
        clock: Arc<dyn Clock>,
        notifications: Arc<NotificationManager>,
        grace: Duration,
    ) -> Self {
        Self {
            catalog,
            clock,
            notifications,
            grace,
            state: Mutex::new(LedgerState {
                next_id: 1,
                ..LedgerState::default()
            }),
        }
    }

    /// Rebuild a ledger from a snapshot, refusing one that breaks the invariant
    pub fn restore(
        catalog: Arc<Catalog>,
        clock: Arc<dyn Clock>,
        notifications: Arc<NotificationManager>,
        grace: Duration,
        snapshot: LedgerSnapshot,
    ) -> BookingResult<Self> {
        let ledger = Self::new(catalog, clock, notifications, grace);
        {
            let mut state = ledger.lock()?;
            let highest = snapshot.appointments.iter().map(|a| a.id.0).max().unwrap_or(0);
            state.next_id = snapshot.next_id.max(highest + 1);
            for appointment in snapshot.appointments {
                state.insert(appointment);
            }
            let dates: Vec<NaiveDate> = state.by_date.keys().copied().collect();
            for date in dates {
                check_no_overlap(date, &state.active_on(date))?;
            }
        }
        Ok(ledger)
    }

    pub fn grace_period(&self) -> Duration {
        self.grace
    }

    /// Reserve `[start, start + duration)` on `date` for a client
    ///
    /// Stale proposals are expired first so their time can be reused.
    pub fn propose(
        &self,
        client_id: &str,
        service_id: &str,
        date: NaiveDate,
        start: Minute,
    ) -> BookingResult<Appointment> {
        if client_id.trim().is_empty() {
            return Err(BookingError::validation("client id must not be empty"));
        }
        let service = self.catalog.get_service(service_id)?;
        if start >= MINUTES_PER_DAY {
            return Err(BookingError::validation(format!(
                "start minute {} is not a time of day",
                start
            )));
        }
        let end = start + service.duration_minutes;
        if end > MINUTES_PER_DAY {
            return Err(BookingError::validation(format!(
                "{} does not fit before midnight",
                TimeWindow::new(start, end)
            )));
        }
        let requested = TimeWindow::new(start, end);
        let now = self.clock.now();

        let mut state = self.lock()?;
        let expired = state.expire(now);
        let outcome = {
            let active = state.active_on(date);
            check_no_overlap(date, &active).and_then(|()| {
                match active.iter().find(|a| a.window().overlaps(&requested)) {
                    Some(existing) => Err(BookingError::Conflict {
                        date,
                        requested,
                        existing: existing.id,
                    }),
                    None => Ok(()),
                }
            })
        };
        let outcome = outcome.map(|()| {
            let appointment = Appointment {
                id: AppointmentId(state.next_id),
                client_id: client_id.to_string(),
                service_id: service.id.clone(),
                service_name: service.name.clone(),
                price: service.price,
                date,
                start,
                end,
                status: AppointmentStatus::Proposed,
                created_at: now,
                expires_at: Some(now + self.grace),
                cancel_reason: None,
            };
            state.next_id += 1;
            state.insert(appointment.clone());
            appointment
        });
        drop(state);

        self.announce_all(BookingEventKind::Expired, &expired, now);
        match &outcome {
            Ok(appointment) => {
                log::info!(
                    "Appointment {} proposed by {}: {} {} {}",
                    appointment.id,
                    client_id,
                    service.id,
                    date,
                    requested
                );
                self.announce(BookingEventKind::Proposed, appointment, now);
            }
            Err(e) => log::debug!("Proposal by {} for {} {} refused: {}", client_id, date, requested, e),
        }
        outcome
    }

    /// Promote a pending proposal
    pub fn confirm(&self, id: AppointmentId) -> BookingResult<Appointment> {
        self.transition(id, Transition::Confirm)
    }

    /// Turn a pending proposal down
    pub fn reject(&self, id: AppointmentId) -> BookingResult<Appointment> {
        self.transition(id, Transition::Reject)
    }

    /// Cancel a proposed or confirmed appointment on the master's behalf
    pub fn cancel(&self, id: AppointmentId) -> BookingResult<Appointment> {
        self.transition(id, Transition::Cancel(CancelReason::CancelledByMaster))
    }

    pub fn cancel_with_reason(
        &self,
        id: AppointmentId,
        reason: CancelReason,
    ) -> BookingResult<Appointment> {
        self.transition(id, Transition::Cancel(reason))
    }

    fn transition(&self, id: AppointmentId, transition: Transition) -> BookingResult<Appointment> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        let expired = state.expire(now);
        let outcome = state.apply(id, transition);
        drop(state);

        self.announce_all(BookingEventKind::Expired, &expired, now);
        if let Ok(appointment) = &outcome {
            log::info!("Appointment {} {}", appointment.id, transition.event_kind());
            self.announce(transition.event_kind(), appointment, now);
        }
        outcome
    }

    /// Cancel every proposal whose expiry is at or before `now`
    ///
    /// Calling it again with the same `now` changes nothing.
    pub fn expire_stale(&self, now: NaiveDateTime) -> BookingResult<Vec<Appointment>> {
        let expired = self.lock()?.expire(now);
        for appointment in &expired {
            log::info!("Appointment {} expired unconfirmed", appointment.id);
        }
        self.announce_all(BookingEventKind::Expired, &expired, now);
        Ok(expired)
    }

    /// Expire against the ledger's own clock
    pub fn expire_due(&self) -> BookingResult<Vec<Appointment>> {
        self.expire_stale(self.clock.now())
    }

    pub fn get(&self, id: AppointmentId) -> BookingResult<Appointment> {
        self.lock()?
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| BookingError::not_found(EntityKind::Appointment, id))
    }

    /// Appointments on `date` with one of `statuses`, ordered by start
    pub fn list_for_date(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> BookingResult<Vec<Appointment>> {
        let state = self.lock()?;
        let mut found: Vec<Appointment> = state.on_date(date, statuses).cloned().collect();
        found.sort_by_key(|a| (a.start, a.id));
        Ok(found)
    }

    /// A client's appointments ordered by date and start
    pub fn list_for_client(&self, client_id: &str) -> BookingResult<Vec<Appointment>> {
        let state = self.lock()?;
        let mut found: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.date, a.start, a.id));
        Ok(found)
    }

    /// Appointments on or after `from` with one of `statuses`, ordered by date and start
    pub fn list_from(
        &self,
        from: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> BookingResult<Vec<Appointment>> {
        let state = self.lock()?;
        let mut found: Vec<Appointment> = state
            .by_date
            .range(from..)
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| state.appointments.get(id))
            .filter(|a| statuses.contains(&a.status))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.date, a.start, a.id));
        Ok(found)
    }

    pub fn snapshot(&self) -> BookingResult<LedgerSnapshot> {
        let state = self.lock()?;
        Ok(LedgerSnapshot {
            appointments: state.appointments.values().cloned().collect(),
            next_id: state.next_id,
        })
    }

    fn announce(&self, kind: BookingEventKind, appointment: &Appointment, now: NaiveDateTime) {
        let event = BookingEvent::new(kind, now, appointment.clone());
        if let Err(e) = self.notifications.publish(event) {
            log::warn!("Could not announce {} for {}: {}", kind, appointment.id, e);
        }
    }

    fn announce_all(&self, kind: BookingEventKind, appointments: &[Appointment], now: NaiveDateTime) {
        for appointment in appointments {
            self.announce(kind, appointment, now);
        }
    }

    fn lock(&self) -> BookingResult<MutexGuard<'_, LedgerState>> {
        sync::lock(&self.state, "ledger", BookingError::internal)
    }
}
