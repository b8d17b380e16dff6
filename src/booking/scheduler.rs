//! Scheduler facade
//!
//! Owns the catalog, calendar, ledger, slot resolver and pending inputs and
//! routes every [`Intent`] to them after checking the actor's role.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::booking::calendar::Calendar;
use crate::booking::catalog::{validate_price, Catalog};
use crate::booking::error::{BookingError, BookingResult, RequiredRole};
use crate::booking::intent::{Actor, Intent, Prompt, Reply, Role};
use crate::booking::ledger::{Ledger, LedgerSnapshot, DEFAULT_PROPOSAL_GRACE_MINUTES};
use crate::booking::session::{
    PendingInput, PendingInputs, ServiceDraft, DEFAULT_INPUT_TIMEOUT_SECONDS, DURATION_PRESETS,
};
use crate::booking::slots::{SlotResolver, DEFAULT_SLOT_GRANULARITY_MINUTES};
use crate::booking::types::{
    Appointment, CancelReason, DayOverride, Service, ServicePatch, WeeklyTemplate, ACTIVE_STATUSES,
};
use crate::core::time::Clock;
use crate::notifications::{EventFilter, EventReceiver, NotificationManager, NotificationResult};

/// Tunables of the scheduling core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub slot_granularity_minutes: u32,
    pub proposal_grace: Duration,
    pub input_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
            proposal_grace: Duration::minutes(DEFAULT_PROPOSAL_GRACE_MINUTES),
            input_timeout: Duration::seconds(DEFAULT_INPUT_TIMEOUT_SECONDS),
        }
    }
}

/// Everything that outlives a restart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerState {
    pub services: Vec<Service>,
    /// Ids of removed services, kept so they are never reused
    #[serde(default)]
    pub retired_service_ids: Vec<String>,
    pub template: WeeklyTemplate,
    #[serde(default)]
    pub overrides: Vec<(NaiveDate, DayOverride)>,
    #[serde(default)]
    pub ledger: LedgerSnapshot,
}

pub struct Scheduler {
    catalog: Arc<Catalog>,
    calendar: Arc<Calendar>,
    ledger: Arc<Ledger>,
    slots: SlotResolver,
    pending: PendingInputs,
    notifications: Arc<NotificationManager>,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    /// Fresh scheduler with an empty ledger
    pub fn new(
        config: SchedulerConfig,
        catalog: Catalog,
        template: WeeklyTemplate,
        clock: Arc<dyn Clock>,
    ) -> BookingResult<Self> {
        let catalog = Arc::new(catalog);
        let notifications = Arc::new(NotificationManager::new());
        let ledger = Ledger::new(
            catalog.clone(),
            clock.clone(),
            notifications.clone(),
            config.proposal_grace,
        );
        Ok(Self::assemble(
            config,
            catalog,
            Calendar::new(template)?,
            ledger,
            notifications,
            clock,
        ))
    }

    /// Rebuild a scheduler from saved state
    pub fn from_state(
        config: SchedulerConfig,
        state: SchedulerState,
        clock: Arc<dyn Clock>,
    ) -> BookingResult<Self> {
        let catalog = Arc::new(Catalog::restore(
            state.services,
            state.retired_service_ids,
        ));
        let notifications = Arc::new(NotificationManager::new());
        let calendar = Calendar::restore(state.template, state.overrides.into_iter().collect())?;
        let ledger = Ledger::restore(
            catalog.clone(),
            clock.clone(),
            notifications.clone(),
            config.proposal_grace,
            state.ledger,
        )?;
        Ok(Self::assemble(config, catalog, calendar, ledger, notifications, clock))
    }

    fn assemble(
        config: SchedulerConfig,
        catalog: Arc<Catalog>,
        calendar: Calendar,
        ledger: Ledger,
        notifications: Arc<NotificationManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let calendar = Arc::new(calendar);
        let ledger = Arc::new(ledger);
        let slots = SlotResolver::new(
            catalog.clone(),
            calendar.clone(),
            ledger.clone(),
            clock.clone(),
            config.slot_granularity_minutes,
        );
        let pending = PendingInputs::new(clock.clone(), config.input_timeout);
        Self {
            catalog,
            calendar,
            ledger,
            slots,
            pending,
            notifications,
            clock,
        }
    }

    pub fn state(&self) -> BookingResult<SchedulerState> {
        Ok(SchedulerState {
            services: self.catalog.list_services()?,
            retired_service_ids: self.catalog.retired_ids()?,
            template: self.calendar.weekly_template()?,
            overrides: self.calendar.list_overrides()?,
            ledger: self.ledger.snapshot()?,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn slot_resolver(&self) -> &SlotResolver {
        &self.slots
    }

    pub fn subscribe(&self, subscriber_id: &str, filter: EventFilter) -> NotificationResult<EventReceiver> {
        self.notifications.subscribe(subscriber_id, filter)
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<bool> {
        self.notifications.unsubscribe(subscriber_id)
    }

    /// Expire lapsed proposals and pending inputs; returns the expired appointments
    pub fn sweep(&self) -> BookingResult<Vec<Appointment>> {
        let expired = self.ledger.expire_due()?;
        let dropped = self.pending.purge_expired()?;
        if dropped > 0 {
            log::debug!("Dropped {} timed out pending input(s)", dropped);
        }
        Ok(expired)
    }

    pub fn dispatch(&self, actor: &Actor, intent: Intent) -> BookingResult<Reply> {
        log::debug!("{} ({}) -> {:?}", actor.id, actor.role, intent);
        authorise(actor, &intent)?;

        let result = self.route(actor, intent);
        if let Err(e) = &result {
            match e {
                BookingError::InvariantViolation { .. } | BookingError::Internal { .. } => {
                    log::error!("Request from {} failed: {}", actor.id, e)
                }
                _ => log::warn!("Request from {} refused: {}", actor.id, e),
            }
        }
        result
    }

    fn route(&self, actor: &Actor, intent: Intent) -> BookingResult<Reply> {
        match intent {
            Intent::ListServices => Ok(Reply::Services(self.catalog.list_services()?)),
            Intent::StartAddService => {
                self.pending
                    .begin(&actor.id, PendingInput::NewService(ServiceDraft::AwaitingName))?;
                Ok(Reply::Prompt(Prompt::ServiceName))
            }
            Intent::AddService {
                name,
                price,
                duration,
            } => Ok(Reply::ServiceAdded(
                self.catalog.add_service(&name, price, duration)?,
            )),
            Intent::RenameService { service_id, name } => match name {
                Some(name) => self.update_service(&service_id, ServicePatch::name(name)),
                None => {
                    let service = self.catalog.get_service(&service_id)?;
                    self.pending
                        .begin(&actor.id, PendingInput::RenameService { service_id })?;
                    Ok(Reply::Prompt(Prompt::NewName { service }))
                }
            },
            Intent::RepriceService { service_id, price } => match price {
                Some(price) => self.update_service(&service_id, ServicePatch::price(price)),
                None => {
                    let service = self.catalog.get_service(&service_id)?;
                    self.pending
                        .begin(&actor.id, PendingInput::RepriceService { service_id })?;
                    Ok(Reply::Prompt(Prompt::NewPrice { service }))
                }
            },
            Intent::SetServiceDuration {
                service_id,
                duration,
            } => self.update_service(&service_id, ServicePatch::duration(duration)),
            Intent::DeleteService { service_id } => Ok(Reply::ServiceRemoved(
                self.catalog.remove_service(&service_id)?,
            )),

            Intent::ShowSchedule => self.schedule(),
            Intent::SetWorkHours(hours) => self.edit_template(|t| t.work_hours = hours),
            Intent::SetBreak(hours) => self.edit_template(|t| t.break_hours = Some(hours)),
            Intent::ClearBreak => self.edit_template(|t| t.break_hours = None),
            Intent::SetWorkDays(days) => self.edit_template(|t| t.work_days = days),
            Intent::CloseDate(date) => {
                self.calendar.set_date_override(date, DayOverride::Closed)?;
                self.schedule()
            }
            Intent::SetDateHours { date, hours } => {
                self.calendar
                    .set_date_override(date, DayOverride::Hours(hours))?;
                self.schedule()
            }
            Intent::ClearDate(date) => Ok(Reply::DateOverrideCleared {
                date,
                removed: self.calendar.clear_date_override(date)?,
            }),

            Intent::Slots { service_id, date } => {
                let service = self.catalog.get_service(&service_id)?;
                let starts = self.slots.available_slots(&service_id, date)?;
                Ok(Reply::Slots {
                    service,
                    date,
                    starts,
                })
            }
            Intent::Book {
                service_id,
                date,
                start,
            } => {
                self.slots.check_bookable(&service_id, date, start)?;
                let appointment = self.ledger.propose(&actor.id, &service_id, date, start)?;
                Ok(Reply::Appointment(appointment))
            }
            Intent::Confirm(id) => Ok(Reply::Appointment(self.ledger.confirm(id)?)),
            Intent::Reject(id) => Ok(Reply::Appointment(self.ledger.reject(id)?)),
            Intent::Cancel(id) => {
                let appointment = match actor.role {
                    Role::Master => self.ledger.cancel(id)?,
                    Role::Client => {
                        if self.ledger.get(id)?.client_id != actor.id {
                            return Err(BookingError::PermissionDenied {
                                action: "cancel",
                                required: RequiredRole::Owner,
                            });
                        }
                        self.ledger
                            .cancel_with_reason(id, CancelReason::CancelledByClient)?
                    }
                };
                Ok(Reply::Appointment(appointment))
            }

            Intent::MyBookings => {
                self.ledger.expire_due()?;
                Ok(Reply::Appointments(self.ledger.list_for_client(&actor.id)?))
            }
            Intent::Today => {
                self.ledger.expire_due()?;
                Ok(Reply::Appointments(
                    self.ledger.list_for_date(self.clock.today(), &ACTIVE_STATUSES)?,
                ))
            }
            Intent::AllBookings => {
                self.ledger.expire_due()?;
                Ok(Reply::Appointments(
                    self.ledger.list_from(self.clock.today(), &ACTIVE_STATUSES)?,
                ))
            }

            Intent::Reply(text) => self.reply(actor, &text),
            Intent::Abort => Ok(Reply::Aborted {
                had_pending: self.pending.cancel(&actor.id)?,
            }),
        }
    }

    /// Feed free text to the actor's pending input
    ///
    /// An invalid answer leaves the input pending so the actor can retry.
    fn reply(&self, actor: &Actor, text: &str) -> BookingResult<Reply> {
        let input = self.pending.take(&actor.id)?;
        match self.advance(actor, input.clone(), text) {
            Err(e @ BookingError::Validation { .. }) => {
                self.pending.begin(&actor.id, input)?;
                Err(e)
            }
            other => other,
        }
    }

    fn advance(&self, actor: &Actor, input: PendingInput, text: &str) -> BookingResult<Reply> {
        match input {
            PendingInput::NewService(ServiceDraft::AwaitingName) => {
                let name = text.trim();
                if name.is_empty() {
                    return Err(BookingError::validation("service name must not be empty"));
                }
                let name = name.to_string();
                self.pending.begin(
                    &actor.id,
                    PendingInput::NewService(ServiceDraft::AwaitingPrice { name: name.clone() }),
                )?;
                Ok(Reply::Prompt(Prompt::ServicePrice { name }))
            }
            PendingInput::NewService(ServiceDraft::AwaitingPrice { name }) => {
                let price = parse_price(text)?;
                self.pending.begin(
                    &actor.id,
                    PendingInput::NewService(ServiceDraft::AwaitingDuration {
                        name: name.clone(),
                        price,
                    }),
                )?;
                Ok(Reply::Prompt(Prompt::ServiceDuration {
                    name,
                    price,
                    presets: DURATION_PRESETS.to_vec(),
                }))
            }
            PendingInput::NewService(ServiceDraft::AwaitingDuration { name, price }) => {
                let duration = parse_duration(text)?;
                Ok(Reply::ServiceAdded(
                    self.catalog.add_service(&name, price, duration)?,
                ))
            }
            PendingInput::RenameService { service_id } => {
                self.update_service(&service_id, ServicePatch::name(text.trim()))
            }
            PendingInput::RepriceService { service_id } => {
                self.update_service(&service_id, ServicePatch::price(parse_price(text)?))
            }
        }
    }

    fn update_service(&self, service_id: &str, patch: ServicePatch) -> BookingResult<Reply> {
        let service = self.catalog.update_service(service_id, patch)?;
        Ok(Reply::ServiceUpdated(service))
    }

    fn schedule(&self) -> BookingResult<Reply> {
        Ok(Reply::Schedule {
            template: self.calendar.weekly_template()?,
            overrides: self.calendar.list_overrides()?,
        })
    }

    fn edit_template(&self, edit: impl FnOnce(&mut WeeklyTemplate)) -> BookingResult<Reply> {
        let mut template = self.calendar.weekly_template()?;
        edit(&mut template);
        self.calendar.set_weekly_template(template)?;
        self.schedule()
    }
}

fn authorise(actor: &Actor, intent: &Intent) -> BookingResult<()> {
    let required = if intent.is_master_only() && actor.role != Role::Master {
        RequiredRole::Master
    } else if intent.is_client_only() && actor.role != Role::Client {
        RequiredRole::Client
    } else {
        return Ok(());
    };
    Err(BookingError::PermissionDenied {
        action: intent.action(),
        required,
    })
}

fn parse_price(text: &str) -> BookingResult<i64> {
    let price = text
        .trim()
        .parse::<i64>()
        .map_err(|_| BookingError::validation(format!("'{}' is not a price", text.trim())))?;
    validate_price(price)?;
    Ok(price)
}

fn parse_duration(text: &str) -> BookingResult<i64> {
    let text = text.trim();
    let text = text.strip_suffix("min").unwrap_or(text).trim();
    text.parse::<i64>()
        .map_err(|_| BookingError::validation(format!("'{}' is not a duration in minutes", text)))
}
