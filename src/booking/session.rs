//! Per-actor pending input
//!
//! Some master actions need more than one message: adding a service asks for
//! the name, then the price, then the duration; renaming or repricing waits
//! for one reply. Each actor holds at most one pending input. It is consumed by
//! the next reply and lapses after the configured timeout.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::booking::error::{BookingError, BookingResult, EntityKind};
use crate::core::sync;
use crate::core::time::Clock;

pub const DEFAULT_INPUT_TIMEOUT_SECONDS: i64 = 300;

/// Durations offered when the wizard asks for one
pub const DURATION_PRESETS: [u32; 6] = [30, 45, 60, 90, 120, 150];

/// Progress of the add-service wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceDraft {
    AwaitingName,
    AwaitingPrice { name: String },
    AwaitingDuration { name: String, price: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInput {
    NewService(ServiceDraft),
    RenameService { service_id: String },
    RepriceService { service_id: String },
}

#[derive(Debug)]
struct Entry {
    input: PendingInput,
    expires_at: NaiveDateTime,
}

pub struct PendingInputs {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl PendingInputs {
    pub fn new(clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            timeout,
        }
    }

    /// Wait for the actor's next reply, replacing anything already pending
    pub fn begin(&self, actor_id: &str, input: PendingInput) -> BookingResult<()> {
        let expires_at = self.clock.now() + self.timeout;
        let previous = self.lock()?.insert(
            actor_id.to_string(),
            Entry { input, expires_at },
        );
        if let Some(previous) = previous {
            log::debug!("Pending input of {} replaced: {:?}", actor_id, previous.input);
        }
        Ok(())
    }

    /// Consume the actor's pending input
    ///
    /// A lapsed input is discarded and reported as missing.
    pub fn take(&self, actor_id: &str) -> BookingResult<PendingInput> {
        let now = self.clock.now();
        match self.lock()?.remove(actor_id) {
            Some(entry) if entry.expires_at > now => Ok(entry.input),
            Some(entry) => {
                log::info!("Pending input of {} timed out: {:?}", actor_id, entry.input);
                Err(BookingError::not_found(EntityKind::PendingInput, actor_id))
            }
            None => Err(BookingError::not_found(EntityKind::PendingInput, actor_id)),
        }
    }

    /// Current pending input without consuming it
    pub fn peek(&self, actor_id: &str) -> BookingResult<Option<PendingInput>> {
        let now = self.clock.now();
        Ok(self
            .lock()?
            .get(actor_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.input.clone()))
    }

    /// Drop the actor's pending input, returning whether there was one
    pub fn cancel(&self, actor_id: &str) -> BookingResult<bool> {
        let now = self.clock.now();
        Ok(self
            .lock()?
            .remove(actor_id)
            .is_some_and(|entry| entry.expires_at > now))
    }

    /// Discard every lapsed input
    pub fn purge_expired(&self) -> BookingResult<usize> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - entries.len())
    }

    fn lock(&self) -> BookingResult<MutexGuard<'_, HashMap<String, Entry>>> {
        sync::lock(&self.entries, "pending inputs", BookingError::internal)
    }
}
