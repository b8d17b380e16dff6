//! NotificationManager implementation
//!
//! Fans booking events out to subscribers over unbounded tokio channels.
//! Publishing never blocks, so the ledger can emit events right after a state
//! change without awaiting anything.

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::core::sync;
use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::event::{BookingEvent, EventFilter};

pub type EventReceiver = UnboundedReceiver<BookingEvent>;

struct SubscriberInfo {
    filter: EventFilter,
    sender: UnboundedSender<BookingEvent>,
    delivered: usize,
}

#[derive(Default)]
pub struct NotificationManager {
    subscribers: Mutex<HashMap<String, SubscriberInfo>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; ids must be unique
    pub fn subscribe(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
    ) -> NotificationResult<EventReceiver> {
        let subscriber_id = subscriber_id.into();
        let mut subscribers = self.lock()?;
        if subscribers.contains_key(&subscriber_id) {
            return Err(NotificationError::DuplicateSubscriber(subscriber_id));
        }

        let (sender, receiver) = unbounded_channel();
        log::debug!("Subscriber '{}' registered with filter {:?}", subscriber_id, filter);
        subscribers.insert(
            subscriber_id,
            SubscriberInfo {
                filter,
                sender,
                delivered: 0,
            },
        );
        Ok(receiver)
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<bool> {
        Ok(self.lock()?.remove(subscriber_id).is_some())
    }

    pub fn subscriber_count(&self) -> NotificationResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Number of events delivered to a subscriber so far
    pub fn delivered_count(&self, subscriber_id: &str) -> NotificationResult<Option<usize>> {
        Ok(self.lock()?.get(subscriber_id).map(|info| info.delivered))
    }

    /// Deliver an event to every matching subscriber
    ///
    /// Subscribers whose receiver was dropped are removed. Returns the number
    /// of subscribers that received the event.
    pub fn publish(&self, event: BookingEvent) -> NotificationResult<usize> {
        let mut subscribers = self.lock()?;
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, info) in subscribers.iter_mut() {
            if !info.filter.accepts(&event) {
                continue;
            }
            match info.sender.send(event.clone()) {
                Ok(()) => {
                    info.delivered += 1;
                    delivered += 1;
                }
                Err(_) => closed.push(id.clone()),
            }
        }

        for id in closed {
            log::warn!("Subscriber '{}' dropped its receiver; unsubscribing", id);
            subscribers.remove(&id);
        }

        log::trace!(
            "{} event for {} delivered to {} subscriber(s)",
            event.kind,
            event.appointment.id,
            delivered
        );
        Ok(delivered)
    }

    fn lock(&self) -> NotificationResult<std::sync::MutexGuard<'_, HashMap<String, SubscriberInfo>>> {
        sync::lock(
            &self.subscribers,
            "notification subscribers",
            NotificationError::Synchronisation,
        )
    }
}
