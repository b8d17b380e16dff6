//! Line-based chat console
//!
//! Reads one message per line, dispatches it as the current user and prints
//! the reply. Booking events addressed to the current user are printed as
//! they arrive.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::parser::{parse_line, Command, COMMANDS};
use super::render::{render_event, render_reply};
use crate::app::persistence::Persistence;
use crate::booking::api::{Actor, Intent, Role, Scheduler};
use crate::core::error_handling::describe_for_user;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::styles::StyleRole;
use crate::core::time::Clock;
use crate::core::version;
use crate::notifications::{BookingEvent, BookingEventKind, EventFilter, EventReceiver};

const SUBSCRIBER_ID: &str = "console";

/// Result of handling one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Option<String>),
    Quit,
}

enum Input {
    Line(Option<String>),
    Event(BookingEvent),
    Shutdown,
}

pub struct Console {
    scheduler: Arc<Scheduler>,
    persistence: Arc<Persistence>,
    clock: Arc<dyn Clock>,
    masters: Vec<String>,
    actor: Actor,
    color: bool,
}

impl Console {
    pub fn new(
        scheduler: Arc<Scheduler>,
        persistence: Arc<Persistence>,
        clock: Arc<dyn Clock>,
        masters: Vec<String>,
        user: &str,
        color: bool,
    ) -> Self {
        let mut console = Self {
            scheduler,
            persistence,
            clock,
            masters,
            actor: Actor::client(user),
            color,
        };
        console.actor = console.actor_for(user);
        console
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    fn actor_for(&self, user: &str) -> Actor {
        if self.masters.iter().any(|m| m == user) {
            Actor::master(user)
        } else {
            Actor::client(user)
        }
    }

    /// Handle one line of input
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        let command = match parse_line(line, self.clock.today()) {
            None => return Outcome::Continue(None),
            Some(Ok(command)) => command,
            Some(Err(e)) => return Outcome::Continue(Some(self.error(&e.to_string()))),
        };
        match command {
            Command::Quit => Outcome::Quit,
            Command::Help => Outcome::Continue(Some(self.help())),
            Command::SwitchUser(user) => {
                self.actor = self.actor_for(&user);
                log::info!("Console now acting as {} ({})", user, self.actor.role);
                Outcome::Continue(Some(self.greeting()))
            }
            Command::Intent(intent) => Outcome::Continue(Some(self.dispatch(intent))),
        }
    }

    fn dispatch(&self, intent: Intent) -> String {
        let mutating = intent.is_mutating();
        let action = intent.action();
        match self.scheduler.dispatch(&self.actor, intent) {
            Ok(reply) => {
                if mutating {
                    self.persistence.save(&self.scheduler);
                }
                render_reply(&reply, self.color).trim_end().to_string()
            }
            Err(e) => self.error(&describe_for_user(&e, &format!("Request to {}", action))),
        }
    }

    fn error(&self, message: &str) -> String {
        StyleRole::Error.paint(message, self.color)
    }

    fn greeting(&self) -> String {
        format!(
            "Acting as {} ({})",
            StyleRole::Key.paint(&self.actor.id, self.color),
            self.actor.role
        )
    }

    fn help(&self) -> String {
        let mut lines = vec![StyleRole::Header.paint("Commands", self.color)];
        lines.extend(
            COMMANDS
                .iter()
                .map(|(_, usage)| format!("  {}", StyleRole::Accent.paint(usage, self.color))),
        );
        lines.push("Any other text answers the current question.".to_string());
        lines.push("Dates: YYYY-MM-DD, DD.MM.YYYY, today, tomorrow, in N days".to_string());
        lines.join("\n")
    }

    fn subscribe(&self) -> Option<EventReceiver> {
        let filter = match self.actor.role {
            Role::Master => EventFilter::Kinds(vec![
                BookingEventKind::Proposed,
                BookingEventKind::Cancelled,
                BookingEventKind::Expired,
            ]),
            Role::Client => EventFilter::Client(self.actor.id.clone()),
        };
        if let Err(e) = self.scheduler.unsubscribe(SUBSCRIBER_ID) {
            log::warn!("Could not drop event subscription: {}", e);
        }
        match self.scheduler.subscribe(SUBSCRIBER_ID, filter) {
            Ok(receiver) => Some(receiver),
            Err(e) => {
                log::warn!("Booking events will not be shown: {}", e);
                None
            }
        }
    }

    /// Run until `quit`, end of input or shutdown
    pub async fn run<R, W>(
        &mut self,
        reader: R,
        mut writer: W,
        shutdown: &ShutdownCoordinator,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut shutdown_rx = shutdown.subscribe();
        let mut lines = reader.lines();
        let mut events = self.subscribe();
        let mut subscribed_as = self.actor.clone();

        let banner = format!(
            "{}\n{}\nType 'help' for commands.",
            StyleRole::Header.paint(&version::long_version(), self.color),
            self.greeting()
        );
        write_text(&mut writer, &banner).await?;

        loop {
            let input = tokio::select! {
                _ = shutdown_rx.recv() => Input::Shutdown,
                event = next_event(&mut events) => Input::Event(event),
                line = lines.next_line() => Input::Line(line?),
            };
            match input {
                Input::Shutdown => break,
                Input::Event(event) => {
                    write_text(&mut writer, &render_event(&event, self.color)).await?
                }
                Input::Line(None) => {
                    log::debug!("Console input closed");
                    break;
                }
                Input::Line(Some(line)) => match self.handle_line(&line) {
                    Outcome::Quit => break,
                    Outcome::Continue(output) => {
                        if let Some(text) = output {
                            write_text(&mut writer, &text).await?;
                        }
                        if self.actor != subscribed_as {
                            events = self.subscribe();
                            subscribed_as = self.actor.clone();
                        }
                    }
                },
            }
        }

        let _ = self.scheduler.unsubscribe(SUBSCRIBER_ID);
        shutdown.trigger_shutdown();
        Ok(())
    }
}

/// Next event, or never when there is no live subscription
async fn next_event(events: &mut Option<EventReceiver>) -> BookingEvent {
    if let Some(receiver) = events {
        if let Some(event) = receiver.recv().await {
            return event;
        }
        *events = None;
    }
    std::future::pending().await
}

async fn write_text<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
