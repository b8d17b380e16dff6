//! Console command parsing
//!
//! A line starting with a known command word becomes an [`Intent`] (or a
//! console-level command); any other non-empty line is a free-text reply to
//! the actor's pending input.

use chrono::NaiveDate;

use crate::booking::api::{AppointmentId, DayHours, HourRange, Intent, Minute};
use crate::core::validation::{parse_date, parse_hour_range, parse_time_of_day, parse_weekdays};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    /// Act as another user from now on
    SwitchUser(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Usage: {usage}")]
    Usage { usage: &'static str },

    #[error("{0}")]
    InvalidArgument(String),
}

/// Command words with their usage line, in help order
pub const COMMANDS: &[(&str, &str)] = &[
    ("services", "services"),
    ("add-service", "add-service [<price> <minutes> <name...>]"),
    ("rename-service", "rename-service <service> [<new name...>]"),
    ("reprice-service", "reprice-service <service> [<price>]"),
    ("set-duration", "set-duration <service> <minutes>"),
    ("delete-service", "delete-service <service>"),
    ("schedule", "schedule"),
    ("work-hours", "work-hours <HH-HH>"),
    ("break", "break <HH-HH>|off"),
    ("work-days", "work-days <mon,tue,...>"),
    ("close", "close <date>"),
    ("hours", "hours <date> <HH-HH> [<break HH-HH>]"),
    ("reopen", "reopen <date>"),
    ("slots", "slots <service> [<date>]"),
    ("book", "book <service> <date> <HH:MM>"),
    ("confirm", "confirm <#id>"),
    ("reject", "reject <#id>"),
    ("cancel", "cancel <#id>"),
    ("my", "my"),
    ("today", "today"),
    ("all", "all"),
    ("user", "user <id>"),
    ("abort", "abort"),
    ("help", "help"),
    ("quit", "quit"),
];

fn usage(command: &str) -> ParseError {
    let usage = COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, usage)| *usage)
        .unwrap_or("help");
    ParseError::Usage { usage }
}

fn invalid(message: String) -> ParseError {
    ParseError::InvalidArgument(message)
}

/// Parse one console line; `None` for a blank line
pub fn parse_line(line: &str, today: NaiveDate) -> Option<Result<Command, ParseError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let mut words = line.split_whitespace();
    let head = words.next()?.to_lowercase();
    let args: Vec<&str> = words.collect();

    if !COMMANDS.iter().any(|(name, _)| *name == head) && head != "exit" {
        return Some(Ok(Command::Intent(Intent::Reply(line.to_string()))));
    }
    Some(parse_command(&head, &args, today))
}

fn parse_command(head: &str, args: &[&str], today: NaiveDate) -> Result<Command, ParseError> {
    let intent = match (head, args) {
        ("services", []) => Intent::ListServices,
        ("add-service", []) => Intent::StartAddService,
        ("add-service", [price, duration, name @ ..]) if !name.is_empty() => Intent::AddService {
            name: name.join(" "),
            price: integer(price)?,
            duration: integer(duration)?,
        },
        ("rename-service", [service]) => Intent::RenameService {
            service_id: service.to_string(),
            name: None,
        },
        ("rename-service", [service, name @ ..]) => Intent::RenameService {
            service_id: service.to_string(),
            name: Some(name.join(" ")),
        },
        ("reprice-service", [service]) => Intent::RepriceService {
            service_id: service.to_string(),
            price: None,
        },
        ("reprice-service", [service, price]) => Intent::RepriceService {
            service_id: service.to_string(),
            price: Some(integer(price)?),
        },
        ("set-duration", [service, minutes]) => Intent::SetServiceDuration {
            service_id: service.to_string(),
            duration: integer(minutes)?,
        },
        ("delete-service", [service]) => Intent::DeleteService {
            service_id: service.to_string(),
        },

        ("schedule", []) => Intent::ShowSchedule,
        ("work-hours", [range]) => Intent::SetWorkHours(hour_range(range)?),
        ("break", [off]) if off.eq_ignore_ascii_case("off") => Intent::ClearBreak,
        ("break", [range]) => Intent::SetBreak(hour_range(range)?),
        ("work-days", days) if !days.is_empty() => {
            Intent::SetWorkDays(parse_weekdays(&days.join(",")).map_err(invalid)?)
        }
        ("close", [date]) => Intent::CloseDate(parse_date(date, today).map_err(invalid)?),
        ("hours", [date, work]) => Intent::SetDateHours {
            date: parse_date(date, today).map_err(invalid)?,
            hours: DayHours::new(hour_range(work)?, None),
        },
        ("hours", [date, work, brk]) => Intent::SetDateHours {
            date: parse_date(date, today).map_err(invalid)?,
            hours: DayHours::new(hour_range(work)?, Some(hour_range(brk)?)),
        },
        ("reopen", [date]) => Intent::ClearDate(parse_date(date, today).map_err(invalid)?),

        ("slots", [service]) => Intent::Slots {
            service_id: service.to_string(),
            date: today,
        },
        ("slots", [service, date @ ..]) => Intent::Slots {
            service_id: service.to_string(),
            date: parse_date(&date.join(" "), today).map_err(invalid)?,
        },
        ("book", [service, date @ .., time]) if !date.is_empty() => Intent::Book {
            service_id: service.to_string(),
            date: parse_date(&date.join(" "), today).map_err(invalid)?,
            start: time_of_day(time)?,
        },
        ("confirm", [id]) => Intent::Confirm(appointment_id(id)?),
        ("reject", [id]) => Intent::Reject(appointment_id(id)?),
        ("cancel", [id]) => Intent::Cancel(appointment_id(id)?),

        ("my", []) => Intent::MyBookings,
        ("today", []) => Intent::Today,
        ("all", []) => Intent::AllBookings,
        ("abort", []) => Intent::Abort,

        ("user", [id]) => return Ok(Command::SwitchUser(id.to_string())),
        ("help", _) => return Ok(Command::Help),
        ("quit" | "exit", []) => return Ok(Command::Quit),
        (other, _) => return Err(usage(other)),
    };
    Ok(Command::Intent(intent))
}

fn integer(value: &str) -> Result<i64, ParseError> {
    value
        .parse::<i64>()
        .map_err(|_| invalid(format!("'{}' is not a whole number", value)))
}

fn hour_range(value: &str) -> Result<HourRange, ParseError> {
    let (start, end) = parse_hour_range(value).map_err(invalid)?;
    Ok(HourRange::new(start, end))
}

fn time_of_day(value: &str) -> Result<Minute, ParseError> {
    parse_time_of_day(value).map_err(invalid)
}

fn appointment_id(value: &str) -> Result<AppointmentId, ParseError> {
    value
        .parse::<AppointmentId>()
        .map_err(|e| invalid(e.to_string()))
}
