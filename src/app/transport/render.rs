//! Rendering of scheduler replies and booking events for the console

use chrono::{Datelike, NaiveDate};
use prettytable::{format, Cell, Row, Table};

use crate::booking::api::{
    format_minute, Appointment, DayOverride, Prompt, Reply, Service, WeeklyTemplate,
};
use crate::core::styles::StyleRole;
use crate::notifications::{BookingEvent, BookingEventKind};

fn price(amount: u64) -> String {
    amount.to_string()
}

// prettytable measures cell width without ANSI escapes
fn styled_cell(text: &str, role: StyleRole, color: bool) -> Cell {
    Cell::new(&role.paint(text, color))
}

fn new_table(headers: &[&str], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| styled_cell(h, StyleRole::Header, color))
            .collect(),
    ));
    table
}

pub fn services_table(services: &[Service], color: bool) -> Table {
    let mut table = new_table(&["Id", "Service", "Price", "Duration"], color);
    for service in services {
        table.add_row(Row::new(vec![
            styled_cell(&service.id, StyleRole::Key, color),
            Cell::new(&service.name),
            Cell::new(&price(service.price)).style_spec("r"),
            Cell::new(&format!("{} min", service.duration_minutes)).style_spec("r"),
        ]));
    }
    table
}

pub fn appointments_table(appointments: &[Appointment], color: bool) -> Table {
    let mut table = new_table(
        &["Id", "Date", "Time", "Service", "Client", "Price", "Status"],
        color,
    );
    for a in appointments {
        table.add_row(Row::new(vec![
            styled_cell(&a.id.to_string(), StyleRole::Key, color),
            Cell::new(&format!("{} {}", a.date, a.date.weekday())),
            Cell::new(&a.window().to_string()),
            Cell::new(&a.service_name),
            Cell::new(&a.client_id),
            Cell::new(&price(a.price)).style_spec("r"),
            styled_cell(&a.status.to_string(), StyleRole::for_status(a.status), color),
        ]));
    }
    table
}

fn describe_appointment(a: &Appointment, color: bool) -> String {
    let mut text = format!(
        "Appointment {} for {}: {} on {} {} ({})",
        StyleRole::Key.paint(&a.id.to_string(), color),
        a.client_id,
        a.service_name,
        a.date,
        a.window(),
        StyleRole::for_status(a.status).paint(&a.status.to_string(), color)
    );
    if let Some(expires) = a.expires_at {
        text.push_str(&format!(", awaiting confirmation until {}", expires.format("%H:%M")));
    }
    if let Some(reason) = a.cancel_reason {
        text.push_str(&format!(", {}", reason.to_string().replace('_', " ")));
    }
    text
}

fn describe_schedule(
    template: &WeeklyTemplate,
    overrides: &[(NaiveDate, DayOverride)],
    color: bool,
) -> String {
    let days = if template.work_days.is_empty() {
        "none".to_string()
    } else {
        template
            .work_days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut lines = vec![
        StyleRole::Header.paint("Weekly schedule", color),
        format!("  Work days:  {}", days),
        format!("  Work hours: {}", template.work_hours),
        format!(
            "  Break:      {}",
            template
                .break_hours
                .map(|b| b.to_string())
                .unwrap_or_else(|| "none".to_string())
        ),
    ];
    if !overrides.is_empty() {
        lines.push(StyleRole::Header.paint("Date overrides", color));
        for (date, day_override) in overrides {
            let detail = match day_override {
                DayOverride::Closed => StyleRole::Cancelled.paint("closed", color),
                DayOverride::Hours(hours) => match hours.break_hours {
                    Some(brk) => format!("{} (break {})", hours.work_hours, brk),
                    None => hours.work_hours.to_string(),
                },
            };
            lines.push(format!("  {} {}: {}", date, date.weekday(), detail));
        }
    }
    lines.join("\n")
}

fn describe_prompt(prompt: &Prompt, color: bool) -> String {
    let ask = |text: String| StyleRole::Notice.paint(&text, color);
    match prompt {
        Prompt::ServiceName => ask("Name of the new service?".to_string()),
        Prompt::ServicePrice { name } => ask(format!("Price of '{}'?", name)),
        Prompt::ServiceDuration { name, presets, .. } => ask(format!(
            "Duration of '{}' in minutes? Common choices: {}",
            name,
            presets
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )),
        Prompt::NewName { service } => ask(format!("New name for '{}'?", service.name)),
        Prompt::NewPrice { service } => ask(format!(
            "New price for '{}' (now {})?",
            service.name,
            price(service.price)
        )),
    }
}

/// Render a reply as console text
pub fn render_reply(reply: &Reply, color: bool) -> String {
    match reply {
        Reply::Services(services) if services.is_empty() => "No services yet".to_string(),
        Reply::Services(services) => services_table(services, color).to_string(),
        Reply::ServiceAdded(service) => format!(
            "Service {} added: {}, {}, {} min",
            StyleRole::Key.paint(&service.id, color),
            service.name,
            price(service.price),
            service.duration_minutes
        ),
        Reply::ServiceUpdated(service) => format!(
            "Service {} is now: {}, {}, {} min",
            StyleRole::Key.paint(&service.id, color),
            service.name,
            price(service.price),
            service.duration_minutes
        ),
        Reply::ServiceRemoved(service) => format!(
            "Service {} ({}) removed; existing appointments are kept",
            StyleRole::Key.paint(&service.id, color),
            service.name
        ),
        Reply::Schedule {
            template,
            overrides,
        } => describe_schedule(template, overrides, color),
        Reply::DateOverrideCleared { date, removed: true } => {
            format!("{} follows the weekly schedule again", date)
        }
        Reply::DateOverrideCleared { date, removed: false } => {
            format!("{} had no override", date)
        }
        Reply::Slots { service, date, starts } if starts.is_empty() => {
            format!("No free time for {} on {}", service.name, date)
        }
        Reply::Slots { service, date, starts } => format!(
            "{} on {} {}: {}",
            StyleRole::Header.paint(&service.name, color),
            date,
            date.weekday(),
            starts
                .iter()
                .map(|s| StyleRole::Accent.paint(&format_minute(*s), color))
                .collect::<Vec<_>>()
                .join(" ")
        ),
        Reply::Appointment(appointment) => describe_appointment(appointment, color),
        Reply::Appointments(list) if list.is_empty() => "No bookings".to_string(),
        Reply::Appointments(list) => appointments_table(list, color).to_string(),
        Reply::Prompt(prompt) => describe_prompt(prompt, color),
        Reply::Aborted { had_pending: true } => "Cancelled".to_string(),
        Reply::Aborted { had_pending: false } => "Nothing to cancel".to_string(),
    }
}

/// One line announcing a booking event
pub fn render_event(event: &BookingEvent, color: bool) -> String {
    let a = &event.appointment;
    let what = match event.kind {
        BookingEventKind::Proposed => "New booking request",
        BookingEventKind::Confirmed => "Booking confirmed",
        BookingEventKind::Rejected => "Booking declined",
        BookingEventKind::Cancelled => "Booking cancelled",
        BookingEventKind::Expired => "Booking request expired",
    };
    format!(
        "{} {} {}: {} for {} on {} {}",
        StyleRole::Notice.paint("*", color),
        what,
        StyleRole::Key.paint(&a.id.to_string(), color),
        a.service_name,
        a.client_id,
        a.date,
        a.window()
    )
}
