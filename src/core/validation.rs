//! Validation and parsing helpers for user-supplied values
//!
//! Shared by the TOML configuration loader and the console transport. Every
//! helper returns a human readable `String` error; callers wrap it into their
//! own error type.

use chrono::{Duration, NaiveDate, Weekday};

/// Parse an hour of day in `0..24`
pub fn parse_hour(value: &str) -> Result<u8, String> {
    let trimmed = value.trim();
    let hour_part = trimmed.strip_suffix(":00").unwrap_or(trimmed);
    match hour_part.parse::<u8>() {
        Ok(h) if h < 24 => Ok(h),
        _ => Err(format!("'{}' is not an hour of day (0-23)", value)),
    }
}

/// Parse an hour range written `10-20` or `10:00-20:00`
pub fn parse_hour_range(value: &str) -> Result<(u8, u8), String> {
    let (start, end) = value
        .trim()
        .split_once('-')
        .ok_or_else(|| format!("'{}' is not an hour range (expected HH-HH)", value))?;
    Ok((parse_hour(start)?, parse_hour(end)?))
}

/// Parse a time of day given as `HH:MM` or `HH` into minutes after midnight
pub fn parse_time_of_day(value: &str) -> Result<u32, String> {
    let trimmed = value.trim();
    let (hours, minutes) = match trimmed.split_once(':') {
        Some((h, m)) => (h, m),
        None => (trimmed, "0"),
    };
    let hours = hours.parse::<u32>().ok().filter(|h| *h < 24);
    let minutes = minutes.parse::<u32>().ok().filter(|m| *m < 60);
    match (hours, minutes) {
        (Some(h), Some(m)) => Ok(h * 60 + m),
        _ => Err(format!("'{}' is not a time of day (expected HH:MM)", value)),
    }
}

/// Parse a calendar date relative to `today`
///
/// Supports:
/// - ISO 8601 dates: "2025-03-14"
/// - Day-first dates: "14.03.2025"
/// - "today", "tomorrow" and "in N days"
pub fn parse_date(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let lower = value.trim().to_lowercase();
    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    if let Some(days) = lower
        .strip_prefix("in ")
        .and_then(|rest| rest.strip_suffix(" days").or_else(|| rest.strip_suffix(" day")))
    {
        let days = days
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("Invalid relative date: '{}'", value))?;
        return Ok(today + Duration::days(days));
    }

    NaiveDate::parse_from_str(&lower, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&lower, "%d.%m.%Y"))
        .map_err(|_| {
            format!(
                "Invalid date format: '{}'. Expected YYYY-MM-DD, DD.MM.YYYY, 'today', 'tomorrow' or 'in N days'",
                value
            )
        })
}

/// Parse a comma separated list of weekdays ("mon,tue" or "monday, friday")
pub fn parse_weekdays(value: &str) -> Result<Vec<Weekday>, String> {
    let mut days = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day = part
            .parse::<Weekday>()
            .map_err(|_| format!("'{}' is not a weekday", part))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    days.sort_by_key(|d| d.num_days_from_monday());
    Ok(days)
}
