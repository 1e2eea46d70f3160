//! Human-readable rendering and parsing of coarse durations.
//!
//! Ages are reported approximately ("5 years", "1.5 months"): the figure
//! is a staleness signal, not a timestamp. Parsing accepts the same coarse
//! units for configuration values such as `max_age = "10 years"`.

use crate::error::{AuditError, Result};
use chrono::Duration;

/// Calendar-estimated unit lengths, largest first. A year is 365.2425 days,
/// a month is a twelfth of that.
const UNITS: &[(&str, i64)] = &[
    ("decade", 315_569_520),
    ("year", 31_556_952),
    ("month", 2_629_746),
    ("day", 86_400),
    ("hour", 3_600),
];

/// Render a duration using the largest unit it fills at least once,
/// with at most one fraction digit: "2 years", "1.5 months", "5 days".
/// Anything below a full hour collapses to "1 second".
pub fn format_approximate(duration: Duration) -> String {
    let hours = duration.num_hours();
    for (name, unit_seconds) in UNITS {
        let unit_hours = unit_seconds / 3_600;
        let amount = hours as f64 / unit_hours as f64;
        if amount >= 1.0 {
            return format_amount(amount, name);
        }
    }
    "1 second".to_string()
}

fn format_amount(amount: f64, unit: &str) -> String {
    let rounded = (amount * 10.0).round() / 10.0;
    let suffix = if rounded == 1.0 { "" } else { "s" };
    if rounded.fract() == 0.0 {
        format!("{} {}{}", rounded as i64, unit, suffix)
    } else {
        format!("{:.1} {}{}", rounded, unit, suffix)
    }
}

/// Parse durations like `"10 years"`, `"5y"`, `"2 months"`, `"5y 30d"`.
///
/// Accepted units: y/year(s), m/mo/month(s), w/week(s), d/day(s),
/// h/hour(s), min/minute(s), s/sec/second(s). A bare `m` means months;
/// minutes must be spelled `min`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let mut total: i64 = 0;
    let mut chars = input.chars().peekable();
    let mut any = false;

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut number = String::new();
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            number.push(chars.next().unwrap());
        }
        if number.is_empty() {
            return Err(AuditError::config(format!(
                "Invalid duration \"{input}\": expected a number"
            )));
        }
        let amount: i64 = number
            .parse()
            .map_err(|_| AuditError::config(format!("Invalid duration \"{input}\"")))?;

        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        let mut unit = String::new();
        while matches!(chars.peek(), Some(c) if c.is_ascii_alphabetic()) {
            unit.push(chars.next().unwrap());
        }

        let unit_seconds = match unit.to_lowercase().as_str() {
            "y" | "yr" | "yrs" | "year" | "years" => 31_556_952,
            "m" | "mo" | "month" | "months" => 2_629_746,
            "w" | "week" | "weeks" => 604_800,
            "d" | "day" | "days" => 86_400,
            "h" | "hr" | "hour" | "hours" => 3_600,
            "min" | "minute" | "minutes" => 60,
            "s" | "sec" | "second" | "seconds" => 1,
            other => {
                return Err(AuditError::config(format!(
                    "Invalid duration \"{input}\": unknown unit \"{other}\""
                )))
            }
        };

        total = total
            .checked_add(amount.saturating_mul(unit_seconds))
            .ok_or_else(|| AuditError::config(format!("Duration \"{input}\" overflows")))?;
        any = true;
    }

    if !any {
        return Err(AuditError::config("Empty duration"));
    }
    Ok(Duration::seconds(total))
}
