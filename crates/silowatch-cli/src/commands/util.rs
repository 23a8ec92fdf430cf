//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal on stdin there is nobody to ask, so the command
/// fails instead of hanging.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// `"{h}h {m}m remaining"`, `"{m}m remaining"`, or `"Expired"`.
pub fn format_time_remaining(remaining: Option<TimeDelta>) -> String {
    let Some(remaining) = remaining else {
        return "Expired".into();
    };
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else {
        format!("{minutes}m remaining")
    }
}

/// Coarse age of a timestamp: `Just now`, `{n}m ago`, `{n}h ago`, `{n}d ago`.
pub fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(at);
    let minutes = age.num_minutes();
    if minutes < 1 {
        "Just now".into()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if age.num_hours() < 24 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}d ago", age.num_days())
    }
}

/// `YYYY-MM-DD HH:MM UTC`, or `-` when absent.
pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn time_remaining_formats() {
        assert_eq!(
            format_time_remaining(Some(TimeDelta::minutes(23 * 60 + 59))),
            "23h 59m remaining"
        );
        assert_eq!(format_time_remaining(Some(TimeDelta::minutes(42))), "42m remaining");
        assert_eq!(format_time_remaining(Some(TimeDelta::seconds(30))), "0m remaining");
        assert_eq!(format_time_remaining(None), "Expired");
    }

    #[test]
    fn age_formats() {
        let now = t(12, 0);
        assert_eq!(format_age(t(12, 0), now), "Just now");
        assert_eq!(format_age(t(11, 55), now), "5m ago");
        assert_eq!(format_age(t(9, 0), now), "3h ago");
        assert_eq!(format_age(now - TimeDelta::days(2), now), "2d ago");
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(format_timestamp(Some(t(9, 5))), "2025-03-01 09:05 UTC");
        assert_eq!(format_timestamp(None), "-");
    }
}
