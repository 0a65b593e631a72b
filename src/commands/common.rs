// Common helpers for commands
// All using camelCase for direct JSON compatibility

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::error::{RemindoError, Result};
use crate::models::Task;

/// Get current timestamp in milliseconds
pub fn now() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a reminder typed by the user into epoch millis.
///
/// Accepts RFC 3339 (`2025-03-01T09:30:00Z`) or a local date-time in the
/// `YYYY-MM-DDTHH:MM` / `YYYY-MM-DDTHH:MM:SS` form of datetime-local inputs.
pub fn parseReminderInput(input: &str) -> Result<i64> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            // Skipped local times (DST gaps) have no instant
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.timestamp_millis())
                .ok_or_else(|| RemindoError::InvalidDate(input.to_string()));
        }
    }

    Err(RemindoError::InvalidDate(input.to_string()))
}

/// Summary line: "Priority • local date-time"
pub fn formatMeta(task: &Task) -> String {
    let mut meta = vec![task.priority.label().to_string()];
    if let Some(at) = task.reminderAt {
        if let Some(dt) = Local.timestamp_millis_opt(at).single() {
            meta.push(dt.format("%Y-%m-%d %H:%M").to_string());
        }
    }
    meta.join(" • ")
}
