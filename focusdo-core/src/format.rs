//! Formatting helpers shared across frontends.

use chrono::{DateTime, Local, Utc};

/// Format an estimated duration in minutes (e.g., "45m", "2h", "1h 30m").
pub fn format_estimated_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    let rest = minutes % 60;
    if rest == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, rest)
    }
}

/// Format accumulated focus time (e.g., "2h 5m", "40m").
///
/// Seconds are dropped; hours are only shown once at least one has accrued.
pub fn format_focus_time(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = total_secs % 3600 / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format a countdown as a clock face (e.g., "24:59").
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format a due date in medium style in the local time zone (e.g., "Oct 18, 2026").
pub fn format_due_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%b %-d, %Y").to_string()
}

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(ts);

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        ts.with_timezone(&Local).format("%b %d").to_string()
    }
}
