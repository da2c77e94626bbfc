use chrono::{DateTime, Utc};

/// Watch percentage at which a video counts as completed.
pub const DEFAULT_COMPLETION_THRESHOLD: i32 = 95;

/// Formats seconds as `H:MM:SS`, or `M:SS` under an hour.
///
/// Zero, negative and absent durations all render as `"0:00"`.
pub fn format_duration(seconds: Option<i64>) -> String {
    let seconds = match seconds {
        Some(seconds) if seconds > 0 => seconds,
        _ => return "0:00".to_owned(),
    };

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Parses `MM:SS` or `HH:MM:SS`. Anything else yields 0.
pub fn parse_duration(value: &str) -> i64 {
    let parts: Option<Vec<i64>> = value
        .split(':')
        .map(|part| part.trim().parse::<i64>().ok())
        .collect();

    match parts.as_deref() {
        Some([minutes, seconds]) => to_seconds(0, *minutes, *seconds),
        Some([hours, minutes, seconds]) => to_seconds(*hours, *minutes, *seconds),
        _ => None,
    }
    .unwrap_or(0)
}

fn to_seconds(hours: i64, minutes: i64, seconds: i64) -> Option<i64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Rounds and clamps to `0..=100`. Every persisted percentage goes through here.
pub fn normalize_watch_percentage(percentage: f64) -> i32 {
    // NaN casts to 0
    percentage.round().clamp(0.0, 100.0) as i32
}

pub fn should_mark_complete(watch_percentage: i32, threshold: i32) -> bool {
    watch_percentage >= threshold
}

/// Sum of known durations; unknown ones count as zero.
pub fn total_duration(durations: &[Option<i32>]) -> i64 {
    durations
        .iter()
        .map(|duration| i64::from(duration.unwrap_or(0)))
        .sum()
}

/// `round(100 * completed / total)`, 0 for an empty course.
pub fn progress_percentage(completed: u64, total: u64) -> i32 {
    if total == 0 {
        return 0;
    }
    normalize_watch_percentage(completed as f64 * 100.0 / total as f64)
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Human "time ago" label, e.g. `3 days ago`.
pub fn format_relative_time(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = then else {
        return "Never".to_owned();
    };

    let elapsed = now.signed_duration_since(then);
    let seconds = elapsed.num_seconds();
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if seconds < 60 {
        "Just now".to_owned()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else if days < 30 {
        plural(days / 7, "week")
    } else if days < 365 {
        plural(days / 30, "month")
    } else {
        plural(days / 365, "year")
    }
}
