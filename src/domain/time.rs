use chrono::{NaiveDateTime, Utc};

/// Compact age label for list views ("just now", "5m ago", "3d ago").
pub fn time_since(then: NaiveDateTime) -> String {
    time_between(then, Utc::now().naive_utc())
}

pub fn time_between(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let diff = now - then;

    if diff.num_seconds() < 60 {
        return "just now".to_string();
    }
    if diff.num_minutes() < 60 {
        return format!("{}m ago", diff.num_minutes());
    }
    if diff.num_hours() < 24 {
        return format!("{}h ago", diff.num_hours());
    }

    format!("{}d ago", diff.num_days())
}
