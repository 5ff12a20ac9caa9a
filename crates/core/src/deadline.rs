//! Deadline labels for tasks.
//!
//! Two label variants exist and intentionally disagree on thresholds:
//!
//! - [`timer_snapshot`] backs the live countdown shown in the task details
//!   view: whole months, then whole days (`>= 1`), then `HH:MM:SS`.
//! - [`task_deadline_label`] backs the compact label in list rows: whole
//!   months, then whole days (`>= 2`), then `MM:SS` with total minutes, then
//!   `<1 мин`.
//!
//! Both are pure functions of `(due, now)`.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::types::Timestamp;

/// Label shown when no deadline is set.
pub const NOT_SET_LABEL: &str = "--:--";

/// Label shown once the deadline has passed.
pub const OVERDUE_LABEL: &str = "Просрочено";

/// Lifecycle of a deadline relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeadlineStatus {
    NotSet,
    InProgress,
    Expired,
}

/// Colour of the countdown label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerColor {
    Default,
    Error,
}

/// Snapshot produced by [`timer_snapshot`] on every render or tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerData {
    pub label: String,
    pub color: TimerColor,
    pub status: DeadlineStatus,
}

impl TimerData {
    pub fn not_set() -> Self {
        Self {
            label: NOT_SET_LABEL.to_string(),
            color: TimerColor::Default,
            status: DeadlineStatus::NotSet,
        }
    }

    fn expired() -> Self {
        Self {
            label: OVERDUE_LABEL.to_string(),
            color: TimerColor::Error,
            status: DeadlineStatus::Expired,
        }
    }

    fn in_progress(label: String) -> Self {
        Self {
            label,
            color: TimerColor::Default,
            status: DeadlineStatus::InProgress,
        }
    }
}

/// Colour of the compact list-row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    Default,
    Success,
    Error,
}

/// Output of [`task_deadline_label`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineLabel {
    pub label: String,
    pub color: LabelColor,
}

/// Parse an ISO-8601 due-instant.
///
/// Accepts RFC 3339 timestamps, offset-less date-times (taken as UTC) and
/// plain dates (midnight UTC).
pub fn parse_due(value: &str) -> Result<Timestamp, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
                return Ok(naive.and_utc());
            }
            if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                    return Ok(naive.and_utc());
                }
            }
            Err(rfc_err)
        }
    }
}

/// Parse an optional due-instant, treating unparseable input as absent.
pub fn parse_optional_due(value: Option<&str>) -> Option<Timestamp> {
    let raw = value?;
    match parse_due(raw) {
        Ok(due) => Some(due),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "Ignoring unparseable due-instant");
            None
        }
    }
}

/// Whole calendar months from `from` to `to` (0 when `to` is not later).
///
/// A month counts once `from + n months <= to`, with the day clamped to the
/// end of shorter months.
pub fn whole_months_between(from: Timestamp, to: Timestamp) -> i64 {
    if to <= from {
        return 0;
    }

    let mut months = i64::from(to.year() - from.year()) * 12
        + (i64::from(to.month()) - i64::from(from.month()));

    while months > 0 {
        let shifted = u32::try_from(months)
            .ok()
            .and_then(|m| from.checked_add_months(Months::new(m)));
        match shifted {
            Some(candidate) if candidate <= to => break,
            _ => months -= 1,
        }
    }

    months.max(0)
}

/// Whole days from `now` until `due` (truncated, negative when past).
pub fn whole_days_between(now: Timestamp, due: Timestamp) -> i64 {
    (due - now).num_days()
}

/// Countdown snapshot for the task details view.
///
/// Rules are evaluated in order: absent, overdue (`due <= now`), months,
/// days, then a zero-padded `HH:MM:SS` of the remaining duration.
pub fn timer_snapshot(due: Option<Timestamp>, now: Timestamp) -> TimerData {
    let Some(due) = due else {
        return TimerData::not_set();
    };

    if due <= now {
        return TimerData::expired();
    }

    let months = whole_months_between(now, due);
    if months >= 1 {
        return TimerData::in_progress(format!("{months} мес."));
    }

    let days = whole_days_between(now, due);
    if days >= 1 {
        return TimerData::in_progress(format!("{days} дн."));
    }

    let total = (due - now).num_seconds();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    TimerData::in_progress(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// Compact deadline label for task list rows.
pub fn task_deadline_label(due: Option<Timestamp>, now: Timestamp) -> DeadlineLabel {
    let Some(due) = due else {
        return DeadlineLabel {
            label: NOT_SET_LABEL.to_string(),
            color: LabelColor::Default,
        };
    };

    if due < now {
        return DeadlineLabel {
            label: OVERDUE_LABEL.to_string(),
            color: LabelColor::Error,
        };
    }

    let success = |label: String| DeadlineLabel {
        label,
        color: LabelColor::Success,
    };

    let months = whole_months_between(now, due);
    if months >= 1 {
        return success(format!("{months} мес."));
    }

    let days = whole_days_between(now, due);
    if days >= 2 {
        return success(format!("{days} дн."));
    }

    let remaining = due - now;
    let minutes = remaining.num_minutes();
    if minutes >= 1 {
        let seconds = remaining.num_seconds() % 60;
        return success(format!("{minutes:02}:{seconds:02}"));
    }

    success("<1 мин".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn absent_due_is_not_set() {
        let data = timer_snapshot(None, now());
        assert_eq!(data, TimerData::not_set());
        assert_eq!(data.label, "--:--");
    }

    #[test]
    fn past_due_is_always_expired() {
        for offset in [Duration::seconds(1), Duration::days(3), Duration::days(4000)] {
            let data = timer_snapshot(Some(now() - offset), now());
            assert_eq!(data.status, DeadlineStatus::Expired);
            assert_eq!(data.color, TimerColor::Error);
            assert_eq!(data.label, "Просрочено");
        }
    }

    #[test]
    fn due_equal_to_now_is_expired() {
        let data = timer_snapshot(Some(now()), now());
        assert_eq!(data.status, DeadlineStatus::Expired);
    }

    #[test]
    fn thirty_five_days_is_one_month() {
        let data = timer_snapshot(Some(now() + Duration::days(35)), now());
        assert_eq!(data.label, "1 мес.");
        assert_eq!(data.status, DeadlineStatus::InProgress);
        assert_eq!(data.color, TimerColor::Default);
    }

    #[test]
    fn twenty_five_hours_is_one_day() {
        let data = timer_snapshot(Some(now() + Duration::hours(25)), now());
        assert_eq!(data.label, "1 дн.");
    }

    #[test]
    fn thirty_seconds_is_clock_format() {
        let data = timer_snapshot(Some(now() + Duration::seconds(30)), now());
        assert_eq!(data.label, "00:00:30");
        assert_eq!(data.status, DeadlineStatus::InProgress);
    }

    #[test]
    fn clock_format_pads_hours_and_minutes() {
        let due = now() + Duration::hours(23) + Duration::minutes(5) + Duration::seconds(9);
        assert_eq!(timer_snapshot(Some(due), now()).label, "23:05:09");
    }

    #[test]
    fn thirty_days_in_a_long_month_is_days() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let due = from + Duration::days(30);
        assert_eq!(timer_snapshot(Some(due), from).label, "30 дн.");
    }

    #[test]
    fn month_difference_clamps_to_end_of_month() {
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(whole_months_between(from, to), 1);

        let short = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap();
        assert_eq!(whole_months_between(from, short), 0);
    }

    #[test]
    fn list_label_uses_two_day_threshold() {
        // 25 hours is "1 дн." for the countdown but not for list rows.
        let due = now() + Duration::hours(25);
        let label = task_deadline_label(Some(due), now());
        assert_eq!(label.label, "1500:00");
        assert_eq!(label.color, LabelColor::Success);

        let due = now() + Duration::hours(49);
        assert_eq!(task_deadline_label(Some(due), now()).label, "2 дн.");
    }

    #[test]
    fn list_label_below_one_minute() {
        let due = now() + Duration::seconds(42);
        assert_eq!(task_deadline_label(Some(due), now()).label, "<1 мин");
    }

    #[test]
    fn list_label_minutes_and_seconds() {
        let due = now() + Duration::minutes(3) + Duration::seconds(7);
        assert_eq!(task_deadline_label(Some(due), now()).label, "03:07");
    }

    #[test]
    fn list_label_past_and_absent() {
        let overdue = task_deadline_label(Some(now() - Duration::minutes(1)), now());
        assert_eq!(overdue.color, LabelColor::Error);
        assert_eq!(overdue.label, "Просрочено");

        let absent = task_deadline_label(None, now());
        assert_eq!(absent.color, LabelColor::Default);
        assert_eq!(absent.label, "--:--");
    }

    #[test]
    fn parses_iso_variants() {
        let expected = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(parse_due("2023-12-31T23:59:59Z").unwrap(), expected);
        assert_eq!(parse_due("2023-12-31T23:59:59.000Z").unwrap(), expected);
        assert_eq!(parse_due("2024-01-01T02:59:59+03:00").unwrap(), expected);
        assert_eq!(parse_due("2023-12-31T23:59:59").unwrap(), expected);
        assert_eq!(
            parse_due("2023-12-31").unwrap(),
            Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap()
        );
        assert!(parse_due("tomorrow").is_err());
    }

    #[test]
    fn unparseable_due_is_treated_as_absent() {
        assert_eq!(parse_optional_due(Some("not a date")), None);
        assert_eq!(parse_optional_due(None), None);
        let data = timer_snapshot(parse_optional_due(Some("garbage")), now());
        assert_eq!(data.status, DeadlineStatus::NotSet);
    }
}
