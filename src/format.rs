//! Display helpers, and conversions between the backend's RFC3339 timestamps and `chrono` dates

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, TimeZone};

use crate::session::Session;
use crate::todo::Todo;

/// What is displayed instead of a missing value
pub const NOT_AVAILABLE: &str = "N/A";

/// Pattern of dates shown to the user, e.g. `01 May 2024, 10:00:00`
pub const READABLE_PATTERN: &str = "%d %b %Y, %H:%M:%S";

/// The backend's "no date" value (Go's zero time)
const ZERO_DATE_PREFIX: &str = "0001-01-01";

/// Naive formats accepted from date-time pickers, interpreted in the local time zone
const INPUT_PATTERNS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_rfc3339(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).ok()
}

/// Like [`parse_rfc3339`], but the zero date means "no date"
pub fn parse_backend_date(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.trim().starts_with(ZERO_DATE_PREFIX) {
        return None;
    }
    parse_rfc3339(value)
}

/// Seconds precision, and always a numeric offset (`+00:00` rather than `Z`)
pub fn to_rfc3339<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse what the user typed in a date-time field
///
/// RFC3339 values keep their offset; naive values are taken in the local time zone.
/// Blank input is `Ok(None)`, garbage is `Err(())`.
pub fn parse_datetime_input(value: &str) -> Result<Option<DateTime<FixedOffset>>, ()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Some(date) = parse_rfc3339(value) {
        return Ok(Some(date));
    }
    for pattern in INPUT_PATTERNS.iter() {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return match Local.from_local_datetime(&naive).earliest() {
                Some(local) => Ok(Some(local.with_timezone(local.offset()))),
                None => Err(()),
            };
        }
    }
    Err(())
}

pub fn readable(date: &DateTime<FixedOffset>) -> String {
    date.format(READABLE_PATTERN).to_string()
}

/// Render a backend timestamp for the user, "N/A" when there is none
pub fn format_date(value: Option<&str>) -> String {
    let value = match value.map(str::trim) {
        None => return NOT_AVAILABLE.to_string(),
        Some(v) if v.is_empty() || v.starts_with(ZERO_DATE_PREFIX) => return NOT_AVAILABLE.to_string(),
        Some(v) => v,
    };
    match parse_rfc3339(value) {
        Some(date) => readable(&date),
        None => value.to_string(),
    }
}

pub fn format_information(value: &str) -> &str {
    if value.is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

pub fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        tags.join(", ")
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Share of completed todos, between 0 and 100
pub fn completion_percentage(todos: &[Todo]) -> f64 {
    if todos.is_empty() {
        return 0.0;
    }
    let completed = todos.iter().filter(|t| t.completed).count();
    completed as f64 * 100.0 / todos.len() as f64
}

/// E.g. `50.00%`
pub fn display_completion_percentage(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return "0%".to_string();
    }
    format!("{:.2}%", completion_percentage(todos))
}

/// Caption above the lists table
pub fn list_status_text(list_count: usize, session: &Session) -> &'static str {
    if list_count == 0 {
        "There are not any lists"
    } else if session.is_admin() {
        "All lists in the application:"
    } else {
        "Your personal lists:"
    }
}

/// Text of the pending-invitations popover, `None` when there is nothing to review
pub fn pending_invitations_text(list_names: &[String]) -> Option<String> {
    match list_names.len() {
        0 => None,
        1 => Some(format!("There is 1 pending invitation to review for list: {}", list_names[0])),
        n => Some(format!("There are {} pending invitations to review for lists: {}", n, list_names.join(", "))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn todo(completed: bool) -> Todo {
        Todo { completed, ..Todo::default() }
    }

    #[test]
    fn rfc3339_keeps_numeric_offsets() {
        let date = parse_rfc3339("2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(to_rfc3339(&date), "2024-05-01T10:00:00+02:00");

        let utc = parse_rfc3339("2024-05-01T08:00:00Z").unwrap();
        assert_eq!(to_rfc3339(&utc), "2024-05-01T08:00:00+00:00");
        assert_eq!(readable(&date), "01 May 2024, 10:00:00");
    }

    #[test]
    fn user_input_dates() {
        assert_eq!(parse_datetime_input("  "), Ok(None));
        assert!(parse_datetime_input("tomorrow").is_err());
        assert!(parse_datetime_input("2024-13-01 10:00").is_err());

        let with_offset = parse_datetime_input("2024-05-01T10:00:00-03:30").unwrap().unwrap();
        assert_eq!(to_rfc3339(&with_offset), "2024-05-01T10:00:00-03:30");

        let naive = parse_datetime_input("2024-05-01 10:00").unwrap().unwrap();
        assert_eq!(naive.format("%Y-%m-%d %H:%M").to_string(), "2024-05-01 10:00");
    }

    #[test]
    fn zero_and_missing_dates_are_not_available() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("")), "N/A");
        assert_eq!(format_date(Some("0001-01-01T00:00:00Z")), "N/A");
        assert_eq!(format_date(Some("2024-05-01T10:00:00+02:00")), "01 May 2024, 10:00:00");
    }

    #[test]
    fn completion() {
        assert_eq!(display_completion_percentage(&[]), "0%");
        assert_eq!(display_completion_percentage(&[todo(true), todo(false)]), "50.00%");
        assert_eq!(display_completion_percentage(&[todo(true), todo(false), todo(false)]), "33.33%");
        assert_eq!(yes_no(true), "Yes");
    }

    #[test]
    fn captions() {
        assert_eq!(format_tags(&[]), "N/A");
        assert_eq!(format_tags(&["a".to_string(), "b".to_string()]), "a, b");
        assert_eq!(format_information(""), "N/A");

        let admin = Session::from_cookie_header("user_role=admin");
        assert_eq!(list_status_text(0, &admin), "There are not any lists");
        assert_eq!(list_status_text(2, &admin), "All lists in the application:");
        assert_eq!(list_status_text(2, &Session::anonymous()), "Your personal lists:");

        assert_eq!(pending_invitations_text(&[]), None);
        assert_eq!(
            pending_invitations_text(&["A".to_string(), "B".to_string()]).unwrap(),
            "There are 2 pending invitations to review for lists: A, B"
        );
    }
}
