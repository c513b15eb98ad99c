//! Reference week computation and date containment
//!
//! Validation bounds a task's start and due dates to the Monday–Sunday
//! window containing the processing time.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Monday-anchored inclusive week window containing `today`.
pub fn week_of(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = today.weekday().num_days_from_monday() as i64;
    let monday = today - Duration::days(back);
    let sunday = monday + Duration::days(6);
    (monday, sunday)
}

/// Week window for the local current date.
pub fn current_week() -> (NaiveDate, NaiveDate) {
    week_of(Local::now().date_naive())
}

/// Whether `date_str` (`YYYY-MM-DD`) falls inside `[monday, sunday]`.
///
/// A date that fails to parse is a diagnostic, not a fault: it logs a
/// warning and counts as outside the week.
pub fn in_week(date_str: &str, monday: NaiveDate, sunday: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        Ok(date) => date >= monday && date <= sunday,
        Err(err) => {
            tracing::warn!(date = date_str, %err, "unparseable date in week check");
            false
        }
    }
}
