//! Backend date formats.

use chrono::NaiveDate;

/// Collaborator rendering form dates in the backend's formats.
///
pub trait DateFormatter {
    /// Format the trip (departure) date.
    fn trip_date(&self, date: NaiveDate) -> String;

    /// Format the recruitment deadline.
    fn due_date(&self, date: NaiveDate) -> String;
}

/// Trip dates as `YYYY-MM-DD`; deadlines as the last second of that day,
/// `YYYY-MM-DDT23:59:59`.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct BackendDates;

impl DateFormatter for BackendDates {
    fn trip_date(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    fn due_date(&self, date: NaiveDate) -> String {
        date.and_hms_opt(23, 59, 59)
            .map(|deadline| deadline.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|| date.format("%Y-%m-%d").to_string())
    }
}
