use chrono::{Months, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// IANA name of the host timezone, or `"UTC"` when it cannot be detected.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// The timezone reports are computed in.
///
/// The rolling-year cutoff and the current month depend on the local calendar
/// day, so the pipeline is handed a date produced here instead of reading the
/// clock itself.
#[derive(Debug, Clone, Copy)]
pub struct ReportTimezone(Tz);

impl ReportTimezone {
    /// Unknown names resolve to UTC with a warning.
    pub fn resolve(name: &str) -> Self {
        match name.parse::<Tz>() {
            Ok(tz) => Self(tz),
            Err(_) => {
                warn!(timezone = name, "unknown timezone, using UTC");
                Self(Tz::UTC)
            }
        }
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.0).date_naive()
    }
}

// ── Calendar helpers ──────────────────────────────────────────────────────────

/// Three-letter month labels, January first.  September is always `"Sep"`.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter label for a month number in `1..=12`.
pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS[(month.clamp(1, 12) - 1) as usize]
}

/// The same calendar day one year before `date`.
///
/// February 29 maps to February 28 of the previous year.
pub fn one_year_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN)
}

/// Month numbers (`1..=12`) of a rolling twelve-month sequence that starts
/// right after `current_month` and ends with it.
///
/// ```
/// use stats_core::time_utils::rolling_month_order;
///
/// assert_eq!(rolling_month_order(3), [4, 5, 6, 7, 8, 9, 10, 11, 12, 1, 2, 3]);
/// assert_eq!(rolling_month_order(12), [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
/// ```
pub fn rolling_month_order(current_month: u32) -> [u32; 12] {
    let current = current_month.clamp(1, 12);
    std::array::from_fn(|slot| (current + slot as u32) % 12 + 1)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_known_and_unknown_names() {
        assert_eq!(ReportTimezone::resolve("Europe/Helsinki").tz(), Tz::Europe__Helsinki);
        assert_eq!(ReportTimezone::resolve("Mars/Olympus").tz(), Tz::UTC);
        assert_eq!(ReportTimezone::resolve("").tz(), Tz::UTC);
    }

    #[test]
    fn test_today_within_a_day_of_utc() {
        let offset = ReportTimezone::resolve("Pacific/Kiritimati").today() - Utc::now().date_naive();
        assert!(offset.num_days().abs() <= 1);
    }

    // ── month_label ──────────────────────────────────────────────────────────

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(9), "Sep");
        assert_eq!(month_label(12), "Dec");
    }

    // ── one_year_before ──────────────────────────────────────────────────────

    #[test]
    fn test_one_year_before_regular_day() {
        assert_eq!(one_year_before(date(2024, 10, 16)), date(2023, 10, 16));
    }

    #[test]
    fn test_one_year_before_leap_day() {
        assert_eq!(one_year_before(date(2024, 2, 29)), date(2023, 2, 28));
    }

    // ── rolling_month_order ──────────────────────────────────────────────────

    #[test]
    fn test_rolling_month_order_ends_with_current() {
        for current in 1..=12 {
            let order = rolling_month_order(current);
            assert_eq!(order[11], current);
            let mut sorted = order;
            sorted.sort();
            assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        }
    }

    #[test]
    fn test_rolling_month_order_october() {
        assert_eq!(
            rolling_month_order(10),
            [11, 12, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
        );
    }
}
