//! Window selection and chronological ordering of events.
//!
//! These two stages run before every aggregation; everything downstream
//! indexes the normalised list by position.

use chrono::NaiveDate;
use stats_core::models::{Event, TimeWindow};
use stats_core::time_utils::one_year_before;

/// Keep the events in scope for `window`, relative to the calendar day `today`.
///
/// * [`TimeWindow::AllTime`] returns every event unchanged.
/// * [`TimeWindow::RollingYear`] keeps events dated after the same day one
///   year earlier.  An event's date stands for its midnight, which precedes
///   the cutoff instant later that day, so the cutoff day itself is out.
///   Undated events are dropped.
pub fn filter_window(events: &[Event], window: TimeWindow, today: NaiveDate) -> Vec<Event> {
    match window {
        TimeWindow::AllTime => events.to_vec(),
        TimeWindow::RollingYear => {
            let cutoff = one_year_before(today);
            events
                .iter()
                .filter(|e| e.date.is_some_and(|d| d > cutoff))
                .cloned()
                .collect()
        }
    }
}

/// Stable ascending sort by date.
///
/// Events sharing a date keep their input order; undated events go last, also
/// in input order.
pub fn sort_chronologically(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| (e.date.is_none(), e.date));
    events
}

/// Filter then sort: the normalised event list every stage consumes.
pub fn normalize(events: &[Event], window: TimeWindow, today: NaiveDate) -> Vec<Event> {
    sort_chronologically(filter_window(events, window, today))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(d: NaiveDate, departures: f64) -> Event {
        Event::new(d, departures, 0.0, None, vec![])
    }

    fn undated(raw: &str, departures: f64) -> Event {
        Event {
            date: None,
            raw_date: raw.to_string(),
            departures,
            arrivals: 0.0,
            config: None,
            atco: vec![],
        }
    }

    // ── filter_window ─────────────────────────────────────────────────────────

    #[test]
    fn test_all_time_is_identity() {
        let events = vec![event(date(2001, 1, 1), 1.0), undated("?", 2.0)];
        let out = filter_window(&events, TimeWindow::AllTime, date(2024, 6, 1));
        assert_eq!(out, events);
    }

    #[test]
    fn test_rolling_year_drops_cutoff_day() {
        let today = date(2024, 10, 16);
        let events = vec![
            event(date(2023, 10, 15), 1.0),
            event(date(2023, 10, 16), 2.0),
            event(date(2024, 10, 16), 3.0),
        ];
        let out = filter_window(&events, TimeWindow::RollingYear, today);
        let deps: Vec<f64> = out.iter().map(|e| e.departures).collect();
        assert_eq!(deps, vec![3.0]);
    }

    #[test]
    fn test_rolling_year_keeps_day_after_cutoff() {
        let events = vec![event(date(2023, 10, 17), 1.0)];
        let out = filter_window(&events, TimeWindow::RollingYear, date(2024, 10, 16));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_rolling_year_drops_undated() {
        let events = vec![undated("garbage", 1.0)];
        let out = filter_window(&events, TimeWindow::RollingYear, date(2024, 1, 1));
        assert!(out.is_empty());
    }

    #[test]
    fn test_rolling_year_leap_day_cutoff() {
        // 2024-02-29 minus one year is 2023-02-28.
        let events = vec![event(date(2023, 2, 28), 1.0), event(date(2023, 3, 1), 2.0)];
        let out = filter_window(&events, TimeWindow::RollingYear, date(2024, 2, 29));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, Some(date(2023, 3, 1)));
    }

    #[test]
    fn test_rolling_year_is_subset_of_all_time() {
        let today = date(2024, 10, 16);
        let events: Vec<Event> = (0..30)
            .map(|i| event(date(2022, 1, 1) + chrono::Duration::days(i * 40), i as f64))
            .collect();
        let all = filter_window(&events, TimeWindow::AllTime, today);
        let rolling = filter_window(&events, TimeWindow::RollingYear, today);
        assert!(rolling.len() <= all.len());
        assert!(rolling.iter().all(|e| all.contains(e)));
    }

    #[test]
    fn test_filter_empty_input() {
        assert!(filter_window(&[], TimeWindow::RollingYear, date(2024, 1, 1)).is_empty());
        assert!(filter_window(&[], TimeWindow::AllTime, date(2024, 1, 1)).is_empty());
    }

    // ── sort_chronologically ──────────────────────────────────────────────────

    #[test]
    fn test_sort_ascending() {
        let events = vec![
            event(date(2024, 3, 1), 3.0),
            event(date(2024, 1, 1), 1.0),
            event(date(2024, 2, 1), 2.0),
        ];
        let sorted = sort_chronologically(events);
        let deps: Vec<f64> = sorted.iter().map(|e| e.departures).collect();
        assert_eq!(deps, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sort_is_stable_for_shared_dates() {
        let d = date(2024, 5, 5);
        let events = vec![
            event(date(2024, 6, 1), 9.0),
            event(d, 1.0),
            event(d, 2.0),
            event(d, 3.0),
        ];
        let sorted = sort_chronologically(events);
        let deps: Vec<f64> = sorted.iter().map(|e| e.departures).collect();
        assert_eq!(deps, vec![1.0, 2.0, 3.0, 9.0]);
    }

    #[test]
    fn test_sort_puts_undated_last_in_input_order() {
        let events = vec![
            undated("x", 10.0),
            event(date(2024, 1, 2), 2.0),
            undated("y", 20.0),
            event(date(2024, 1, 1), 1.0),
        ];
        let sorted = sort_chronologically(events);
        let deps: Vec<f64> = sorted.iter().map(|e| e.departures).collect();
        assert_eq!(deps, vec![1.0, 2.0, 10.0, 20.0]);
    }

    #[test]
    fn test_normalize_filters_then_sorts() {
        let today = date(2024, 10, 16);
        let events = vec![
            event(date(2024, 9, 1), 2.0),
            event(date(2020, 1, 1), 0.0),
            event(date(2024, 1, 1), 1.0),
        ];
        let out = normalize(&events, TimeWindow::RollingYear, today);
        let deps: Vec<f64> = out.iter().map(|e| e.departures).collect();
        assert_eq!(deps, vec![1.0, 2.0]);
    }
}
