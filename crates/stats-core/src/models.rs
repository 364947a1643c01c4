use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, StatsError};

/// Time-range selector applied before any aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeWindow {
    /// No filtering: every event is in scope.
    #[default]
    AllTime,
    /// Events dated on or after the same calendar day one year ago.
    RollingYear,
}

impl FromStr for TimeWindow {
    type Err = StatsError;

    /// Case-insensitive construction from a string slice.
    ///
    /// Accepts `"all-time"` / `"all"` and `"rolling-year"` / `"rolling"`;
    /// underscores are treated like hyphens.
    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().replace('_', "-").as_str() {
            "all-time" | "all" | "alltime" => Ok(TimeWindow::AllTime),
            "rolling-year" | "rolling" | "year" => Ok(TimeWindow::RollingYear),
            other => Err(StatsError::InvalidWindow(other.to_string())),
        }
    }
}

impl TimeWindow {
    /// The canonical kebab-case identifier for this window.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::AllTime => "all-time",
            TimeWindow::RollingYear => "rolling-year",
        }
    }
}

/// One dated observation of movement counts and controller staffing.
///
/// Movement counts are `f64` so that a malformed source value can travel
/// through the arithmetic as `NaN` instead of being coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Calendar date of the event, `None` when the source text was unparseable.
    pub date: Option<NaiveDate>,
    /// Date text exactly as supplied by the source record.
    #[serde(default)]
    pub raw_date: String,
    /// Number of departures (`NaN` if malformed).
    pub departures: f64,
    /// Number of arrivals (`NaN` if malformed).
    pub arrivals: f64,
    /// Runway / operational configuration code.
    #[serde(default)]
    pub config: Option<u32>,
    /// Controller-position codes staffed during the event, in source order.
    #[serde(default)]
    pub atco: Vec<u32>,
}

impl Event {
    /// Build a well-formed event dated `date`.
    pub fn new(
        date: NaiveDate,
        departures: f64,
        arrivals: f64,
        config: Option<u32>,
        atco: Vec<u32>,
    ) -> Self {
        Self {
            date: Some(date),
            raw_date: date.format("%Y-%m-%d").to_string(),
            departures,
            arrivals,
            config,
            atco,
        }
    }

    /// Departures plus arrivals.
    pub fn total_movements(&self) -> f64 {
        self.departures + self.arrivals
    }

    /// Number of position codes recorded for the event, duplicates included.
    pub fn position_count(&self) -> usize {
        self.atco.len()
    }

    /// Machine-parseable date label: ISO `YYYY-MM-DD` when the date parsed,
    /// otherwise the raw source text.
    pub fn date_label(&self) -> String {
        match self.date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => self.raw_date.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── TimeWindow ──────────────────────────────────────────────────────────

    #[test]
    fn test_time_window_from_str() {
        assert_eq!("all-time".parse::<TimeWindow>().unwrap(), TimeWindow::AllTime);
        assert_eq!("ALL".parse::<TimeWindow>().unwrap(), TimeWindow::AllTime);
        assert_eq!(
            "rolling_year".parse::<TimeWindow>().unwrap(),
            TimeWindow::RollingYear
        );
        assert_eq!(
            "Rolling-Year".parse::<TimeWindow>().unwrap(),
            TimeWindow::RollingYear
        );
    }

    #[test]
    fn test_time_window_from_str_invalid() {
        let err = "fortnight".parse::<TimeWindow>().unwrap_err();
        assert!(matches!(err, StatsError::InvalidWindow(ref w) if w == "fortnight"));
    }

    #[test]
    fn test_time_window_serde() {
        let json = serde_json::to_string(&TimeWindow::RollingYear).unwrap();
        assert_eq!(json, r#""rolling-year""#);
        let back: TimeWindow = serde_json::from_str(r#""all-time""#).unwrap();
        assert_eq!(back, TimeWindow::AllTime);
    }

    #[test]
    fn test_time_window_as_str_round_trips() {
        for w in [TimeWindow::AllTime, TimeWindow::RollingYear] {
            assert_eq!(w.as_str().parse::<TimeWindow>().unwrap(), w);
        }
    }

    // ── Event ───────────────────────────────────────────────────────────────

    #[test]
    fn test_event_total_movements() {
        let e = Event::new(date(2024, 1, 1), 10.0, 5.0, Some(1), vec![1, 2]);
        assert!((e.total_movements() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_event_total_movements_nan_propagates() {
        let e = Event::new(date(2024, 1, 1), f64::NAN, 5.0, Some(1), vec![]);
        assert!(e.total_movements().is_nan());
    }

    #[test]
    fn test_event_position_count_keeps_duplicates() {
        let e = Event::new(date(2024, 1, 1), 1.0, 1.0, None, vec![1, 1, 2]);
        assert_eq!(e.position_count(), 3);
    }

    #[test]
    fn test_event_date_label() {
        let e = Event::new(date(2024, 2, 1), 1.0, 1.0, None, vec![]);
        assert_eq!(e.date_label(), "2024-02-01");

        let bad = Event {
            date: None,
            raw_date: "not a date".to_string(),
            ..e
        };
        assert_eq!(bad.date_label(), "not a date");
    }
}
