//! Movement totals, averages, peaks and growth rate over the sorted events.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use stats_core::formatting::format_signed;
use stats_core::models::Event;

// ── MovementSeries ────────────────────────────────────────────────────────────

/// Per-event series aligned index-for-index with the sorted event list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MovementSeries {
    /// ISO dates, or the raw text for events whose date did not parse.
    pub dates: Vec<String>,
    pub departures: Vec<f64>,
    pub arrivals: Vec<f64>,
    /// `departures + arrivals` per event.
    pub total_movements: Vec<f64>,
    /// Number of controller positions staffed per event.
    pub atco_activity: Vec<usize>,
}

impl MovementSeries {
    pub fn from_events(events: &[Event]) -> Self {
        let mut series = Self {
            dates: Vec::with_capacity(events.len()),
            departures: Vec::with_capacity(events.len()),
            arrivals: Vec::with_capacity(events.len()),
            total_movements: Vec::with_capacity(events.len()),
            atco_activity: Vec::with_capacity(events.len()),
        };
        for event in events {
            series.dates.push(event.date_label());
            series.departures.push(event.departures);
            series.arrivals.push(event.arrivals);
            series.total_movements.push(event.total_movements());
            series.atco_activity.push(event.position_count());
        }
        series
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ── Scalar summaries ──────────────────────────────────────────────────────────

/// Maximum of a series and the date of the first event attaining it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakRecord {
    #[serde(serialize_with = "nan_as_text")]
    pub value: f64,
    /// `None` when the value is NaN or the peak event has no parsed date.
    pub date: Option<NaiveDate>,
}

/// Mean period-over-period change of global movements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRate {
    #[serde(serialize_with = "nan_as_text")]
    pub value: f64,
    /// Signed, one decimal: `+2.5`, `-1.0`, `0.0` or `NaN`.
    pub formatted: String,
}

/// Scalar movement metrics.  Every `Option` is `None` only for an empty window.
///
/// In JSON an empty window gives `null` while a malformed count gives `"NaN"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementSummary {
    /// Mean of total movements, rounded to the nearest integer.
    #[serde(serialize_with = "optional_nan_as_text")]
    pub average_global_movements: Option<f64>,
    #[serde(serialize_with = "optional_nan_as_text")]
    pub average_departures: Option<f64>,
    #[serde(serialize_with = "optional_nan_as_text")]
    pub average_arrivals: Option<f64>,
    pub max_traffic: Option<PeakRecord>,
    pub max_departures: Option<PeakRecord>,
    pub max_arrivals: Option<PeakRecord>,
    pub growth_rate: GrowthRate,
    /// Most recent parsed event date.
    pub latest_data_date: Option<NaiveDate>,
}

impl MovementSummary {
    pub fn compute(events: &[Event], series: &MovementSeries) -> Self {
        let dates: Vec<Option<NaiveDate>> = events.iter().map(|e| e.date).collect();
        Self {
            average_global_movements: mean(&series.total_movements).map(f64::round),
            average_departures: mean(&series.departures),
            average_arrivals: mean(&series.arrivals),
            max_traffic: find_peak(&series.total_movements, &dates),
            max_departures: find_peak(&series.departures, &dates),
            max_arrivals: find_peak(&series.arrivals, &dates),
            growth_rate: growth_rate(&series.total_movements),
            latest_data_date: dates.iter().flatten().max().copied(),
        }
    }
}

/// Arithmetic mean; `None` for an empty slice.  NaN entries propagate.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Maximum of `values` with the date at the same index.
///
/// Ties resolve to the lowest index.  A NaN anywhere makes the maximum
/// undefined, reported as a NaN value without a date.
pub fn find_peak(values: &[f64], dates: &[Option<NaiveDate>]) -> Option<PeakRecord> {
    if values.iter().any(|v| v.is_nan()) {
        return Some(PeakRecord {
            value: f64::NAN,
            date: None,
        });
    }
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, value)| PeakRecord {
        value,
        date: dates.get(idx).copied().flatten(),
    })
}

/// Mean of consecutive differences; zero for fewer than two points.
pub fn growth_rate(series: &[f64]) -> GrowthRate {
    let value = if series.len() < 2 {
        0.0
    } else {
        let total: f64 = series.windows(2).map(|w| w[1] - w[0]).sum();
        total / (series.len() - 1) as f64
    };
    GrowthRate {
        value,
        formatted: format_signed(value, 1),
    }
}

// ── Serialization ─────────────────────────────────────────────────────────────

/// JSON has no NaN, and serde_json would write `null`.
fn nan_as_text<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("NaN")
    } else {
        serializer.serialize_f64(*value)
    }
}

fn optional_nan_as_text<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => nan_as_text(v, serializer),
        None => serializer.serialize_none(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(d: NaiveDate, departures: f64, arrivals: f64) -> Event {
        Event::new(d, departures, arrivals, Some(1), vec![1, 2])
    }

    // ── MovementSeries ────────────────────────────────────────────────────────

    #[test]
    fn test_series_alignment() {
        let events = vec![
            event(date(2024, 1, 1), 10.0, 5.0),
            event(date(2024, 2, 1), 20.0, 5.0),
        ];
        let series = MovementSeries::from_events(&events);
        assert_eq!(series.len(), 2);
        assert_eq!(series.dates, vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(series.total_movements, vec![15.0, 25.0]);
        assert_eq!(series.atco_activity, vec![2, 2]);
    }

    // ── mean ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_propagates_nan() {
        assert!(mean(&[1.0, f64::NAN]).unwrap().is_nan());
    }

    // ── find_peak ─────────────────────────────────────────────────────────────

    #[test]
    fn test_peak_first_occurrence_wins() {
        let dates = vec![Some(date(2024, 1, 1)), Some(date(2024, 1, 2)), Some(date(2024, 1, 3))];
        let peak = find_peak(&[5.0, 9.0, 9.0], &dates).unwrap();
        assert_eq!(peak.value, 9.0);
        assert_eq!(peak.date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_peak_empty_is_none() {
        assert!(find_peak(&[], &[]).is_none());
    }

    #[test]
    fn test_peak_with_nan_has_no_date() {
        let dates = vec![Some(date(2024, 1, 1)), Some(date(2024, 1, 2))];
        let peak = find_peak(&[f64::NAN, 4.0], &dates).unwrap();
        assert!(peak.value.is_nan());
        assert_eq!(peak.date, None);
    }

    // ── growth_rate ───────────────────────────────────────────────────────────

    #[test]
    fn test_growth_rate_single_point_is_zero() {
        let g = growth_rate(&[42.0]);
        assert_eq!(g.value, 0.0);
        assert_eq!(g.formatted, "0.0");
    }

    #[test]
    fn test_growth_rate_mean_of_differences() {
        // Differences: +10, -4, +9 → mean 5.
        let g = growth_rate(&[10.0, 20.0, 16.0, 25.0]);
        assert!((g.value - 5.0).abs() < 1e-9);
        assert_eq!(g.formatted, "+5.0");
    }

    #[test]
    fn test_growth_rate_negative() {
        let g = growth_rate(&[30.0, 20.0, 15.0]);
        assert!((g.value + 7.5).abs() < 1e-9);
        assert_eq!(g.formatted, "-7.5");
    }

    #[test]
    fn test_growth_rate_nan() {
        let g = growth_rate(&[1.0, f64::NAN, 3.0]);
        assert!(g.value.is_nan());
        assert_eq!(g.formatted, "NaN");
    }

    // ── MovementSummary ───────────────────────────────────────────────────────

    #[test]
    fn test_summary_two_event_scenario() {
        let events = vec![
            event(date(2024, 1, 1), 10.0, 5.0),
            event(date(2024, 2, 1), 20.0, 5.0),
        ];
        let series = MovementSeries::from_events(&events);
        let summary = MovementSummary::compute(&events, &series);

        assert_eq!(summary.average_global_movements, Some(20.0));
        let max = summary.max_traffic.unwrap();
        assert_eq!(max.value, 25.0);
        assert_eq!(max.date, Some(date(2024, 2, 1)));
        assert_eq!(summary.average_departures, Some(15.0));
        assert_eq!(summary.average_arrivals, Some(5.0));
        // Equal arrivals: the first event holds the peak.
        assert_eq!(summary.max_arrivals.unwrap().date, Some(date(2024, 1, 1)));
        assert_eq!(summary.growth_rate.formatted, "+10.0");
        assert_eq!(summary.latest_data_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_summary_rounds_global_average() {
        let events = vec![
            event(date(2024, 1, 1), 10.0, 0.0),
            event(date(2024, 1, 2), 11.0, 0.0),
        ];
        let series = MovementSeries::from_events(&events);
        let summary = MovementSummary::compute(&events, &series);
        // 10.5 rounds away from zero.
        assert_eq!(summary.average_global_movements, Some(11.0));
        assert_eq!(summary.average_departures, Some(10.5));
    }

    #[test]
    fn test_summary_empty() {
        let summary = MovementSummary::compute(&[], &MovementSeries::default());
        assert_eq!(summary.average_global_movements, None);
        assert_eq!(summary.average_departures, None);
        assert!(summary.max_traffic.is_none());
        assert_eq!(summary.growth_rate.value, 0.0);
        assert_eq!(summary.latest_data_date, None);
    }

    #[test]
    fn test_summary_malformed_count_surfaces_nan() {
        let events = vec![
            event(date(2024, 1, 1), f64::NAN, 5.0),
            event(date(2024, 1, 2), 10.0, 5.0),
        ];
        let series = MovementSeries::from_events(&events);
        let summary = MovementSummary::compute(&events, &series);
        assert!(summary.average_global_movements.unwrap().is_nan());
        assert!(summary.max_departures.unwrap().value.is_nan());
        // Arrivals were clean and stay usable.
        assert_eq!(summary.average_arrivals, Some(5.0));
    }

    #[test]
    fn test_json_tells_malformed_from_empty() {
        let events = vec![event(date(2024, 1, 1), f64::NAN, 5.0)];
        let series = MovementSeries::from_events(&events);
        let malformed = serde_json::to_value(MovementSummary::compute(&events, &series)).unwrap();
        let empty =
            serde_json::to_value(MovementSummary::compute(&[], &MovementSeries::default())).unwrap();

        assert_eq!(malformed["average_global_movements"], "NaN");
        assert_eq!(malformed["average_departures"], "NaN");
        assert_eq!(malformed["average_arrivals"], 5.0);
        assert_eq!(malformed["max_traffic"]["value"], "NaN");
        assert!(malformed["max_traffic"]["date"].is_null());
        assert!(empty["average_global_movements"].is_null());
        assert!(empty["max_traffic"].is_null());
        assert_ne!(malformed["average_global_movements"], empty["average_global_movements"]);
        assert_ne!(malformed["max_departures"], empty["max_departures"]);
    }
}
