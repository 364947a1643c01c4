//! Main statistics pipeline.
//!
//! Filters and sorts the raw events for the selected window, then runs every
//! aggregation stage over the normalised list and returns a [`StatsReport`]
//! ready for rendering.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use stats_core::categories::CategoryConfig;
use stats_core::error::Result;
use stats_core::models::{Event, TimeWindow};
use tracing::debug;

use crate::aggregator::{CategoricalSummary, CategoryAggregator};
use crate::calendar::{bucket_by_month, MonthlySummary};
use crate::movement::{MovementSeries, MovementSummary};
use crate::patterns::count_matches;
use crate::reader::load_events;
use crate::trend::{fit_trend, TrendLine};
use crate::window::normalize;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub window: TimeWindow,
    /// Calendar day the window and month order were computed against.
    pub reference_date: NaiveDate,
    /// Events handed to the pipeline before filtering.
    pub events_received: usize,
    /// Events left after window filtering.
    pub events_in_window: usize,
    /// Events in the window whose date did not parse.
    pub undated_events: usize,
}

/// The complete output of [`analyze_events`].
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub metadata: ReportMetadata,
    /// Per-event series in chronological order.
    pub series: MovementSeries,
    /// Departures trend over event index.
    pub trendline: TrendLine,
    pub summary: MovementSummary,
    pub categories: CategoricalSummary,
    pub monthly: MonthlySummary,
    /// Events with every required position staffed.
    pub parallel_approach_count: usize,
}

impl StatsReport {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run every stage over `events` for `window`, relative to `today`.
///
/// Pure: identical arguments always produce an identical report.
pub fn analyze_events(
    events: &[Event],
    window: TimeWindow,
    config: &CategoryConfig,
    today: NaiveDate,
) -> StatsReport {
    let sorted = normalize(events, window, today);

    let series = MovementSeries::from_events(&sorted);
    let trendline = fit_trend(&series.departures);
    let summary = MovementSummary::compute(&sorted, &series);
    let categories = CategoryAggregator::summarize(&sorted, config);
    let monthly = bucket_by_month(&sorted, today.month());
    let parallel_approach_count = count_matches(&sorted, config);

    log_configuration_gaps(&categories);

    let metadata = ReportMetadata {
        window,
        reference_date: today,
        events_received: events.len(),
        events_in_window: sorted.len(),
        undated_events: sorted.iter().filter(|e| e.date.is_none()).count(),
    };

    debug!(
        "Analyzed {} of {} events ({})",
        metadata.events_in_window,
        metadata.events_received,
        window.as_str()
    );

    StatsReport {
        metadata,
        series,
        trendline,
        summary,
        categories,
        monthly,
        parallel_approach_count,
    }
}

/// Load events from `input` and analyze them.
pub fn analyze_input(
    input: &Path,
    window: TimeWindow,
    config: &CategoryConfig,
    today: NaiveDate,
) -> Result<StatsReport> {
    let events = load_events(input)?;
    Ok(analyze_events(&events, window, config, today))
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn log_configuration_gaps(categories: &CategoricalSummary) {
    for unknown in &categories.unknown_config_codes {
        debug!(
            "Unknown configuration code {} seen in {} events",
            unknown.code, unknown.count
        );
    }
    for unknown in &categories.unknown_position_codes {
        debug!(
            "Unknown position code {} seen in {} events",
            unknown.code, unknown.count
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
